//! A synthetic two-camera throw with an analytically known landing point.
//!
//! Camera 1 sits at the origin looking along `+z`. Camera 2 sits at
//! `(30, 0, 30)` looking along `-x`. Both have `f = 500`, `c = (320, 240)`.
//! The dart tip at `(5, 2, 25)` projects to `(420, 280)` in camera 1 and to
//! `(220, 280)` in camera 2. With the default alignment the landing
//! coordinate is `(-5, 5)`.
#![allow(dead_code)]

use dartsight::core::GrayImage;
use dartsight::stereo::{Axis, AxisRotation, CameraIntrinsics, CameraModel, RigidTransform};
use dartsight::{Frame, LandingCoordinate, LocatorConfig, PixelPoint, StereoPair};
use nalgebra::{Point3, Vector3};

pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
pub const BACKGROUND_LEVEL: u8 = 200;
pub const DART_LEVEL: u8 = 40;

pub const TIP_WORLD: Point3<f64> = Point3::new(5.0, 2.0, 25.0);
pub const TIP_CAMERA1: PixelPoint = PixelPoint::new(420, 280);
pub const TIP_CAMERA2: PixelPoint = PixelPoint::new(220, 280);
pub const EXPECTED_LANDING: LandingCoordinate = LandingCoordinate::new(-5.0, 5.0);

pub fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::new(500.0, 500.0, 320.0, 240.0)
}

pub fn cameras() -> StereoPair<CameraModel> {
    let r = AxisRotation::new(Axis::Y, 90.0).matrix();
    let center = Vector3::new(30.0, 0.0, 30.0);
    StereoPair::new(
        CameraModel::new(intrinsics(), RigidTransform::identity()),
        CameraModel::new(intrinsics(), RigidTransform::new(r, -(r * center))),
    )
}

pub fn config() -> LocatorConfig {
    LocatorConfig {
        cameras: cameras(),
        ..LocatorConfig::default()
    }
}

pub fn tips() -> StereoPair<PixelPoint> {
    StereoPair::new(TIP_CAMERA1, TIP_CAMERA2)
}

pub fn empty_frame() -> GrayImage {
    GrayImage::filled(WIDTH, HEIGHT, BACKGROUND_LEVEL)
}

/// A dart seen from the side: a wedge 40 rows tall that narrows to two
/// pixels at `tip`, its lowest row.
pub fn draw_dart(img: &mut GrayImage, tip: PixelPoint) {
    let (tx, ty) = (tip.x as usize, tip.y as usize);
    for d in 0..40 {
        let y = ty - d;
        for x in tx - d / 4..=tx + 1 + d / 4 {
            img.set(x, y, DART_LEVEL);
        }
    }
}

pub fn draw_rect(img: &mut GrayImage, x0: usize, y0: usize, w: usize, h: usize) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.set(x, y, DART_LEVEL);
        }
    }
}

pub fn base_frames() -> StereoPair<Frame> {
    StereoPair::from_fn(|_| Frame::from_gray(empty_frame()))
}

/// Post-throw frames with the dart plus clutter: single-pixel speckle in
/// camera 1, and in camera 2 a small blob far from the dart but below its tip.
pub fn post_frames() -> StereoPair<Frame> {
    tips().map(|camera, tip| {
        let mut img = empty_frame();
        draw_dart(&mut img, tip);
        match camera {
            dartsight::CameraId::First => {
                for (x, y) in [(50, 50), (600, 420), (433, 300), (10, 470)] {
                    img.set(x, y, DART_LEVEL);
                }
            }
            dartsight::CameraId::Second => draw_rect(&mut img, 600, 400, 3, 3),
        }
        Frame::from_gray(img)
    })
}

pub fn save_gray(frame: &Frame, path: &std::path::Path) {
    let (w, h) = frame.dimensions();
    let img = image::GrayImage::from_fn(w as u32, h as u32, |x, y| {
        image::Luma([frame.gray.get(x as usize, y as usize)])
    });
    img.save(path).expect("save png");
}
