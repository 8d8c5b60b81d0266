use dartsight_core::{BinaryMask, CameraId, Frame, PixelPoint, StereoPair};
use dartsight_mask::{MaskStage, MaskTrace, TipDetector};
use dartsight_stereo::{triangulate, FrameAligner, LandingCoordinate, Triangulation};
use nalgebra::{Point2, Point3};

use crate::{FrameRole, LocateError, LocatorConfig, NoopObserver, StageObserver};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything known about a located dart.
#[derive(Clone, Debug, PartialEq)]
pub struct DartLocation {
    pub landing: LandingCoordinate,
    /// Triangulated tip in the target frame, before `y` is dropped.
    pub aligned: Point3<f64>,
    pub triangulation: Triangulation,
    pub tips: StereoPair<PixelPoint>,
}

/// Stages of one camera after the miss check, with every mask it produced.
struct CameraPass {
    masks: Vec<(MaskStage, BinaryMask)>,
    trace: Result<MaskTrace, LocateError>,
}

/// The dart-locating pipeline with its configuration resolved.
///
/// Building one validates the configuration; [`DartLocator::locate`] is then a
/// pure function of the frames.
#[derive(Clone, Debug)]
pub struct DartLocator {
    config: LocatorConfig,
    detector: TipDetector,
    aligner: FrameAligner,
}

impl DartLocator {
    pub fn new(config: LocatorConfig) -> Result<Self, LocateError> {
        config.validate()?;
        let detector =
            TipDetector::new(config.mask.clone()).map_err(LocateError::InvalidMaskParams)?;
        let aligner = FrameAligner::from_config(&config.alignment);
        Ok(Self {
            config,
            detector,
            aligner,
        })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn aligner(&self) -> &FrameAligner {
        &self.aligner
    }

    /// Locate the dart that appeared between `base` and `post`.
    ///
    /// Returns `Ok(None)` when either camera saw no difference at all, which
    /// callers treat as a miss.
    pub fn locate(
        &self,
        base: &StereoPair<Frame>,
        post: &StereoPair<Frame>,
    ) -> Result<Option<DartLocation>, LocateError> {
        self.locate_with_observer(base, post, &mut NoopObserver)
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn locate_with_observer(
        &self,
        base: &StereoPair<Frame>,
        post: &StereoPair<Frame>,
        observer: &mut dyn StageObserver,
    ) -> Result<Option<DartLocation>, LocateError> {
        check_dimensions(base, post)?;
        for camera in CameraId::ALL {
            observer.on_frames(camera, &base[camera], &post[camera]);
        }

        let frames = base.each_ref().zip(post.each_ref());
        let differences = per_camera(frames, |camera, (base, post)| {
            self.detector
                .difference(&base.gray.view(), &post.gray.view())
                .map_err(|err| LocateError::from_mask(camera, err))
        })
        .transpose()?;
        for (camera, mask) in differences.iter() {
            observer.on_mask(camera, MaskStage::Difference, mask);
        }
        if let Some((camera, _)) = differences.iter().find(|(_, m)| !m.has_foreground()) {
            log::info!("no difference seen by {camera}, treating the throw as a miss");
            return Ok(None);
        }

        let passes = per_camera(differences, |camera, difference| {
            let mut masks = Vec::with_capacity(2);
            let trace = self
                .detector
                .refine_with(difference, |stage, mask| {
                    if stage != MaskStage::Difference {
                        masks.push((stage, mask.clone()));
                    }
                })
                .map_err(|err| LocateError::from_mask(camera, err));
            CameraPass { masks, trace }
        });
        for (camera, pass) in passes.iter() {
            for (stage, mask) in &pass.masks {
                observer.on_mask(camera, *stage, mask);
            }
        }
        let traces = passes.map(|_, pass| pass.trace).transpose().inspect_err(|err| {
            log::warn!("{err}");
        })?;

        let tips = traces.map(|_, trace| trace.tip);
        for (camera, tip) in tips.iter() {
            observer.on_tip(camera, *tip);
        }

        let pixels = tips.map(|_, tip| {
            let [x, y] = tip.to_f64();
            Point2::new(x, y)
        });
        let triangulation = triangulate(&self.config.cameras, pixels, &self.config.triangulation)
            .inspect_err(|err| log::warn!("triangulation failed: {err}"))?;
        observer.on_triangulated(&triangulation);

        let aligned = self.aligner.apply(&triangulation.point);
        let landing = LandingCoordinate::new(aligned.x, aligned.z);
        observer.on_aligned(&aligned, landing);

        log::info!(
            "dart at ({:.2}, {:.2}) from tips ({}, {}) and ({}, {})",
            landing.x,
            landing.z,
            tips.first.x,
            tips.first.y,
            tips.second.x,
            tips.second.y
        );

        Ok(Some(DartLocation {
            landing,
            aligned,
            triangulation,
            tips,
        }))
    }
}

/// One-shot form of [`DartLocator::locate`]: validate `config`, run once and
/// keep only the landing coordinate.
pub fn locate_dart(
    base: &StereoPair<Frame>,
    post: &StereoPair<Frame>,
    config: &LocatorConfig,
) -> Result<Option<LandingCoordinate>, LocateError> {
    let locator = DartLocator::new(config.clone())?;
    Ok(locator.locate(base, post)?.map(|location| location.landing))
}

/// All four frames must be well formed and match camera 1's base frame.
fn check_dimensions(
    base: &StereoPair<Frame>,
    post: &StereoPair<Frame>,
) -> Result<(), LocateError> {
    let (expected_width, expected_height) = base.first.dimensions();
    for camera in CameraId::ALL {
        for (role, frame) in [(FrameRole::Base, &base[camera]), (FrameRole::Post, &post[camera])] {
            frame
                .validate()
                .map_err(|source| LocateError::InvalidFrame { camera, role, source })?;
            let (width, height) = frame.dimensions();
            if (width, height) != (expected_width, expected_height) {
                return Err(LocateError::FrameSizeMismatch {
                    camera,
                    role,
                    width,
                    height,
                    expected_width,
                    expected_height,
                });
            }
        }
    }
    Ok(())
}

/// Run `f` for both cameras. The two calls share nothing, so with the `rayon`
/// feature they run on the pool.
fn per_camera<I, T, F>(inputs: StereoPair<I>, f: F) -> StereoPair<T>
where
    I: Send,
    T: Send,
    F: Fn(CameraId, I) -> T + Sync,
{
    #[cfg(feature = "rayon")]
    {
        let StereoPair { first, second } = inputs;
        let (first, second) = rayon::join(
            || f(CameraId::First, first),
            || f(CameraId::Second, second),
        );
        StereoPair::new(first, second)
    }
    #[cfg(not(feature = "rayon"))]
    {
        inputs.map(f)
    }
}
