mod common;

use approx::assert_relative_eq;
use common::scene;
use dartsight::core::GrayImage;
use dartsight::{
    locate_dart, CameraId, CaptureParams, DartLocator, Frame, FrameQueue, LocateError,
    LocateReport, LocateStatus, MaskStage, RecordingObserver, StereoCapture, StereoPair,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn synthetic_throw_lands_at_known_coordinate() {
    init_logger();
    let locator = DartLocator::new(scene::config()).expect("valid config");
    let dart = locator
        .locate(&scene::base_frames(), &scene::post_frames())
        .expect("locate")
        .expect("dart visible in both cameras");

    assert_eq!(dart.tips, scene::tips());
    assert_relative_eq!(dart.triangulation.point, scene::TIP_WORLD, epsilon = 1e-6);
    assert_relative_eq!(dart.landing.x, scene::EXPECTED_LANDING.x, epsilon = 1e-6);
    assert_relative_eq!(dart.landing.z, scene::EXPECTED_LANDING.z, epsilon = 1e-6);
    assert_relative_eq!(dart.aligned.y, 2.0, epsilon = 1e-6);
    assert!(dart.triangulation.reprojection_error_px.first < 1e-6);
    assert!(dart.triangulation.reprojection_error_px.second < 1e-6);
}

#[test]
fn repeated_runs_give_identical_results() {
    let locator = DartLocator::new(scene::config()).unwrap();
    let base = scene::base_frames();
    let post = scene::post_frames();
    let a = locator.locate(&base, &post).unwrap();
    let b = locator.locate(&base, &post).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unchanged_camera_is_a_miss() {
    init_logger();
    let base = scene::base_frames();
    let mut post = scene::post_frames();
    post.second = base.second.clone();

    assert_eq!(locate_dart(&base, &post, &scene::config()).unwrap(), None);

    // The first camera alone saw the dart; that is still a miss.
    let mut post = scene::post_frames();
    post.first = base.first.clone();
    assert_eq!(locate_dart(&base, &post, &scene::config()).unwrap(), None);
}

#[test]
fn speckle_only_difference_is_an_explicit_error() {
    let base = scene::base_frames();
    let mut post = scene::post_frames();
    let mut speckled = scene::empty_frame();
    for (x, y) in [(100, 100), (300, 200), (500, 400)] {
        speckled.set(x, y, scene::DART_LEVEL);
    }
    post.first = Frame::from_gray(speckled);

    let err = locate_dart(&base, &post, &scene::config()).unwrap_err();
    assert!(
        matches!(
            err,
            LocateError::EmptyMask {
                camera: CameraId::First,
                stage: MaskStage::Opened
            }
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn filter_that_removes_everything_is_an_explicit_error() {
    let mut config = scene::config();
    // The wedge is symmetric about a half-pixel column, so no pixel sits
    // exactly on the centroid.
    config.mask.cluster_radius_px = 0.0;

    let err = locate_dart(&scene::base_frames(), &scene::post_frames(), &config).unwrap_err();
    assert!(matches!(
        err,
        LocateError::EmptyMask {
            camera: CameraId::First,
            stage: MaskStage::Filtered
        }
    ));
    assert_eq!(
        err.to_string(),
        "camera 1: no foreground left after the centroid filter stage"
    );
}

#[test]
fn observer_sees_every_stage_and_the_clutter_being_removed() {
    let locator = DartLocator::new(scene::config()).unwrap();
    let mut rec = RecordingObserver::new();
    let dart = locator
        .locate_with_observer(&scene::base_frames(), &scene::post_frames(), &mut rec)
        .unwrap()
        .unwrap();

    for camera in CameraId::ALL {
        assert_eq!(rec.stages(camera), MaskStage::ALL.to_vec());
        assert_eq!(rec.tip(camera), Some(dart.tips[camera]));
    }

    let diff1 = rec.mask(CameraId::First, MaskStage::Difference).unwrap();
    let opened1 = rec.mask(CameraId::First, MaskStage::Opened).unwrap();
    assert!(diff1.is_foreground(50, 50));
    assert!(!opened1.is_foreground(50, 50));

    let opened2 = rec.mask(CameraId::Second, MaskStage::Opened).unwrap();
    let filtered2 = rec.mask(CameraId::Second, MaskStage::Filtered).unwrap();
    assert!(opened2.is_foreground(601, 401));
    assert!(!filtered2.is_foreground(601, 401));
    assert!(filtered2.is_foreground(220, 280));

    assert_eq!(rec.landing(), Some(dart.landing));
}

#[test]
fn report_collects_counts_and_outcome() {
    let locator = DartLocator::new(scene::config()).unwrap();
    let mut report = LocateReport::new();
    let result =
        locator.locate_with_observer(&scene::base_frames(), &scene::post_frames(), &mut report);
    report.finish(&result);

    assert_eq!(report.status, Some(LocateStatus::Located));
    assert_eq!(report.tips, scene::tips().map(|_, tip| Some(tip)));
    let counts = report.foreground.second;
    assert_eq!(counts.difference.unwrap(), counts.opened.unwrap());
    assert_eq!(counts.opened.unwrap() - 9, counts.filtered.unwrap());
    assert_eq!(
        report.foreground.first.difference.unwrap() - 4,
        report.foreground.first.opened.unwrap()
    );

    let json = serde_json::to_string(&report).unwrap();
    let back: LocateReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.status, report.status);
    assert_eq!(back.tips, report.tips);
}

#[test]
fn captured_frames_flow_through_the_locator() {
    let config = scene::config();
    let warmup = config.capture.warmup_reads;
    let stale = || Frame::from_gray(GrayImage::filled(scene::WIDTH, scene::HEIGHT, 0));

    // Each capture discards `warmup` stale frames per camera first.
    let queues = scene::base_frames()
        .zip(scene::post_frames())
        .map(|_, (base, post)| {
            let mut queue = FrameQueue::default();
            for frame in [base, post] {
                for _ in 0..warmup {
                    queue.push(stale());
                }
                queue.push(frame);
            }
            queue
        });
    let mut capture = StereoCapture::new(queues, CaptureParams { warmup_reads: warmup });

    let base: StereoPair<Frame> = capture.capture().unwrap();
    let post = capture.capture().unwrap();
    assert!(capture.capture().is_err());

    let landing = locate_dart(&base, &post, &config).unwrap().unwrap();
    assert_relative_eq!(landing.x, scene::EXPECTED_LANDING.x, epsilon = 1e-6);
    assert_relative_eq!(landing.z, scene::EXPECTED_LANDING.z, epsilon = 1e-6);
}
