mod common;

use approx::assert_relative_eq;
use common::scene;
use dartsight::stereo::{Axis, AxisRotation};
use dartsight::{default_cameras, locate_dart, LocatorConfig, CAMERA1_INTRINSICS};

#[test]
fn config_survives_a_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locator.json");

    let mut config = scene::config();
    config.mask.diff_threshold = 12;
    config.alignment.axis_corrections = vec![AxisRotation::new(Axis::Z, 180.0)];
    config.write_json(&path).unwrap();

    let loaded = LocatorConfig::load_json(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn default_config_carries_the_deployed_rig() {
    let json = serde_json::to_value(LocatorConfig::default()).unwrap();

    assert_eq!(json["mask"]["diff_threshold"], 30);
    assert_eq!(json["mask"]["cluster_radius_px"], 170.0);
    assert_eq!(json["capture"]["warmup_reads"], 5);
    assert_eq!(json["cameras"]["first"]["intrinsics"]["fx"], CAMERA1_INTRINSICS.fx);
    assert_eq!(
        json["cameras"]["second"]["pose"]["translation"],
        serde_json::json!([-30.0, 0.0, -30.0])
    );
    assert_eq!(
        json["alignment"]["axis_corrections"],
        serde_json::json!([
            {"axis": "z", "degrees": 180.0},
            {"axis": "x", "degrees": 180.0}
        ])
    );
}

#[test]
fn hand_written_config_drives_the_pipeline() {
    let cameras = serde_json::to_value(scene::cameras()).unwrap();
    let json = serde_json::json!({ "cameras": cameras }).to_string();
    let config: LocatorConfig = serde_json::from_str(&json).unwrap();
    assert_ne!(config.cameras, default_cameras());

    let landing = locate_dart(&scene::base_frames(), &scene::post_frames(), &config)
        .unwrap()
        .unwrap();
    assert_relative_eq!(landing.x, scene::EXPECTED_LANDING.x, epsilon = 1e-6);
    assert_relative_eq!(landing.z, scene::EXPECTED_LANDING.z, epsilon = 1e-6);
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"mask\": [").unwrap();
    assert!(LocatorConfig::load_json(&path).is_err());
    assert!(LocatorConfig::load_json(dir.path().join("missing.json")).is_err());
}
