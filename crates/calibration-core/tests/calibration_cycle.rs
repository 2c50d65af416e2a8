use std::path::PathBuf;

use wiscreen_calibration_core::{CoreError, EyeGuard, Phase};
use wiscreen_common::feed::load_feed;
use wiscreen_common::prefs::{JsonFileStore, MemoryStore, PreferenceStore};
use wiscreen_model::{BlurPolicy, DetectorFrame, FaceRatio, BASELINE_KEY, DEFAULT_BASELINE_RATIO};

fn fixture_frames() -> Vec<DetectorFrame> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("detector-feed.jsonl");
    load_feed(path).expect("fixture feed should load")
}

#[test]
fn fixture_feed_calibrates_then_blurs() {
    let frames = fixture_frames();
    let mut guard = EyeGuard::new(MemoryStore::new(), BlurPolicy::blur_behind()).unwrap();

    // The first three face-bearing frames are the calibration shots.
    let mut captured = 0;
    let mut rest = frames.iter();
    for frame in rest.by_ref() {
        let ratio = frame.face_ratio().unwrap();
        if guard.observe(ratio).is_some() {
            let outcome = guard.capture().unwrap();
            captured += 1;
            if captured == 3 {
                let baseline = outcome.baseline.expect("third capture commits");
                assert!((baseline.value() - 0.115).abs() < 1e-9);
                break;
            }
        }
    }
    assert_eq!(guard.phase(), Phase::Calibrated);

    guard.set_eye_mode(true);
    let updates: Vec<_> = rest
        .filter_map(|frame| guard.observe(frame.face_ratio().unwrap()))
        .collect();

    // 0.15, 0.3, 0.45, 0.7, 0.7, 0.05 with gaps dropped.
    assert_eq!(updates.len(), 6);
    assert!(updates[0].blur.enhancement > 0.0);
    assert!(updates[1].blur.radius > updates[0].blur.radius);
    assert_eq!(updates[3].blur.radius, 150.0);
    assert!(updates[3].changed);
    assert!(!updates[4].changed);
    assert!(updates[5].blur.is_cleared());
}

#[test]
fn baseline_survives_restart_with_file_store() {
    let dir = std::env::temp_dir().join("wiscreen_test_cycle_restart");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("prefs.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut guard = EyeGuard::new(store, BlurPolicy::default()).unwrap();
        for value in [0.2, 0.25, 0.3] {
            guard.observe(Some(FaceRatio::new(value).unwrap()));
            guard.capture().unwrap();
        }
        assert_eq!(guard.phase(), Phase::Calibrated);
    }

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.contains(BASELINE_KEY));
    let mut guard = EyeGuard::new(store, BlurPolicy::default()).unwrap();
    assert_eq!(guard.phase(), Phase::Calibrated);
    assert!((guard.baseline().value() - 0.25).abs() < 1e-9);
    assert!(matches!(guard.capture(), Err(CoreError::AlreadyCalibrated)));

    guard.reset().unwrap();
    let store = guard.into_store();
    assert!(!store.contains(BASELINE_KEY));
    assert!(!JsonFileStore::open(&path).unwrap().contains(BASELINE_KEY));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn render_effect_policy_caps_radius() {
    let mut guard = EyeGuard::new(MemoryStore::new(), BlurPolicy::render_effect()).unwrap();
    guard.set_eye_mode(true);
    let update = guard
        .observe(Some(FaceRatio::new(0.95).unwrap()))
        .expect("face present");
    assert_eq!(update.blur.radius, 25.0);
    assert_eq!(update.blur.alpha, 60);
    assert_eq!(update.blur.radius_px(guard.policy()), 25);
}

#[test]
fn failed_persist_keeps_session_and_retries() {
    let dir = std::env::temp_dir().join("wiscreen_test_cycle_failed_persist");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("prefs.json");

    let store = JsonFileStore::open(&path).unwrap();
    let mut guard = EyeGuard::new(store, BlurPolicy::default()).unwrap();
    guard.observe(Some(FaceRatio::new(0.3).unwrap()));
    guard.capture().unwrap();
    guard.capture().unwrap();
    assert!(matches!(guard.capture(), Err(CoreError::Store(_))));

    assert_eq!(guard.phase(), Phase::Calibrating { count: 3 });
    assert!(!guard.store().contains(BASELINE_KEY));
    assert_eq!(guard.baseline().value(), DEFAULT_BASELINE_RATIO);

    // Once the path is writable the next capture commits the held samples.
    std::fs::remove_file(&blocker).unwrap();
    let outcome = guard.capture().unwrap();
    let baseline = outcome.baseline.expect("retry commits");
    assert!((baseline.value() - 0.3).abs() < 1e-9);
    assert_eq!(guard.phase(), Phase::Calibrated);
    assert!(JsonFileStore::open(&path).unwrap().contains(BASELINE_KEY));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn failed_reset_keeps_baseline() {
    let dir = std::env::temp_dir().join("wiscreen_test_cycle_failed_reset");
    let _ = std::fs::remove_dir_all(&dir);
    let nested = dir.join("nested");
    let path = nested.join("prefs.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.set_float(BASELINE_KEY, 0.2).unwrap();
    let mut guard = EyeGuard::new(store, BlurPolicy::default()).unwrap();

    std::fs::remove_dir_all(&nested).unwrap();
    std::fs::write(&nested, "not a directory").unwrap();

    assert!(matches!(guard.reset(), Err(CoreError::Store(_))));
    assert_eq!(guard.phase(), Phase::Calibrated);
    assert_eq!(guard.baseline().value(), 0.2);

    std::fs::remove_dir_all(&dir).ok();
}
