use super::{load_settings_from, prepare_upload_dirs, Settings};

use std::{
    env, fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_match_development_layout() {
    let settings = Settings::default();
    assert_eq!(settings.upload_root, Path::new("."));
    assert_eq!(settings.process_result, "0.05 mm");
    assert_eq!(settings.image_pair_result, "0.07 mm");
}

#[test]
fn reads_overrides_from_toml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        "upload_root = \"/srv/uploads\"\nmax_body_bytes = 1024\nprocess_result = \"0.10 mm\"\n",
    )
    .expect("write");

    let settings = load_settings_from(&path);
    assert_eq!(settings.process_result, "0.10 mm");
    if env::var("APP__UPLOAD_ROOT").is_err() {
        assert_eq!(settings.upload_root, Path::new("/srv/uploads"));
    }
    if env::var("APP__MAX_BODY_BYTES").is_err() {
        assert_eq!(settings.max_body_bytes, 1024);
    }
}

#[test]
fn mistyped_value_leaves_defaults_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(&path, "max_body_bytes = \"lots\"\nprocess_result = \"0.10 mm\"\n").expect("write");

    let settings = load_settings_from(&path);
    assert_eq!(settings.process_result, "0.05 mm");
    if env::var("APP__MAX_BODY_BYTES").is_err() {
        assert_eq!(settings.max_body_bytes, 64 * 1024 * 1024);
    }
}

#[test]
fn creates_all_upload_directories() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("measure_server_test_{suffix}"));
    let dirs = prepare_upload_dirs(&temp_root).expect("prepare dirs");

    assert!(dirs.images.ends_with("camera_images"));
    for dir in [
        &dirs.images,
        &dirs.calibration,
        &dirs.models,
        &dirs.calibration_photos,
    ] {
        assert!(dir.is_dir(), "{} missing", dir.display());
    }

    fs::remove_dir_all(temp_root).expect("cleanup");
}
