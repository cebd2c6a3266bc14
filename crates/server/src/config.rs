use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const IMAGES_DIR: &str = "camera_images";
pub const CALIBRATION_DIR: &str = "calibration";
pub const MODELS_DIR: &str = "models";
pub const CALIBRATION_PHOTO_DIR: &str = "calibration_photo";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub upload_root: PathBuf,
    pub max_body_bytes: usize,
    /// Placeholder measurement returned by `/upload_and_process/`.
    pub image_pair_result: String,
    /// Placeholder measurement returned by `/upload/` and `/upload_model/`.
    pub process_result: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            upload_root: PathBuf::from("."),
            max_body_bytes: 64 * 1024 * 1024,
            image_pair_result: "0.07 mm".into(),
            process_result: "0.05 mm".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadDirs {
    pub images: PathBuf,
    pub calibration: PathBuf,
    pub models: PathBuf,
    pub calibration_photos: PathBuf,
}

impl UploadDirs {
    pub fn under(root: &Path) -> Self {
        Self {
            images: root.join(IMAGES_DIR),
            calibration: root.join(CALIBRATION_DIR),
            models: root.join(MODELS_DIR),
            calibration_photos: root.join(CALIBRATION_PHOTO_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    upload_root: Option<PathBuf>,
    max_body_bytes: Option<usize>,
    image_pair_result: Option<String>,
    process_result: Option<String>,
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.upload_root {
        settings.upload_root = v;
    }
    if let Some(v) = file_cfg.max_body_bytes {
        settings.max_body_bytes = v;
    }
    if let Some(v) = file_cfg.image_pair_result {
        settings.image_pair_result = v;
    }
    if let Some(v) = file_cfg.process_result {
        settings.process_result = v;
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("server.toml"))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable server settings file"),
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Ok(v) = std::env::var("APP__UPLOAD_ROOT") {
        settings.upload_root = PathBuf::from(v);
    }

    if let Ok(v) = std::env::var("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }

    settings
}

/// Creates every upload directory under `root`.
pub fn prepare_upload_dirs(root: &Path) -> anyhow::Result<UploadDirs> {
    let dirs = UploadDirs::under(root);
    for dir in [
        &dirs.images,
        &dirs.calibration,
        &dirs.models,
        &dirs.calibration_photos,
    ] {
        fs::create_dir_all(dir).with_context(|| {
            format!("failed to create upload directory '{}'", dir.display())
        })?;
    }
    Ok(dirs)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
