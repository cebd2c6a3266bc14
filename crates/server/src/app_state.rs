use std::sync::Arc;

use crate::config::{Settings, UploadDirs};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) settings: Arc<Settings>,
    pub(crate) dirs: UploadDirs,
}
