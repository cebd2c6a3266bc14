//! UI layer for desktop GUI: app shell and form panels.

pub mod app;
pub mod panels;

pub use app::UploadApp;
