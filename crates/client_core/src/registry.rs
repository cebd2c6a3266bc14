//! Id-keyed element surface the orchestrator reads inputs from and writes results to.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::{Context, Result};
use shared::domain::{DisplayId, FieldId, FileInputId, InputRef, SectionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' has no file name", path.display()))?;
        Ok(Self::new(name, bytes))
    }
}

/// Everything the orchestrator needs from a rendering surface.
pub trait ElementRegistry: Send {
    fn text(&self, field: FieldId) -> String;
    fn files(&self, input: FileInputId) -> &[SelectedFile];
    fn set_display(&mut self, display: DisplayId, text: &str);
    fn set_visible(&mut self, section: SectionId, visible: bool);
    fn set_error_marker(&mut self, input: InputRef, marked: bool);
    /// User-facing message (an alert on the web page).
    fn notify(&mut self, message: &str);
}

/// Registry kept entirely in memory. Backs the CLI, the GUI view model and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    fields: BTreeMap<FieldId, String>,
    files: BTreeMap<FileInputId, Vec<SelectedFile>>,
    displays: BTreeMap<DisplayId, String>,
    hidden: BTreeSet<SectionId>,
    error_markers: BTreeSet<InputRef>,
    notifications: Vec<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, field: FieldId, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn text_mut(&mut self, field: FieldId) -> &mut String {
        self.fields.entry(field).or_default()
    }

    pub fn set_files(&mut self, input: FileInputId, files: Vec<SelectedFile>) {
        self.files.insert(input, files);
    }

    pub fn add_file(&mut self, input: FileInputId, file: SelectedFile) {
        self.files.entry(input).or_default().push(file);
    }

    pub fn clear_files(&mut self, input: FileInputId) {
        self.files.remove(&input);
    }

    pub fn display(&self, display: DisplayId) -> Option<&str> {
        self.displays.get(&display).map(String::as_str)
    }

    pub fn displays(&self) -> &BTreeMap<DisplayId, String> {
        &self.displays
    }

    /// Sections start visible, like elements without an inline `display: none`.
    pub fn is_visible(&self, section: SectionId) -> bool {
        !self.hidden.contains(&section)
    }

    pub fn has_error_marker(&self, input: InputRef) -> bool {
        self.error_markers.contains(&input)
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn last_notification(&self) -> Option<&str> {
        self.notifications.last().map(String::as_str)
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }
}

impl ElementRegistry for MemoryRegistry {
    fn text(&self, field: FieldId) -> String {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    fn files(&self, input: FileInputId) -> &[SelectedFile] {
        self.files.get(&input).map(Vec::as_slice).unwrap_or(&[])
    }

    fn set_display(&mut self, display: DisplayId, text: &str) {
        self.displays.insert(display, text.to_string());
    }

    fn set_visible(&mut self, section: SectionId, visible: bool) {
        if visible {
            self.hidden.remove(&section);
        } else {
            self.hidden.insert(section);
        }
    }

    fn set_error_marker(&mut self, input: InputRef, marked: bool) {
        if marked {
            self.error_markers.insert(input);
        } else {
            self.error_markers.remove(&input);
        }
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
