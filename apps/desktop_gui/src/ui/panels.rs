//! Form sections rendered straight from the shared element registry.

use std::{collections::BTreeSet, path::PathBuf};

use client_core::{ActionPhase, ElementRegistry, MemoryRegistry, UiState};
use eframe::egui;
use shared::{
    domain::{DisplayId, FieldId, FileArity, FileInputId, InputRef, SectionId},
    protocol::ActionKind,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::action_label;

pub struct Panels<'a> {
    pub registry: &'a mut MemoryRegistry,
    pub state: &'a UiState,
    pub pending: &'a BTreeSet<ActionKind>,
    pub commands: &'a mut Vec<BackendCommand>,
    /// File pickers requested this frame; opened once the registry guard is released.
    pub picks: &'a mut Vec<FileInputId>,
}

impl Panels<'_> {
    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading("Camera");
        for field in FieldId::CAMERA_PARAMS {
            self.text_field(ui, field);
        }
        ui.separator();

        if self.registry.is_visible(SectionId::ManualCalibration) {
            ui.heading("Chessboard calibration");
            self.file_input(ui, FileInputId::ChessboardPair);
            self.text_field(ui, FieldId::NumTiles);
            self.text_field(ui, FieldId::SquareSize);
            self.action_button(ui, ActionKind::UploadParams);
            ui.separator();
        }
        if self.registry.is_visible(SectionId::CameraParams) {
            ui.heading("Calibration file");
            self.file_input(ui, FileInputId::CalibrationFile);
            self.action_button(ui, ActionKind::UploadCalibration);
            ui.separator();
        }
        if self.registry.is_visible(SectionId::ImageUpload) {
            ui.heading("Image pair");
            self.file_input(ui, FileInputId::ImagePair);
            self.action_button(ui, ActionKind::UploadAndProcess);
            ui.separator();
        }
        if self.registry.is_visible(SectionId::ModelUpload) {
            if self.registry.is_visible(SectionId::ModelUploadTitle) {
                ui.heading("3D model");
            }
            self.text_field(ui, FieldId::ImagesCount);
            self.file_input(ui, FileInputId::ModelFile);
            self.action_button(ui, ActionKind::UploadModel);
            ui.separator();
        }

        self.action_button(ui, ActionKind::Process);
        ui.separator();
        ui.horizontal(|ui| {
            ui.strong("Result:");
            match self.registry.display(DisplayId::ActionResult) {
                Some(result) => ui.monospace(result),
                None => ui.weak("nothing yet"),
            };
        });
    }

    fn text_field(&mut self, ui: &mut egui::Ui, field: FieldId) {
        let marked = self.registry.has_error_marker(InputRef::Field(field));
        ui.horizontal(|ui| {
            ui.add_sized([140.0, 18.0], egui::Label::new(field_label(field)));
            ui.add(egui::TextEdit::singleline(self.registry.text_mut(field)).desired_width(160.0));
            if marked {
                ui.colored_label(ui.visuals().error_fg_color, "required");
            }
            if let Some(echoed) = self.registry.display(field.display()) {
                ui.weak(format!("server: {echoed}"));
            }
        });
    }

    fn file_input(&mut self, ui: &mut egui::Ui, input: FileInputId) {
        let marked = self.registry.has_error_marker(InputRef::File(input));
        let names: Vec<String> = self
            .registry
            .files(input)
            .iter()
            .map(|file| file.name.clone())
            .collect();
        ui.horizontal(|ui| {
            ui.add_sized([140.0, 18.0], egui::Label::new(file_label(input)));
            if ui.button("Choose...").clicked() {
                self.picks.push(input);
            }
            if names.is_empty() {
                ui.weak(match input.arity() {
                    FileArity::Single => "no file selected",
                    FileArity::Pair => "select two files",
                });
            } else {
                ui.label(names.join(", "));
                if ui.small_button("Clear").clicked() {
                    self.commands.push(BackendCommand::ClearFiles { input });
                }
            }
            if marked {
                ui.colored_label(ui.visuals().error_fg_color, "required");
            }
        });
    }

    fn action_button(&mut self, ui: &mut egui::Ui, action: ActionKind) {
        let busy = self.pending.contains(&action);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new(action_label(action)))
                .clicked()
            {
                self.commands.push(BackendCommand::Activate(action));
            }
            if busy {
                ui.spinner();
                if ui.small_button("Cancel").clicked() {
                    self.commands.push(BackendCommand::Cancel(action));
                }
                return;
            }
            match self.state.phase(action) {
                ActionPhase::DisplayingSuccess => {
                    ui.colored_label(egui::Color32::from_rgb(60, 160, 90), "ok");
                }
                ActionPhase::DisplayingError => {
                    ui.colored_label(ui.visuals().error_fg_color, "failed");
                }
                _ => {}
            }
        });
    }
}

/// Opens the native picker for `input`; blocks until the dialog closes.
pub fn pick_files(input: FileInputId) -> Option<Vec<PathBuf>> {
    let dialog = rfd::FileDialog::new().set_title(file_label(input));
    match input.arity() {
        FileArity::Single => dialog.pick_file().map(|path| vec![path]),
        FileArity::Pair => dialog.pick_files(),
    }
}

/// Turns queued picks into attach commands. Callers must not hold the
/// registry guard, since `pick` blocks on a modal dialog.
pub fn attach_picked(
    picks: Vec<FileInputId>,
    mut pick: impl FnMut(FileInputId) -> Option<Vec<PathBuf>>,
) -> Vec<BackendCommand> {
    picks
        .into_iter()
        .filter_map(|input| pick(input).map(|paths| BackendCommand::AttachFiles { input, paths }))
        .collect()
}

pub fn field_label(field: FieldId) -> &'static str {
    match field {
        FieldId::FocalLength => "Focal length",
        FieldId::PixelSize => "Pixel size",
        FieldId::SensorResolution => "Sensor resolution",
        FieldId::SensorSize => "Sensor size",
        FieldId::Distance => "Distance",
        FieldId::NumTiles => "Tiles",
        FieldId::SquareSize => "Square size",
        FieldId::ImagesCount => "Images count",
    }
}

pub fn file_label(input: FileInputId) -> &'static str {
    match input {
        FileInputId::CalibrationFile => "Calibration (.json)",
        FileInputId::ChessboardPair => "Chessboard images",
        FileInputId::ImagePair => "Images",
        FileInputId::ModelFile => "Model",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_become_attach_commands_and_cancelled_dialogs_are_skipped() {
        let registry = std::sync::Arc::new(tokio::sync::Mutex::new(MemoryRegistry::new()));
        let picks = vec![FileInputId::ImagePair, FileInputId::ModelFile];

        let commands = attach_picked(picks, |input| {
            assert!(
                registry.try_lock().is_ok(),
                "registry locked while a dialog is open"
            );
            match input {
                FileInputId::ImagePair => {
                    Some(vec![PathBuf::from("left.png"), PathBuf::from("right.png")])
                }
                _ => None,
            }
        });

        assert_eq!(commands.len(), 1);
        match &commands[0] {
            BackendCommand::AttachFiles { input, paths } => {
                assert_eq!(*input, FileInputId::ImagePair);
                assert_eq!(paths.len(), 2);
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    #[test]
    fn field_labels_are_distinct() {
        let labels: BTreeSet<&str> = FieldId::ALL.iter().map(|f| field_label(*f)).collect();
        assert_eq!(labels.len(), FieldId::ALL.len());
    }

    #[test]
    fn file_labels_are_distinct() {
        let labels: BTreeSet<&str> = FileInputId::ALL.iter().map(|f| file_label(*f)).collect();
        assert_eq!(labels.len(), FileInputId::ALL.len());
    }
}
