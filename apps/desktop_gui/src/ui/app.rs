use std::{collections::BTreeSet, sync::Arc, time::Duration};

use client_core::{ModeFlags, UiState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::protocol::ActionKind;

use crate::backend_bridge::{commands::BackendCommand, Orchestrator};
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};
use crate::ui::panels::{attach_picked, pick_files, Panels};

pub struct UploadApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    orchestrator: Arc<Orchestrator>,
    modes: ModeFlags,
    state: UiState,
    /// Actions queued or in flight; their buttons stay disabled.
    pending: BTreeSet<ActionKind>,
    alerts: Vec<String>,
    status: String,
}

impl UploadApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        orchestrator: Arc<Orchestrator>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            orchestrator,
            modes: ModeFlags::default(),
            state: UiState::default(),
            pending: BTreeSet::new(),
            alerts: Vec::new(),
            status: "Starting backend...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::Error(message) => {
                    self.status = message.clone();
                    self.alerts.push(message);
                }
                UiEvent::StateChanged(state) => self.state = state,
                UiEvent::ActionFinished { action, report } => {
                    self.pending.remove(&action);
                    self.status = report.status_line(action);
                }
            }
        }
    }

    fn collect_alerts(&mut self) {
        let notifications = self.orchestrator.registry_blocking().take_notifications();
        self.alerts.extend(notifications);
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        let activated = match &cmd {
            BackendCommand::Activate(action) => Some(*action),
            _ => None,
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            if let Some(action) = activated {
                self.pending.insert(action);
            }
        }
    }

    fn mode_toggles(&mut self, ui: &mut egui::Ui, commands: &mut Vec<BackendCommand>) {
        ui.horizontal(|ui| {
            if ui
                .checkbox(&mut self.modes.calibration_mode, "Calibration mode")
                .changed()
            {
                commands.push(BackendCommand::SetCalibrationMode(
                    self.modes.calibration_mode,
                ));
            }
            if ui
                .checkbox(&mut self.modes.model_mode, "3D model mode")
                .changed()
            {
                commands.push(BackendCommand::SetModelMode(self.modes.model_mode));
            }
        });
    }

    fn show_alerts(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alerts.first().cloned() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alerts.remove(0);
                }
            });
    }
}

impl eframe::App for UploadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.collect_alerts();

        let mut commands = Vec::new();
        let mut picks = Vec::new();
        egui::TopBottomPanel::top("modes").show(ctx, |ui| {
            self.mode_toggles(ui, &mut commands);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let mut registry = self.orchestrator.registry_blocking();
                Panels {
                    registry: &mut registry,
                    state: &self.state,
                    pending: &self.pending,
                    commands: &mut commands,
                    picks: &mut picks,
                }
                .show(ui);
            });
        });
        self.show_alerts(ctx);

        commands.extend(attach_picked(picks, pick_files));
        for cmd in commands {
            self.dispatch(cmd);
        }

        if self.pending.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        } else {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
