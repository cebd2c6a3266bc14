//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread};

use anyhow::Result;
use client_core::{ActionOutcome, SelectedFile};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::{commands::BackendCommand, Orchestrator};
use crate::controller::events::{ActionReport, UiEvent};

pub fn spawn_backend_thread(
    orchestrator: Arc<Orchestrator>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async {
            orchestrator.initialize().await;
            publish_state(&orchestrator, &ui_tx).await;
        });
        let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

        // Each command runs as its own task so a slow upload never blocks a cancel.
        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), "backend received command");
            let orchestrator = Arc::clone(&orchestrator);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                handle_command(&orchestrator, cmd, &ui_tx).await;
                publish_state(&orchestrator, &ui_tx).await;
            });
        }
        tracing::info!("ui command channel closed; backend worker stopping");
    });
}

async fn handle_command(orchestrator: &Orchestrator, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    match cmd {
        BackendCommand::SetCalibrationMode(on) => orchestrator.set_calibration_mode(on).await,
        BackendCommand::SetModelMode(on) => orchestrator.set_model_mode(on).await,
        BackendCommand::AttachFiles { input, paths } => match load_files(&paths).await {
            Ok(files) => {
                let count = files.len();
                orchestrator.registry().await.set_files(input, files);
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "{count} file(s) attached to {}",
                    input.element_id()
                )));
            }
            Err(err) => {
                tracing::warn!(input = input.element_id(), "failed to attach files: {err:#}");
                let _ = ui_tx.try_send(UiEvent::Error(format!("{err:#}")));
            }
        },
        BackendCommand::ClearFiles { input } => {
            orchestrator.registry().await.clear_files(input);
        }
        BackendCommand::Activate(action) => {
            let report = match orchestrator.activate(action).await {
                Ok(ActionOutcome::Completed(_)) => ActionReport::Completed,
                Ok(ActionOutcome::AlreadyInFlight) => ActionReport::AlreadyInFlight,
                Err(err) => ActionReport::Failed(err.to_string()),
            };
            let _ = ui_tx.try_send(UiEvent::ActionFinished { action, report });
        }
        BackendCommand::Cancel(action) => {
            if !orchestrator.cancel(action).await {
                tracing::debug!(action = action.name(), "nothing in flight to cancel");
            }
        }
    }
}

async fn publish_state(orchestrator: &Orchestrator, ui_tx: &Sender<UiEvent>) {
    let state = orchestrator.snapshot().await;
    let _ = ui_tx.try_send(UiEvent::StateChanged(state));
}

async fn load_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();
        files.push(
            SelectedFile::from_path(path)
                .await?
                .with_mime_type(mime_type.essence_str()),
        );
    }
    Ok(files)
}
