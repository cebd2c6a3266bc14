use std::sync::Arc;

use anyhow::{anyhow, Context};
use client_core::{load_settings, HttpTransport, MemoryRegistry, UploadOrchestrator};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread};
use controller::events::UiEvent;
use ui::UploadApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let transport =
        HttpTransport::with_connect_timeout(&settings.server_url, settings.connect_timeout())
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let orchestrator = Arc::new(UploadOrchestrator::new(
        MemoryRegistry::new(),
        transport,
        &settings,
    ));
    tracing::info!(server_url = %settings.server_url, "starting upload gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    spawn_backend_thread(Arc::clone(&orchestrator), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Measurement Upload")
            .with_inner_size([760.0, 720.0])
            .with_min_inner_size([560.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Measurement Upload",
        options,
        Box::new(|_cc| Ok(Box::new(UploadApp::new(cmd_tx, ui_rx, orchestrator)))),
    )
    .map_err(|err| anyhow!("gui terminated with error: {err}"))
}
