use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    load_settings, ActionOutcome, HttpTransport, MemoryRegistry, SelectedFile, UploadOrchestrator,
};
use shared::{
    domain::{FieldId, FileInputId},
    protocol::ActionKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    UploadCalibration,
    UploadParams,
    UploadModel,
    UploadAndProcess,
    Process,
}

impl From<Action> for ActionKind {
    fn from(value: Action) -> Self {
        match value {
            Action::UploadCalibration => ActionKind::UploadCalibration,
            Action::UploadParams => ActionKind::UploadParams,
            Action::UploadModel => ActionKind::UploadModel,
            Action::UploadAndProcess => ActionKind::UploadAndProcess,
            Action::Process => ActionKind::Process,
        }
    }
}

/// Fills the upload form from flags and triggers one action.
#[derive(Parser, Debug)]
struct Args {
    #[arg(value_enum)]
    action: Action,
    /// Overrides `server_url` from client.toml / APP__SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    calibration_mode: bool,
    #[arg(long)]
    model_mode: bool,
    /// `name=value`, e.g. `--field focal_length=50`. Repeatable.
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(FieldId, String)>,
    #[arg(long)]
    calibration_file: Option<PathBuf>,
    #[arg(long, num_args = 2)]
    chessboard: Vec<PathBuf>,
    #[arg(long, num_args = 2)]
    images: Vec<PathBuf>,
    #[arg(long)]
    model: Option<PathBuf>,
}

fn parse_field(raw: &str) -> Result<(FieldId, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let field = FieldId::parse_any(name.trim()).map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

async fn load_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(SelectedFile::from_path(path).await?);
    }
    Ok(files)
}

async fn build_registry(args: &Args) -> Result<MemoryRegistry> {
    let mut registry = MemoryRegistry::new();
    for (field, value) in &args.fields {
        registry.set_text(*field, value.clone());
    }
    if let Some(path) = &args.calibration_file {
        registry.set_files(
            FileInputId::CalibrationFile,
            load_files(std::slice::from_ref(path)).await?,
        );
    }
    if !args.chessboard.is_empty() {
        registry.set_files(FileInputId::ChessboardPair, load_files(&args.chessboard).await?);
    }
    if !args.images.is_empty() {
        registry.set_files(FileInputId::ImagePair, load_files(&args.images).await?);
    }
    if let Some(path) = &args.model {
        registry.set_files(
            FileInputId::ModelFile,
            load_files(std::slice::from_ref(path)).await?,
        );
    }
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = &args.server_url {
        settings.server_url = server_url.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }

    let registry = build_registry(&args).await?;
    let transport =
        HttpTransport::with_connect_timeout(&settings.server_url, settings.connect_timeout())
            .context("failed to prepare http transport")?;
    let orchestrator = UploadOrchestrator::new(registry, transport, &settings);
    orchestrator.initialize().await;
    orchestrator.set_calibration_mode(args.calibration_mode).await;
    orchestrator.set_model_mode(args.model_mode).await;

    let action = ActionKind::from(args.action);
    info!(action = action.name(), server_url = %settings.server_url, "running action");
    let outcome = orchestrator.activate(action).await;

    let registry = orchestrator.registry().await;
    for message in registry.notifications() {
        println!("{message}");
    }
    let displays: BTreeMap<&str, &str> = registry
        .displays()
        .iter()
        .map(|(display, text)| (display.element_id(), text.as_str()))
        .collect();
    if !displays.is_empty() {
        println!("{}", serde_json::to_string_pretty(&displays)?);
    }

    match outcome {
        Ok(ActionOutcome::Completed(_)) => Ok(()),
        Ok(ActionOutcome::AlreadyInFlight) => Err(anyhow!("action already in flight")),
        Err(e) => Err(e).with_context(|| format!("{} failed", action.name())),
    }
}
