//! Upload endpoints. Each accepts a multipart form and answers with JSON.

use std::{collections::HashMap, path::Path};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use shared::{
    domain::FieldId,
    error::ErrorReply,
    protocol::{wire, ServerReply},
};
use tracing::{error, info};

use crate::app_state::AppState;

pub(crate) const VALIDATION_ERROR: &str =
    "Validation error. Please check all fields and file uploads.";
const MAX_FILENAME_BYTES: usize = 180;

type ApiFailure = (StatusCode, Json<ErrorReply>);
type ApiResult = Result<Json<ServerReply>, ApiFailure>;

fn unprocessable(message: impl Into<String>) -> ApiFailure {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorReply::new(message)),
    )
}

fn internal(message: impl Into<String>) -> ApiFailure {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorReply::new(message)),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    texts: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Non-blank text value of `name`.
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub(crate) fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

/// Reduces a client-supplied file name to a safe final path component.
pub(crate) fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." || name.len() > MAX_FILENAME_BYTES {
        return None;
    }
    Some(name.to_string())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiFailure> {
    let mut form = UploadForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "malformed multipart body");
                return Err(unprocessable(VALIDATION_ERROR));
            }
        };
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            error!(error = %e, part = %name, "failed to read multipart part");
            unprocessable(VALIDATION_ERROR)
        })?;

        match file_name {
            // Browsers send an empty part with an empty file name for an untouched file input.
            Some(raw) if raw.is_empty() && bytes.is_empty() => {}
            Some(raw) => {
                let file_name = sanitize_file_name(&raw)
                    .ok_or_else(|| unprocessable(format!("invalid file name for '{name}'")))?;
                form.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                form.texts
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }
    Ok(form)
}

async fn store(dir: &Path, file: &UploadedFile) -> Result<(), ApiFailure> {
    let path = dir.join(&file.file_name);
    tokio::fs::write(&path, &file.bytes).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to store upload");
        internal("failed to store upload")
    })?;
    info!(path = %path.display(), bytes = file.bytes.len(), "stored upload");
    Ok(())
}

pub(crate) async fn upload_calibration(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_form(multipart).await?;
    let file = form
        .file(wire::CALIBRATION_FILE)
        .ok_or_else(|| unprocessable(VALIDATION_ERROR))?;
    if !file.file_name.ends_with(".json") {
        return Err(unprocessable("Only JSON files are allowed."));
    }

    store(&state.dirs.calibration, file).await?;
    Ok(Json(ServerReply::with_result(
        "Calibration file uploaded successfully.",
    )))
}

const PARAM_FIELDS: [FieldId; 7] = [
    FieldId::FocalLength,
    FieldId::PixelSize,
    FieldId::SensorResolution,
    FieldId::SensorSize,
    FieldId::Distance,
    FieldId::NumTiles,
    FieldId::SquareSize,
];

pub(crate) async fn upload_params(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_form(multipart).await?;
    let mut reply = ServerReply::with_result("Calibration parameters uploaded successfully.");
    for field in PARAM_FIELDS {
        let value = form
            .text(field.wire_name())
            .ok_or_else(|| unprocessable("All fields must be provided."))?;
        reply = reply.echo(field.wire_name(), value);
    }

    let (Some(board1), Some(board2)) = (
        form.file(wire::CHESSBOARD_IMAGE1),
        form.file(wire::CHESSBOARD_IMAGE2),
    ) else {
        return Err(unprocessable("Calibration chessboard images are missing."));
    };
    store(&state.dirs.calibration_photos, board1).await?;
    store(&state.dirs.calibration_photos, board2).await?;

    Ok(Json(reply))
}

pub(crate) async fn upload_model(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_form(multipart).await?;
    let (Some(images_count), Some(model)) = (
        form.text(wire::IMAGES_COUNT),
        form.file(wire::MODEL_FILE),
    ) else {
        return Err(unprocessable("Images count and a model must be provided."));
    };

    store(&state.dirs.models, model).await?;
    Ok(Json(
        ServerReply::with_result(state.settings.process_result.clone())
            .echo(wire::IMAGES_COUNT, images_count),
    ))
}

pub(crate) async fn upload_and_process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_form(multipart).await?;
    let (Some(image1), Some(image2)) = (form.file(wire::IMAGE1), form.file(wire::IMAGE2)) else {
        return Err(unprocessable(VALIDATION_ERROR));
    };

    store(&state.dirs.images, image1).await?;
    store(&state.dirs.images, image2).await?;
    Ok(Json(ServerReply::with_result(
        state.settings.image_pair_result.clone(),
    )))
}

/// Mode-aware processing: a model (with its images count) or an image pair,
/// plus whichever camera parameters were supplied.
pub(crate) async fn upload(State(state): State<AppState>, multipart: Multipart) -> ApiResult {
    let form = read_form(multipart).await?;

    if let Some(model) = form.file(wire::MODEL) {
        store(&state.dirs.models, model).await?;
    } else if let (Some(image1), Some(image2)) = (form.file(wire::IMAGE1), form.file(wire::IMAGE2))
    {
        store(&state.dirs.images, image1).await?;
        store(&state.dirs.images, image2).await?;
    } else {
        return Err(unprocessable("Images are missing"));
    }

    let mut reply = ServerReply::with_result(state.settings.process_result.clone());
    for field in FieldId::CAMERA_PARAMS
        .into_iter()
        .chain([FieldId::ImagesCount])
    {
        if let Some(value) = form.text(field.wire_name()) {
            reply = reply.echo(field.wire_name(), value);
        }
    }
    Ok(Json(reply))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
