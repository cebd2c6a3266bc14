use super::*;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use shared::{error::ErrorReply, protocol::ServerReply};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Settings;

const BOUNDARY: &str = "measure-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_request(path: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn test_app() -> (Router, TempDir) {
    let root = tempfile::tempdir().expect("tempdir");
    let dirs = prepare_upload_dirs(root.path()).expect("dirs");
    let state = AppState {
        settings: Arc::new(Settings::default()),
        dirs,
    };
    (build_router(state), root)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, body.to_vec())
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _root) = test_app();
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn calibration_upload_stores_json_files() {
    let (app, root) = test_app();
    let request = multipart_request(
        "/upload_calibration/",
        &[Part::File("calibration_file", "camera.json", b"{\"fx\": 1}")],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ServerReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(
        reply.result.as_deref(),
        Some("Calibration file uploaded successfully.")
    );
    let stored = std::fs::read(root.path().join("calibration").join("camera.json")).expect("file");
    assert_eq!(stored, b"{\"fx\": 1}");
}

#[tokio::test]
async fn calibration_upload_rejects_non_json() {
    let (app, _root) = test_app();
    let request = multipart_request(
        "/upload_calibration/",
        &[Part::File("calibration_file", "camera.yaml", b"fx: 1")],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, "Only JSON files are allowed.");
}

#[tokio::test]
async fn params_upload_echoes_every_field() {
    let (app, root) = test_app();
    let request = multipart_request(
        "/upload_params/",
        &[
            Part::Text("focal_length", "50"),
            Part::Text("pixel_size", "0.003"),
            Part::Text("sensor_resolution", "6000x4000"),
            Part::Text("sensor_size", "36x24"),
            Part::Text("distance", "1200"),
            Part::File("chessboard_image1", "board1.jpg", b"one"),
            Part::File("chessboard_image2", "board2.jpg", b"two"),
            Part::Text("num_tiles", "9x6"),
            Part::Text("square_size", "25"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ServerReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.echoed_text("focal_length").as_deref(), Some("50"));
    assert_eq!(reply.echoed_text("num_tiles").as_deref(), Some("9x6"));
    assert_eq!(reply.echoed_text("square_size").as_deref(), Some("25"));
    assert!(root
        .path()
        .join("calibration_photo")
        .join("board2.jpg")
        .exists());
}

#[tokio::test]
async fn params_upload_requires_every_text_field() {
    let (app, _root) = test_app();
    let request = multipart_request(
        "/upload_params/",
        &[
            Part::Text("focal_length", "50"),
            Part::File("chessboard_image1", "board1.jpg", b"one"),
            Part::File("chessboard_image2", "board2.jpg", b"two"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, "All fields must be provided.");
}

#[tokio::test]
async fn params_upload_requires_both_chessboard_images() {
    let (app, _root) = test_app();
    let request = multipart_request(
        "/upload_params/",
        &[
            Part::Text("focal_length", "50"),
            Part::Text("pixel_size", "0.003"),
            Part::Text("sensor_resolution", "6000x4000"),
            Part::Text("sensor_size", "36x24"),
            Part::Text("distance", "1200"),
            Part::File("chessboard_image1", "board1.jpg", b"one"),
            Part::Text("num_tiles", "9x6"),
            Part::Text("square_size", "25"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, "Calibration chessboard images are missing.");
}

#[tokio::test]
async fn model_upload_echoes_images_count() {
    let (app, root) = test_app();
    let request = multipart_request(
        "/upload_model/",
        &[
            Part::Text("images_count", "12"),
            Part::File("model_file", "scan.ply", b"ply"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ServerReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.echoed_text("images_count").as_deref(), Some("12"));
    assert_eq!(reply.result.as_deref(), Some("0.05 mm"));
    assert!(root.path().join("models").join("scan.ply").exists());
}

#[tokio::test]
async fn model_upload_without_count_is_rejected() {
    let (app, _root) = test_app();
    let request = multipart_request(
        "/upload_model/",
        &[Part::File("model_file", "scan.ply", b"ply")],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, "Images count and a model must be provided.");
}

#[tokio::test]
async fn image_pair_is_stored_and_measured() {
    let (app, root) = test_app();
    let request = multipart_request(
        "/upload_and_process/",
        &[
            Part::File("image1", "left.png", b"left"),
            Part::File("image2", "right.png", b"right"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ServerReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.result.as_deref(), Some("0.07 mm"));
    assert!(root.path().join("camera_images").join("left.png").exists());
    assert!(root.path().join("camera_images").join("right.png").exists());
}

#[tokio::test]
async fn image_pair_with_one_image_is_a_validation_error() {
    let (app, _root) = test_app();
    let request = multipart_request(
        "/upload_and_process/",
        &[
            Part::File("image1", "left.png", b"left"),
            Part::File("image2", "", b""),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, api::VALIDATION_ERROR);
}

#[tokio::test]
async fn unified_upload_accepts_a_model_and_echoes_parameters() {
    let (app, root) = test_app();
    let request = multipart_request(
        "/upload/",
        &[
            Part::Text("focal_length", "50"),
            Part::Text("distance", "1200"),
            Part::Text("images_count", "24"),
            Part::File("model", "scan.obj", b"obj"),
        ],
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ServerReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.result.as_deref(), Some("0.05 mm"));
    assert_eq!(reply.echoed_text("images_count").as_deref(), Some("24"));
    assert_eq!(reply.echoed_text("pixel_size"), None);
    assert!(root.path().join("models").join("scan.obj").exists());
}

#[tokio::test]
async fn unified_upload_without_inputs_reports_missing_images() {
    let (app, _root) = test_app();
    let request = multipart_request("/upload/", &[Part::Text("focal_length", "50")]);
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let reply: ErrorReply = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply.error, "Images are missing");
}
