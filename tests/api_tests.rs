//! # HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, backed by
//! in-memory stores.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use pulselabel::printer::PrinterConfig;
use pulselabel::server::{AppState, ServerConfig, build_router};
use pulselabel::store::{MemoryJobStore, MemoryTemplateStore};

fn app_with_device(device_path: &str) -> Router {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        device_path: device_path.to_string(),
        template_dir: None,
        printer: PrinterConfig::TSP650II,
    };
    let state = AppState::with_stores(
        config,
        Arc::new(MemoryTemplateStore::new()),
        Arc::new(MemoryJobStore::new()),
    );
    build_router(Arc::new(state))
}

fn app() -> Router {
    app_with_device("/nonexistent/rfcomm0")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parcel_template() -> Value {
    json!({
        "name": "Parcel",
        "sizePreset": "custom",
        "canvasSize": { "width": 384, "height": 200 },
        "elements": [
            {
                "id": "recv",
                "type": "dynamic-field",
                "position": { "x": 0, "y": 0 },
                "size": { "width": 200, "height": 30 },
                "content": "receiver",
                "binding": "receiver",
                "layer": 0
            },
            {
                "id": "code",
                "type": "barcode",
                "position": { "x": 0, "y": 40 },
                "size": { "width": 300, "height": 60 },
                "content": "trackingNumber",
                "binding": "trackingNumber",
                "layer": 1
            }
        ]
    })
}

#[tokio::test]
async fn fields_lists_palette() {
    let (status, body) = send(&app(), "GET", "/api/fields", None).await;
    assert_eq!(status, StatusCode::OK);
    let fields: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fields[0]["id"], "text");
    assert!(
        fields
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["id"] == "tracking_barcode")
    );
}

#[tokio::test]
async fn template_crud() {
    let app = app();

    let (status, _) = send(&app, "PUT", "/api/templates/parcel", Some(parcel_template())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(list[0]["slug"], "parcel");
    assert_eq!(list[0]["elementCount"], 2);

    let (status, body) = send(&app, "GET", "/api/templates/Parcel", None).await;
    assert_eq!(status, StatusCode::OK);
    let loaded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(loaded["elements"][1]["type"], "barcode");

    let (status, _) = send(&app, "DELETE", "/api/templates/parcel", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/templates/parcel", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn template_name_must_match_path() {
    let (status, _) = send(&app(), "PUT", "/api/templates/other", Some(parcel_template())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_returns_png() {
    let body = json!({
        "layout": parcel_template(),
        "data": { "receiver": "Ada Nkem", "trackingNumber": "CM123" }
    });
    let (status, png) = send(&app(), "POST", "/api/labels/preview", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn preview_rejects_oversized_canvas() {
    let mut layout = parcel_template();
    layout["canvasSize"] = json!({ "width": 1e30, "height": 1e30 });
    let body = json!({ "layout": layout });
    let (status, _) = send(&app(), "POST", "/api/labels/preview", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn preview_clips_oversized_element() {
    let mut layout = parcel_template();
    layout["canvasSize"] = json!({ "width": 50, "height": 50 });
    layout["elements"].as_array_mut().unwrap().truncate(1);
    layout["elements"][0]["size"] = json!({ "width": 1e7, "height": 1e7 });
    layout["elements"][0]["style"] = json!({ "backgroundColor": "#000000" });
    let body = json!({ "layout": layout });
    let (status, png) = send(&app(), "POST", "/api/labels/preview", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn preview_unknown_template_is_404() {
    let body = json!({ "template": "missing" });
    let (status, _) = send(&app(), "POST", "/api/labels/preview", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn print_writes_job_to_device() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let app = app_with_device(device.path().to_str().unwrap());

    let body = json!({ "layout": parcel_template(), "data": { "receiver": "Ada" } });
    let (status, _) = send(&app, "POST", "/api/labels/print", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let written = std::fs::read(device.path()).unwrap();
    assert_eq!(&written[..2], &[0x1B, 0x40]);
    assert_eq!(&written[written.len() - 3..], &[0x1B, b'd', 2]);
}

#[tokio::test]
async fn print_with_partial_cut() {
    let device = tempfile::NamedTempFile::new().unwrap();
    let app = app_with_device(device.path().to_str().unwrap());

    let body = json!({ "layout": parcel_template(), "partialCut": true });
    let (status, _) = send(&app, "POST", "/api/labels/print", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let written = std::fs::read(device.path()).unwrap();
    assert_eq!(&written[written.len() - 3..], &[0x1B, b'd', 3]);
}

#[tokio::test]
async fn print_to_missing_device_fails() {
    let body = json!({ "layout": parcel_template() });
    let (status, _) = send(&app(), "POST", "/api/labels/print", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn bulk_validate_reports_invalid_rows() {
    let body = json!({
        "format": "csv",
        "data": "name,address,tracking\n\"A\",\"B\",\"\"\nC,D,T1\n",
        "rules": [{ "field": "tracking", "required": true }]
    });
    let (status, body) = send(&app(), "POST", "/api/bulk/validate", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["errorCount"], 1);
    assert_eq!(report["invalid"][0]["record"]["index"], 0);
    assert_eq!(report["invalid"][0]["errors"][0], "tracking is required");
    assert_eq!(report["valid"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_generate_logs_job_and_exports_csv() {
    let app = app();
    send(&app, "PUT", "/api/templates/parcel", Some(parcel_template())).await;

    let body = json!({
        "template": "parcel",
        "format": "json",
        "data": r#"[
            {"receiver": "Ada", "trackingNumber": "CM-1"},
            {"receiver": "Bih", "trackingNumber": ""},
            {"receiver": "Che", "trackingNumber": "CM-3"}
        ]"#,
        "rules": [{ "field": "trackingNumber", "required": true }]
    });
    let (status, body) = send(&app, "POST", "/api/bulk/generate", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["job"]["generated"], 2);
    assert_eq!(result["job"]["status"], "completed");
    assert_eq!(result["invalid"][0]["record"]["index"], 1);
    assert_eq!(result["printed"], false);

    let (_, body) = send(&app, "GET", "/api/jobs", None).await;
    let jobs: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/jobs/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(body).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("job_id,template,total,generated,failed,status,started_at,finished_at")
    );
    assert!(lines.next().unwrap().contains(",Parcel,2,2,0,completed,"));
}

#[tokio::test]
async fn bulk_generate_unknown_template_is_404() {
    let body = json!({ "template": "nope", "format": "json", "data": "[]" });
    let (status, _) = send(&app(), "POST", "/api/bulk/generate", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
