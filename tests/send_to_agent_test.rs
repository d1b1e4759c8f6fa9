mod common;

use agent_relay::handlers::send_to_agent::{forward, FormField};
use agent_relay::models::{AgentKind, FileKind, OutboundPayload};
use agent_relay::RelayError;
use common::{form, RecordingGateway, AUDIO_BYTES, PDF_BYTES};
use warp::http::StatusCode;

#[tokio::test]
async fn test_text_only_makes_one_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("interview", "a@b.com");
    fields.push(FormField::text("message", "hello"));

    let value = forward(&gateway, fields).await.unwrap();
    assert_eq!(value["status"], "received");

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].agent, AgentKind::Interview);
    assert_eq!(calls[0].email, "a@b.com");
    assert_eq!(calls[0].payload, OutboundPayload::Text("hello".to_string()));
}

#[tokio::test]
async fn test_pdf_only_makes_one_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("profile", "a@b.com");
    fields.push(FormField::file("pdfFile", "cv.pdf", "application/pdf", PDF_BYTES));

    forward(&gateway, fields).await.unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    let file = calls[0].file().unwrap();
    assert_eq!(file.kind, FileKind::Pdf);
    assert_eq!(&file.data[..], PDF_BYTES);
}

#[tokio::test]
async fn test_audio_only_makes_one_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("interview", "a@b.com");
    fields.push(FormField::file("audioBlob", "audio.webm", "audio/webm", AUDIO_BYTES));

    forward(&gateway, fields).await.unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].file().unwrap().kind, FileKind::Audio);
}

#[tokio::test]
async fn test_file_and_text_rejected_before_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("profile", "a@b.com");
    fields.push(FormField::text("message", "see attached"));
    fields.push(FormField::file("pdfFile", "cv.pdf", "application/pdf", PDF_BYTES));

    let err = forward(&gateway, fields).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_nothing_to_send_rejected_before_call() {
    let gateway = RecordingGateway::new();
    let err = forward(&gateway, form("interview", "a@b.com"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "nothing to send");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_file_rejected_before_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("interview", "a@b.com");
    fields.push(FormField::file("videoFile", "clip.mp4", "video/mp4", vec![0u8; 4]));

    let err = forward(&gateway, fields).await.unwrap_err();
    assert_eq!(err.to_string(), "unsupported file type");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_agent_rejected_before_call() {
    let gateway = RecordingGateway::new();
    let mut fields = form("sales", "a@b.com");
    fields.push(FormField::text("message", "hello"));

    let err = forward(&gateway, fields).await.unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_server_error() {
    let gateway = RecordingGateway::failing("connection refused");
    let mut fields = form("interview", "a@b.com");
    fields.push(FormField::text("message", "hello"));

    let err = forward(&gateway, fields).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.client_message(), "failed to send to agent");
    // Not retried
    assert_eq!(gateway.calls().len(), 1);
}
