mod common;

use agent_relay::gateway::{AgentGateway, WebhookGateway};
use agent_relay::models::{AgentKind, FileKind, FileUpload, OutboundRequest};
use agent_relay::{RelayConfig, RelayError};
use common::{AUDIO_BYTES, PDF_BYTES};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

const CALLBACK: &str = "https://relay.example.com/callback";

fn gateway_for(base_url: &str) -> WebhookGateway {
    let config = RelayConfig::new("OP_TEST_TOKEN", CALLBACK)
        .with_agent_base_url(base_url)
        .with_connect_timeout(Duration::from_secs(1));
    WebhookGateway::new(&config).expect("gateway")
}

fn gateway() -> WebhookGateway {
    gateway_for("https://agents.example.com/webhook")
}

fn query_email(request: &reqwest::Request) -> Option<String> {
    request
        .url()
        .query_pairs()
        .find(|(k, _)| k == "email")
        .map(|(_, v)| v.into_owned())
}

#[test]
fn test_interview_text_scenario() {
    let request =
        OutboundRequest::new(AgentKind::Interview, "a@b.com", Some("hello".into()), None).unwrap();
    let http_request = gateway().build_request(&request).unwrap();

    assert_eq!(http_request.method(), reqwest::Method::POST);
    assert_eq!(http_request.url().path(), "/webhook/interview_expert");
    assert_eq!(query_email(&http_request).as_deref(), Some("a@b.com"));

    let headers = http_request.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["authorization"], "Bearer OP_TEST_TOKEN");
    assert_eq!(headers["targethost"], CALLBACK);
    assert!(headers.get("filetype").is_none());

    let body = http_request.body().and_then(|b| b.as_bytes()).unwrap();
    let body: Value = serde_json::from_slice(body).unwrap();
    assert_eq!(body, json!({"message": {"text": "hello"}}));
}

#[test]
fn test_profile_pdf_scenario() {
    let file = FileUpload::new(FileKind::Pdf, PDF_BYTES)
        .with_filename("cv.pdf")
        .with_content_type("application/pdf");
    let request = OutboundRequest::new(AgentKind::Profile, "a@b.com", None, Some(file)).unwrap();
    let http_request = gateway().build_request(&request).unwrap();

    assert_eq!(http_request.url().path(), "/webhook/profile_generator");
    let headers = http_request.headers();
    assert_eq!(headers["filetype"], "pdf");
    assert_eq!(headers["authorization"], "Bearer OP_TEST_TOKEN");
    assert_eq!(headers["targethost"], CALLBACK);
    let content_type = headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
}

#[test]
fn test_audio_upload_headers() {
    let file = FileUpload::new(FileKind::Audio, AUDIO_BYTES);
    let request = OutboundRequest::new(AgentKind::Interview, "a@b.com", None, Some(file)).unwrap();
    let http_request = gateway().build_request(&request).unwrap();

    assert_eq!(http_request.url().path(), "/webhook/interview_expert");
    assert_eq!(http_request.headers()["filetype"], "audio");
    let content_type = http_request.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[test]
fn test_correlation_id_forwarded() {
    let id = Uuid::new_v4();
    let request = OutboundRequest::new(AgentKind::Interview, "a@b.com", Some("hi".into()), None)
        .unwrap()
        .with_correlation_id(id);
    let http_request = gateway().build_request(&request).unwrap();
    assert_eq!(http_request.headers()["correlationid"], id.to_string().as_str());
}

#[tokio::test]
async fn test_unreachable_agent_is_upstream_error() {
    // Nothing listens on port 1
    let gateway = gateway_for("http://127.0.0.1:1/webhook");
    let request =
        OutboundRequest::new(AgentKind::Interview, "a@b.com", Some("hello".into()), None).unwrap();

    let err = gateway.send(&request).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream(_)));
}
