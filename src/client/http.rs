//! HTTP client for the relay's `/send-to-agent`

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ErrorResponse, RelayError};
use crate::models::{OutboundPayload, OutboundRequest};

/// Posts chat sends to a running relay
pub struct RelayClient {
    http_client: Client,
    base_url: Url,
}

impl RelayClient {
    /// `base_url` is the relay's HTTP root, e.g. `http://localhost:3001`
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RelayError::Config(format!("relay URL {base_url:?}: {e}")))?;
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn join(&self, path: &str) -> Result<Url, RelayError> {
        self.base_url
            .join(path)
            .map_err(|e| RelayError::Config(format!("relay URL: {e}")))
    }

    /// WebSocket URL of the relay's push channel
    pub fn push_url(&self) -> Result<Url, RelayError> {
        let mut url = self.join("/ws")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| RelayError::Config("cannot derive push URL".to_string()))?;
        Ok(url)
    }

    /// Multipart form in the layout `/send-to-agent` expects
    pub fn form(request: &OutboundRequest) -> Result<Form, RelayError> {
        let mut form = Form::new()
            .text("agent", request.agent.as_str())
            .text("email", request.email.clone());

        if let Some(id) = request.correlation_id {
            form = form.text("correlationId", id.to_string());
        }

        form = match &request.payload {
            OutboundPayload::Text(text) => form.text("message", text.clone()),
            OutboundPayload::File(file) => {
                let part = Part::bytes(file.data.to_vec())
                    .file_name(file.filename.clone())
                    .mime_str(file.mime_type())
                    .map_err(|e| RelayError::validation(format!("invalid content type: {e}")))?;
                form.part(file.kind.field_name(), part)
            }
        };
        Ok(form)
    }

    pub fn build_request(&self, request: &OutboundRequest) -> Result<reqwest::Request, RelayError> {
        Ok(self
            .http_client
            .post(self.join("/send-to-agent")?)
            .multipart(Self::form(request)?)
            .build()?)
    }

    /// Send and return the relay's JSON answer.
    ///
    /// An `{ "error": ... }` reply becomes a `Validation` (4xx) or `Upstream`
    /// (5xx) error.
    pub async fn send(&self, request: &OutboundRequest) -> Result<Value, RelayError> {
        let response = self.http_client.execute(self.build_request(request)?).await?;
        let status = response.status();
        let value: Value = response.json().await?;
        debug!(status = status.as_u16(), "relay answered");

        if status.is_success() {
            return Ok(value);
        }
        let message = serde_json::from_value::<ErrorResponse>(value)
            .map(|e| e.error)
            .unwrap_or_else(|_| status.to_string());
        if status.is_client_error() {
            Err(RelayError::Validation(message))
        } else {
            Err(RelayError::Upstream(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentKind;

    #[test]
    fn test_push_url() {
        let client = RelayClient::new("http://localhost:3001").unwrap();
        assert_eq!(client.push_url().unwrap().as_str(), "ws://localhost:3001/ws");

        let client = RelayClient::new("https://relay.example.com").unwrap();
        assert_eq!(client.push_url().unwrap().as_str(), "wss://relay.example.com/ws");
    }

    #[test]
    fn test_build_request_targets_send_endpoint() {
        let client = RelayClient::new("http://localhost:3001").unwrap();
        let request =
            OutboundRequest::new(AgentKind::Interview, "a@b.com", Some("hi".into()), None)
                .unwrap();
        let http_request = client.build_request(&request).unwrap();
        assert_eq!(http_request.url().path(), "/send-to-agent");
        let content_type = http_request.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RelayClient::new("localhost"),
            Err(RelayError::Config(_))
        ));
    }
}
