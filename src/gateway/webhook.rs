//! Webhook gateway implementation

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::{FileUpload, OutboundPayload, OutboundRequest};

use super::endpoint::endpoint_url;
use super::{AgentGateway, CORRELATION_ID_HEADER, FILE_TYPE_HEADER, TARGET_HOST_HEADER};

/// Gateway that posts to the agent's webhooks over HTTP
pub struct WebhookGateway {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL the agent path is appended to
    base_url: String,
    /// Static bearer credential
    bearer_token: String,
    /// Where the agent should deliver its asynchronous reply
    callback_target: String,
}

impl WebhookGateway {
    /// Create a gateway from the relay configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URLs are invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        config.validate()?;

        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.agent_base_url.clone(),
            bearer_token: config.bearer_token.clone(),
            callback_target: config.callback_target_url.clone(),
        })
    }

    /// Build the outbound request without sending it
    pub fn build_request(&self, request: &OutboundRequest) -> Result<reqwest::Request, RelayError> {
        let url = endpoint_url(&self.base_url, request.agent, &request.email)?;

        let mut builder = self
            .http_client
            .post(url)
            .bearer_auth(&self.bearer_token)
            .header(TARGET_HOST_HEADER, &self.callback_target);

        if let Some(correlation_id) = request.correlation_id {
            builder = builder.header(CORRELATION_ID_HEADER, correlation_id.to_string());
        }

        builder = match &request.payload {
            OutboundPayload::Text(text) => builder.json(&text_body(text)),
            OutboundPayload::File(file) => builder
                .header(FILE_TYPE_HEADER, file.kind.as_str())
                .multipart(file_form(file)?),
        };

        Ok(builder.build()?)
    }
}

/// JSON body for a text message
fn text_body(text: &str) -> Value {
    json!({ "message": { "text": text } })
}

/// Multipart body holding the single uploaded file
fn file_form(file: &FileUpload) -> Result<Form, RelayError> {
    let part = Part::bytes(file.data.to_vec())
        .file_name(file.filename.clone())
        .mime_str(file.mime_type())
        .map_err(|e| RelayError::validation(format!("invalid content type: {e}")))?;
    Ok(Form::new().part(file.kind.field_name(), part))
}

#[async_trait]
impl AgentGateway for WebhookGateway {
    async fn send(&self, request: &OutboundRequest) -> Result<Value, RelayError> {
        let http_request = self.build_request(request)?;
        info!(
            agent = %request.agent,
            url = %http_request.url(),
            "forwarding message to agent"
        );

        let response = self.http_client.execute(http_request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            RelayError::Upstream(format!(
                "agent returned a non-JSON body (status {}): {}",
                status.as_u16(),
                e
            ))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "agent answered with an error status");
        } else {
            debug!(status = status.as_u16(), "agent accepted message");
        }

        Ok(value)
    }
}
