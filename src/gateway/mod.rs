//! Agent Gateway
//!
//! Forwards a validated [`OutboundRequest`] to one of the two agent webhooks
//! and returns whatever JSON the agent answers synchronously. The real reply
//! arrives later through `/callback`.

pub mod endpoint;
pub mod webhook;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RelayError;
use crate::models::OutboundRequest;

pub use endpoint::endpoint_url;
pub use webhook::WebhookGateway;

/// Header carrying the URL the agent should post its reply to
pub const TARGET_HOST_HEADER: &str = "targetHost";
/// Header classifying a file upload (`audio` or `pdf`)
pub const FILE_TYPE_HEADER: &str = "fileType";
/// Header carrying the placeholder correlation id
pub const CORRELATION_ID_HEADER: &str = "correlationId";

/// Interface to the external agent
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Perform exactly one outbound call for `request`
    ///
    /// # Returns
    /// The agent's synchronous JSON response, or an `Upstream` error on
    /// network failure or a non-JSON body. Never retried.
    async fn send(&self, request: &OutboundRequest) -> Result<Value, RelayError>;
}
