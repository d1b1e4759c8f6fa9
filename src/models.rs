// Data structures shared by the relay server and the client library

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use crate::error::RelayError;

// Which remote agent a request is routed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Interview,
    Profile,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Interview => "interview",
            AgentKind::Profile => "profile",
        }
    }

    /// Webhook path segment on the agent host
    pub fn webhook_path(&self) -> &'static str {
        match self {
            AgentKind::Interview => "interview_expert",
            AgentKind::Profile => "profile_generator",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "interview" => Ok(AgentKind::Interview),
            "profile" => Ok(AgentKind::Profile),
            other => Err(RelayError::validation(format!("unknown agent: {other}"))),
        }
    }
}

// Kind of file attached to a send
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Audio,
    Pdf,
}

impl FileKind {
    /// Classify an upload by the form field it arrived in
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "audioBlob" => Some(FileKind::Audio),
            "pdfFile" => Some(FileKind::Pdf),
            _ => None,
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            FileKind::Audio => "audioBlob",
            FileKind::Pdf => "pdfFile",
        }
    }

    /// Value of the `fileType` header sent to the agent
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Audio => "audio",
            FileKind::Pdf => "pdf",
        }
    }

    pub fn default_mime(&self) -> &'static str {
        match self {
            FileKind::Audio => "audio/webm",
            FileKind::Pdf => "application/pdf",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            FileKind::Audio => "audio.webm",
            FileKind::Pdf => "document.pdf",
        }
    }
}

// A single uploaded file, held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub data: Bytes,
    pub filename: String,
    pub kind: FileKind,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(kind: FileKind, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            filename: kind.default_filename().to_string(),
            kind,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| self.kind.default_mime())
    }
}

// What an outbound request carries: exactly one modality
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    Text(String),
    File(FileUpload),
}

/// A validated request to forward to the agent. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub agent: AgentKind,
    pub email: String,
    pub payload: OutboundPayload,
    pub correlation_id: Option<Uuid>,
}

impl OutboundRequest {
    /// Build a request from optional text and file, rejecting neither-or-both.
    /// Empty text counts as absent.
    pub fn new(
        agent: AgentKind,
        email: impl Into<String>,
        text: Option<String>,
        file: Option<FileUpload>,
    ) -> Result<Self, RelayError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(RelayError::validation("email is required"));
        }

        let text = text.filter(|t| !t.trim().is_empty());
        let payload = match (text, file) {
            (Some(text), None) => OutboundPayload::Text(text),
            (None, Some(file)) => OutboundPayload::File(file),
            (Some(_), Some(_)) => {
                return Err(RelayError::validation(
                    "send either a message or a file, not both",
                ))
            }
            (None, None) => return Err(RelayError::validation("nothing to send")),
        };

        Ok(Self {
            agent,
            email,
            payload,
            correlation_id: None,
        })
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            OutboundPayload::Text(text) => Some(text),
            OutboundPayload::File(_) => None,
        }
    }

    pub fn file(&self) -> Option<&FileUpload> {
        match &self.payload {
            OutboundPayload::File(file) => Some(file),
            OutboundPayload::Text(_) => None,
        }
    }
}

// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

// Body the agent posts to /callback. Every field is optional and loosely
// typed: a reply is relayed even when the agent's JSON is not quite right.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(default, deserialize_with = "lenient_uuid")]
    pub correlation_id: Option<Uuid>,
}

impl CallbackRequest {
    /// Read a callback out of any JSON body. A body that is not an object
    /// yields an empty callback.
    pub fn from_body(body: Value) -> Self {
        serde_json::from_value(body).unwrap_or_else(|e| {
            warn!(error = %e, "callback body is not an object");
            Self::default()
        })
    }
}

/// Strings pass through, other scalars keep their JSON spelling, null is absent
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// An id that is not a UUID is dropped, not rejected
fn lenient_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(raw) => match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(correlation_id = %raw, "ignoring malformed correlationId");
                None
            }
        },
        other => {
            warn!(correlation_id = %other, "ignoring malformed correlationId");
            None
        }
    })
}

// JSON pushed to every connected channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub from: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl PushPayload {
    pub fn from_agent(text: impl Into<String>, correlation_id: Option<Uuid>) -> Self {
        Self {
            from: Sender::Ai,
            text: text.into(),
            correlation_id,
        }
    }
}

impl From<CallbackRequest> for PushPayload {
    fn from(callback: CallbackRequest) -> Self {
        // The claimed sender is ignored: callbacks always come from the agent
        PushPayload::from_agent(callback.text.unwrap_or_default(), callback.correlation_id)
    }
}

// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub channels: usize,
}

/// One entry in a client's chat log
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub sender: Sender,
    pub text: Option<String>,
    pub attachment: Option<FileUpload>,
    pub created_at: DateTime<Utc>,
    pub is_placeholder: bool,
    pub correlation_id: Option<Uuid>,
}
