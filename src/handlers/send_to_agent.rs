// POST /send-to-agent handler

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::TryStreamExt;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use warp::multipart::{FormData, Part};
use warp::Reply;

use crate::error::RelayError;
use crate::gateway::AgentGateway;
use crate::models::{AgentKind, FileKind, FileUpload, OutboundRequest};

/// One decoded multipart field
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }

    fn is_file(&self) -> bool {
        self.filename.is_some() || FileKind::from_field_name(&self.name).is_some()
    }

    fn into_string(self) -> Result<String, RelayError> {
        String::from_utf8(self.data.to_vec())
            .map_err(|_| RelayError::validation(format!("field {} is not valid UTF-8", self.name)))
    }
}

pub async fn send_to_agent_handler(
    form: FormData,
    gateway: Arc<dyn AgentGateway>,
) -> Result<warp::reply::Response, Infallible> {
    let outcome = match collect_fields(form).await {
        Ok(fields) => forward(gateway.as_ref(), fields).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(value) => Ok(warp::reply::json(&value).into_response()),
        Err(err) => {
            warn!(error = %err, status = err.status().as_u16(), "send-to-agent failed");
            Ok(err.into_response())
        }
    }
}

/// Validate the decoded form and make exactly one gateway call.
///
/// Every validation failure is returned before the gateway is touched.
pub async fn forward(
    gateway: &dyn AgentGateway,
    fields: Vec<FormField>,
) -> Result<Value, RelayError> {
    let request = parse_fields(fields)?;
    info!(
        agent = %request.agent,
        email = %request.email,
        file = request.file().map(|f| f.kind.as_str()),
        "send-to-agent"
    );
    gateway.send(&request).await
}

/// Turn the form fields into an [`OutboundRequest`]
pub fn parse_fields(fields: Vec<FormField>) -> Result<OutboundRequest, RelayError> {
    let mut agent = None;
    let mut email = None;
    let mut message = None;
    let mut correlation_id = None;
    let mut file: Option<FileUpload> = None;

    for field in fields {
        if field.is_file() {
            let kind = FileKind::from_field_name(&field.name)
                .ok_or_else(|| RelayError::validation("unsupported file type"))?;
            if file.is_some() {
                return Err(RelayError::validation("only one file may be attached"));
            }
            let mut upload = FileUpload::new(kind, field.data);
            if let Some(filename) = field.filename.filter(|f| !f.is_empty()) {
                upload = upload.with_filename(filename);
            }
            if let Some(content_type) = field.content_type {
                upload = upload.with_content_type(content_type);
            }
            file = Some(upload);
            continue;
        }

        match field.name.as_str() {
            "agent" => agent = Some(field.into_string()?.parse::<AgentKind>()?),
            "email" => email = Some(field.into_string()?),
            "message" => message = Some(field.into_string()?),
            "correlationId" => {
                let raw = field.into_string()?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| RelayError::validation("invalid correlationId"))?;
                correlation_id = Some(id);
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let agent = agent.ok_or_else(|| RelayError::validation("agent is required"))?;
    let email = email.unwrap_or_default();
    let request = OutboundRequest::new(agent, email, message, file)?;

    Ok(match correlation_id {
        Some(id) => request.with_correlation_id(id),
        None => request,
    })
}

async fn collect_fields(form: FormData) -> Result<Vec<FormField>, RelayError> {
    let parts: Vec<Part> = form
        .try_collect()
        .await
        .map_err(|e| RelayError::validation(format!("malformed form data: {e}")))?;

    let mut fields = Vec::with_capacity(parts.len());
    for part in parts {
        fields.push(read_part(part).await?);
    }
    Ok(fields)
}

async fn read_part(mut part: Part) -> Result<FormField, RelayError> {
    let name = part.name().to_string();
    let filename = part.filename().map(str::to_string);
    let content_type = part.content_type().map(str::to_string);

    let mut data = BytesMut::new();
    while let Some(chunk) = part.data().await {
        let chunk =
            chunk.map_err(|e| RelayError::validation(format!("malformed form data: {e}")))?;
        data.put(chunk);
    }

    Ok(FormField {
        name,
        filename,
        content_type,
        data: data.freeze(),
    })
}
