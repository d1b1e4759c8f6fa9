#![allow(dead_code)]

use agent_relay::gateway::AgentGateway;
use agent_relay::handlers::send_to_agent::FormField;
use agent_relay::models::OutboundRequest;
use agent_relay::RelayError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

/// Gateway stub that records every request it is asked to send
pub struct RecordingGateway {
    calls: Mutex<Vec<OutboundRequest>>,
    fail_with: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// A gateway whose every call fails as if the agent were unreachable
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentGateway for RecordingGateway {
    async fn send(&self, request: &OutboundRequest) -> Result<Value, RelayError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.fail_with {
            Some(reason) => Err(RelayError::Upstream(reason.clone())),
            None => Ok(json!({"status": "received"})),
        }
    }
}

pub fn form(agent: &str, email: &str) -> Vec<FormField> {
    vec![FormField::text("agent", agent), FormField::text("email", email)]
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%fake\n";
pub const AUDIO_BYTES: &[u8] = b"\x1a\x45\xdf\xa3webm";
