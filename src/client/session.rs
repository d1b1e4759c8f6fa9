//! Per-tab chat log and the send/reply state machine

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::RelayError;
use crate::models::{AgentKind, ChatMessage, OutboundRequest, PushPayload, Sender};

use super::composer::{Composer, ComposerInput};

/// Text shown in a placeholder until the reply arrives
pub const PLACEHOLDER_TEXT: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    AwaitingReply,
    Resolved,
}

/// How a push was applied to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replaced the placeholder carrying the same correlation id
    Correlated { index: usize },
    /// No correlation match; replaced the first pending placeholder
    FirstPending { index: usize },
    /// Nothing pending; appended as a new message
    Appended { index: usize },
}

/// Ordered chat log for one client. Messages are only ever appended; a
/// placeholder is the only entry ever rewritten.
#[derive(Debug, Clone)]
pub struct ChatSession {
    email: String,
    messages: Vec<ChatMessage>,
    state: SendState,
    last_id: i64,
}

impl ChatSession {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            messages: Vec::new(),
            state: SendState::Idle,
            last_id: 0,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_placeholder).count()
    }

    /// Timestamp id, bumped so ids stay strictly increasing within this session
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    fn push_message(
        &mut self,
        sender: Sender,
        input: Option<ComposerInput>,
        is_placeholder: bool,
        correlation_id: Option<Uuid>,
    ) -> usize {
        let (text, attachment) = match input {
            Some(ComposerInput::Text(text)) => (Some(text), None),
            Some(ComposerInput::File(file)) => (None, Some(file)),
            None => (None, None),
        };
        let message = ChatMessage {
            id: self.next_id(),
            sender,
            text,
            attachment,
            created_at: Utc::now(),
            is_placeholder,
            correlation_id,
        };
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Take the composer's input, log it with a placeholder reply, and return
    /// the request to dispatch. The session stays `Sending` until
    /// [`mark_dispatched`](Self::mark_dispatched) is called.
    ///
    /// On error the composer and the log are left as they were.
    pub fn begin_send(
        &mut self,
        composer: &mut Composer,
        agent: AgentKind,
    ) -> Result<OutboundRequest, RelayError> {
        let (text, file) = match composer.input() {
            Some(ComposerInput::Text(text)) => (Some(text.clone()), None),
            Some(ComposerInput::File(file)) => (None, Some(file.clone())),
            None => (None, None),
        };
        let correlation_id = Uuid::new_v4();
        let request = OutboundRequest::new(agent, self.email.clone(), text, file)?
            .with_correlation_id(correlation_id);

        self.state = SendState::Sending;
        let input = composer.take();
        self.push_message(Sender::User, input, false, None);
        self.push_message(
            Sender::Ai,
            Some(ComposerInput::Text(PLACEHOLDER_TEXT.to_string())),
            true,
            Some(correlation_id),
        );

        debug!(%correlation_id, agent = %agent, "placeholder added");
        Ok(request)
    }

    /// Record that the relay accepted the request; the reply is now up to the
    /// agent. A reply that already arrived keeps the session `Resolved`.
    pub fn mark_dispatched(&mut self) {
        if self.state == SendState::Sending {
            self.state = SendState::AwaitingReply;
        }
    }

    /// Apply a push notification to the log
    pub fn apply_push(&mut self, payload: PushPayload) -> Resolution {
        if payload.from == Sender::User {
            let index = self.push_message(
                Sender::User,
                Some(ComposerInput::Text(payload.text)),
                false,
                payload.correlation_id,
            );
            return Resolution::Appended { index };
        }

        let correlated = payload.correlation_id.and_then(|id| {
            self.messages
                .iter()
                .position(|m| m.is_placeholder && m.correlation_id == Some(id))
        });

        let (index, resolution) = match correlated {
            Some(index) => (index, Resolution::Correlated { index }),
            None => match self.messages.iter().position(|m| m.is_placeholder) {
                Some(index) => {
                    debug!(index, "no correlated placeholder, resolving first pending");
                    (index, Resolution::FirstPending { index })
                }
                None => {
                    let index = self.push_message(
                        Sender::Ai,
                        Some(ComposerInput::Text(payload.text)),
                        false,
                        payload.correlation_id,
                    );
                    return Resolution::Appended { index };
                }
            },
        };

        let message = &mut self.messages[index];
        message.sender = Sender::Ai;
        message.text = Some(payload.text);
        message.is_placeholder = false;

        let in_flight = matches!(self.state, SendState::Sending | SendState::AwaitingReply);
        if in_flight && self.pending_count() == 0 {
            self.state = SendState::Resolved;
        }
        resolution
    }
}
