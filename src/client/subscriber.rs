//! Reconnecting push channel subscriber

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::models::PushPayload;

use super::reconnect::ReconnectPolicy;

type PushStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection ended
enum Disconnect {
    /// The consumer dropped its receiver; stop for good
    ReceiverGone,
    /// The channel closed or failed; reconnect
    Lost(RelayError),
}

/// Keeps one push channel open, reconnecting after every drop
pub struct PushSubscriber {
    url: String,
    policy: ReconnectPolicy,
}

impl PushSubscriber {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward every payload pushed by the relay to `sink`.
    ///
    /// Reconnects after each failure or close, waiting the policy's delay,
    /// with no limit on attempts. Returns once `sink`'s receiver is dropped, even
    /// while the connection is idle.
    pub async fn run(self, sink: UnboundedSender<PushPayload>) {
        let mut backoff = self.policy.backoff();

        loop {
            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    info!(url = %self.url, "push channel connected");
                    backoff.reset();
                    match pump(stream, &sink).await {
                        Disconnect::ReceiverGone => return,
                        Disconnect::Lost(err) => {
                            warn!(url = %self.url, error = %err, "push channel lost")
                        }
                    }
                }
                Err(e) => {
                    let err = RelayError::from(e);
                    warn!(url = %self.url, error = %err, "push channel connect failed");
                }
            }

            if sink.is_closed() {
                return;
            }
            let delay = backoff.next_delay();
            info!(
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "reconnecting push channel"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

async fn pump(mut stream: PushStream, sink: &UnboundedSender<PushPayload>) -> Disconnect {
    loop {
        let message = tokio::select! {
            _ = sink.closed() => {
                let _ = stream.close(None).await;
                return Disconnect::ReceiverGone;
            }
            message = stream.next() => message,
        };

        let message = match message {
            Some(Ok(message)) => message,
            Some(Err(e)) => return Disconnect::Lost(e.into()),
            None => break,
        };

        if message.is_close() {
            return Disconnect::Lost(RelayError::Channel("closed by relay".to_string()));
        }
        if !message.is_text() {
            continue;
        }

        let payload = match message
            .to_text()
            .map_err(RelayError::from)
            .and_then(|text| serde_json::from_str::<PushPayload>(text).map_err(RelayError::from))
        {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "skipping undecodable push");
                continue;
            }
        };

        if sink.send(payload).is_err() {
            return Disconnect::ReceiverGone;
        }
    }

    Disconnect::Lost(RelayError::Channel("stream ended".to_string()))
}
