// GET /ws push channel

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};
use warp::ws::{Message, WebSocket, Ws};

use crate::error::RelayError;
use crate::relay::PushRelay;

pub fn push_channel_handler(ws: Ws, relay: Arc<PushRelay>) -> impl warp::Reply {
    ws.on_upgrade(move |socket| serve_channel(socket, relay))
}

/// Register the socket, forward broadcasts to it until either side closes,
/// then unregister. Nothing the client sends is acted on.
async fn serve_channel(socket: WebSocket, relay: Arc<PushRelay>) {
    let (mut sink, mut stream) = socket.split();
    let (channel_id, rx) = relay.register();
    info!(channel = %channel_id, connected = relay.len(), "push channel connected");

    let mut outgoing = UnboundedReceiverStream::new(rx);
    let writer = tokio::spawn(async move {
        while let Some(text) = outgoing.next().await {
            if let Err(e) = sink.send(Message::text(text.to_string())).await {
                let err = RelayError::Channel(e.to_string());
                warn!(channel = %channel_id, error = %err, "push send failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(msg) if msg.is_close() => break,
            Ok(_) => debug!(channel = %channel_id, "ignoring client message"),
            Err(e) => {
                let err = RelayError::Channel(e.to_string());
                warn!(channel = %channel_id, error = %err, "push channel read failed");
                break;
            }
        }
    }

    relay.unregister(channel_id);
    writer.abort();
    info!(channel = %channel_id, connected = relay.len(), "push channel closed");
}
