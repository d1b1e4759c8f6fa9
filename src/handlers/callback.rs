// POST /callback handler

use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;

use crate::models::{CallbackRequest, PushPayload};
use crate::relay::PushRelay;

/// Receive the agent's asynchronous reply and push it to every open channel.
///
/// The caller is not authenticated. Always answers `200 OK`, even when no
/// channel is connected, the body has no usable fields, or the broadcast fails.
pub async fn callback_handler(
    callback: CallbackRequest,
    relay: Arc<PushRelay>,
) -> Result<impl warp::Reply, Infallible> {
    match &callback.text {
        Some(text) => info!(
            chars = text.chars().count(),
            correlation_id = ?callback.correlation_id,
            "callback received from agent"
        ),
        None => warn!(
            correlation_id = ?callback.correlation_id,
            "callback without text, relaying an empty reply"
        ),
    }

    let payload = PushPayload::from(callback);
    match relay.broadcast(&payload) {
        Ok(report) => info!(
            delivered = report.delivered,
            failed = report.failed,
            "callback relayed"
        ),
        Err(err) => error!(error = %err, "failed to relay callback"),
    }

    Ok(warp::reply::with_status("OK", StatusCode::OK))
}
