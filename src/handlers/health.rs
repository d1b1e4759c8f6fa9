// GET /health handler

use std::convert::Infallible;
use std::sync::Arc;

use crate::models::HealthResponse;
use crate::relay::PushRelay;

pub async fn health_handler(relay: Arc<PushRelay>) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&HealthResponse {
        status: "ok".to_string(),
        channels: relay.len(),
    }))
}
