// Route definitions and handlers

use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::error::ErrorResponse;
use crate::gateway::AgentGateway;
use crate::handlers;
use crate::models::CallbackRequest;
use crate::relay::PushRelay;

/// Shared server state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn AgentGateway>,
    pub relay: Arc<PushRelay>,
    pub max_upload_bytes: u64,
}

impl AppState {
    pub fn new(gateway: Arc<dyn AgentGateway>, max_upload_bytes: u64) -> Self {
        Self {
            gateway,
            relay: Arc::new(PushRelay::new()),
            max_upload_bytes,
        }
    }
}

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let gateway = state.gateway.clone();
    let with_gateway = warp::any().map(move || gateway.clone());
    let relay = state.relay.clone();
    let with_relay = warp::any().map(move || relay.clone());

    // POST /send-to-agent
    let send_to_agent = warp::path("send-to-agent")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(state.max_upload_bytes))
        .and(with_gateway)
        .and_then(handlers::send_to_agent_handler);

    // POST /callback
    let callback = warp::path("callback")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<serde_json::Value>().map(CallbackRequest::from_body))
        .and(with_relay.clone())
        .and_then(handlers::callback_handler);

    // GET /ws
    let push = warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_relay.clone())
        .map(handlers::push_channel_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_relay)
        .and_then(handlers::health_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    send_to_agent
        .or(callback)
        .or(push)
        .or(health)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::trace::request())
}

/// Render warp's own rejections as `{ "error": ... }`
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "upload too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported content type".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    ))
}
