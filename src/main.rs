use std::sync::Arc;

use agent_relay::gateway::WebhookGateway;
use agent_relay::routes::{configure_routes, AppState};
use agent_relay::RelayConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agent_relay=info,warp=info")),
        )
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let gateway = match WebhookGateway::new(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(Arc::new(gateway), config.max_upload_bytes);
    let routes = configure_routes(state);

    warn!("/callback accepts replies from any caller; keep it behind a trusted network");
    info!(
        agent_base_url = %config.agent_base_url,
        callback_target = %config.callback_target_url,
        "Starting server on http://{}",
        config.bind_addr
    );
    warp::serve(routes).run(config.bind_addr).await;
}
