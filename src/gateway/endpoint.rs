//! Agent endpoint selection

use reqwest::Url;

use crate::error::RelayError;
use crate::models::AgentKind;

/// Build the webhook URL for `agent`, with `email` as a query parameter
pub fn endpoint_url(base_url: &str, agent: AgentKind, email: &str) -> Result<Url, RelayError> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        agent.webhook_path()
    );
    let mut url =
        Url::parse(&raw).map_err(|e| RelayError::Config(format!("agent URL {raw:?}: {e}")))?;
    url.query_pairs_mut().append_pair("email", email);
    Ok(url)
}
