//! Error types for the relay

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur while relaying a request or a reply
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or contradictory input, correctable by the user
    #[error("{0}")]
    Validation(String),

    /// Network failure or unusable response from the external agent
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Push delivery or connection failure
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// JSON body returned to HTTP callers on failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        RelayError::Validation(message.into())
    }

    /// HTTP status this error surfaces as
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) | RelayError::Channel(_) | RelayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the browser. Upstream details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::Validation(message) => message.clone(),
            RelayError::Upstream(_) => "failed to send to agent".to_string(),
            RelayError::Channel(_) | RelayError::Config(_) => "internal error".to_string(),
        }
    }
}

impl warp::Reply for RelayError {
    fn into_response(self) -> warp::reply::Response {
        let body = ErrorResponse {
            error: self.client_message(),
        };
        warp::reply::with_status(warp::reply::json(&body), self.status()).into_response()
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Upstream(format!("invalid JSON: {}", err))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RelayError::Upstream(format!("status {}: {}", status.as_u16(), err)),
            None => RelayError::Upstream(err.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RelayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        RelayError::Channel(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Reply;

    #[test]
    fn test_validation_is_bad_request() {
        let err = RelayError::validation("nothing to send");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "nothing to send");
        assert_eq!(err.client_message(), "nothing to send");
    }

    #[test]
    fn test_upstream_hides_details() {
        let err = RelayError::Upstream("connection refused (os error 111)".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.client_message(), "failed to send to agent");
    }

    #[test]
    fn test_into_response_status() {
        let response = RelayError::validation("unsupported file type").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );

        let response = RelayError::Upstream("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: RelayError = json_err.into();
        assert!(matches!(err, RelayError::Upstream(_)));
    }
}
