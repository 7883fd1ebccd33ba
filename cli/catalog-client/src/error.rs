//! Error handling for catalog API operations.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Error constructing a [crate::CatalogClient].
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("could not build HTTP client")]
    Build(#[source] reqwest::Error),
}

/// Uniform failure of a catalog request.
///
/// Transport failures, timeouts, non-2xx responses and malformed bodies
/// all collapse into this one type.
/// The distinguishing detail is kept as data:
/// `status` is set if and only if a response was received.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", fmt_request_error(self))]
pub struct RequestError {
    pub message: String,
    pub status: Option<StatusCode>,
}

impl RequestError {
    /// A failure before or without any response from the server.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// A failure reported by (or read from) a server response.
    pub fn response(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// A candidate rejected before it was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::transport(format!("invalid request: {}", message.into()))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out after {}s", timeout.as_secs_f32())
        } else if err.is_connect() {
            "Network Error: No response from server".to_string()
        } else if err.is_decode() {
            "malformed response body".to_string()
        } else {
            err.to_string()
        };
        Self {
            message,
            status: err.status(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }
}

fn fmt_request_error(err: &RequestError) -> String {
    match err.status {
        Some(status) => format!("Server Error ({status}): {}", err.message),
        None => err.message.clone(),
    }
}
