use hyper::StatusCode;
use thiserror::Error;

use crate::ports::http_client::HttpClientError;

/// Everything that can stop an inbound request from reaching a terminal response
#[derive(Error, Debug)]
pub enum RelayError {
    /// No target URL after the route prefix
    #[error("missing target URL")]
    MissingTarget,

    /// The target (or a redirect `location`) is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidTarget(String),

    /// The origin could not be reached
    #[error("Forwarding failed: {0}")]
    Forwarding(#[from] HttpClientError),

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// A method-preserving redirect arrived after the streamed body was already sent
    #[error("Redirect requires resending a request body that was already streamed")]
    BodyNotReplayable,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingTarget | RelayError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            RelayError::Forwarding(HttpClientError::TimeoutError(_)) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Forwarding(_)
            | RelayError::TooManyRedirects(_)
            | RelayError::BodyNotReplayable => StatusCode::BAD_GATEWAY,
        }
    }
}
