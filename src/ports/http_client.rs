use axum::body::Body as AxumBody;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Custom error type for HTTP client operations
#[derive(Error, Debug)]
#[non_exhaustive] // Signal that more variants may be added in the future
pub enum HttpClientError {
    /// Error when connection to the target origin fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the origin does not answer in time
    #[error("Timeout error after {0} seconds")]
    TimeoutError(u64),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// Type alias for async HTTP request responses
pub type HttpResponseFuture<'a> =
    Pin<Box<dyn Future<Output = HttpClientResult<Response<AxumBody>>> + Send + 'a>>;

/// HttpClient defines the port (interface) for issuing outbound requests to target origins
pub trait HttpClient: Send + Sync + 'static {
    /// Send a single HTTP request to the origin named by its absolute URI
    ///
    /// Implementations must surface redirect responses as-is and never follow
    /// a `location` header themselves.
    ///
    /// # Arguments
    /// * `req` - The fully prepared outbound request
    ///
    /// # Returns
    /// A future that resolves to the origin's response (body still streaming) or an error
    fn send_request<'a>(&'a self, req: Request<AxumBody>) -> HttpResponseFuture<'a>;
}
