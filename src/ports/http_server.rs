use anyhow::Result;
use axum::body::Body as AxumBody; // Use Axum's Body type
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// Type alias for HTTP server run futures
pub type ServerRunFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Type alias for HTTP handler response futures
///
/// Handlers never fail: every error is already rendered as a response.
pub type HandlerResponseFuture<'a> = Pin<Box<dyn Future<Output = Response<AxumBody>> + Send + 'a>>;

/// HttpServer defines the port (interface) for serving the relay
pub trait HttpServer: Send + Sync + 'static {
    /// Run the HTTP server
    ///
    /// # Returns
    /// A future that resolves when the server shuts down or encounters an error
    fn run<'a>(&'a self) -> ServerRunFuture<'a>;
}

/// HttpHandler defines the port for handling inbound HTTP requests
pub trait HttpHandler: Send + Sync + 'static {
    /// Handle an incoming HTTP request
    ///
    /// # Arguments
    /// * `req` - The HTTP request to handle
    ///
    /// # Returns
    /// A future that resolves to the HTTP response for the caller
    fn handle_request<'a>(&'a self, req: Request<AxumBody>) -> HandlerResponseFuture<'a>;
}
