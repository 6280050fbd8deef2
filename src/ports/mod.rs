pub mod http_client;
pub mod http_server;

pub use http_client::{HttpClient, HttpClientError, HttpClientResult, HttpResponseFuture};
pub use http_server::{HandlerResponseFuture, HttpHandler, HttpServer, ServerRunFuture};
