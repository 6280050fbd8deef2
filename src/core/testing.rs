//! In-memory transport double shared by the core and adapter tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use axum::body::Body as AxumBody;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};

use crate::ports::http_client::{
    HttpClient, HttpClientError, HttpClientResult, HttpResponseFuture,
};

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Replays a fixed list of outcomes in order and records every request it receives.
pub struct ScriptedClient {
    script: Mutex<VecDeque<HttpClientResult<Response<AxumBody>>>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<HttpClientResult<Response<AxumBody>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    fn send_request<'a>(&'a self, req: Request<AxumBody>) -> HttpResponseFuture<'a> {
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body
                .collect()
                .await
                .map(|collected| collected.to_bytes())
                .unwrap_or_default();

            self.seen.lock().unwrap().push(SeenRequest {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            });

            self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(HttpClientError::ConnectionError(
                    "no scripted response left".to_string(),
                ))
            })
        })
    }
}

pub fn response(status: u16, headers: &[(&str, &str)], body: &'static str) -> Response<AxumBody> {
    let mut builder = Response::builder().status(StatusCode::from_u16(status).unwrap());
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(AxumBody::from(body)).unwrap()
}
