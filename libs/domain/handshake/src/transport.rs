// [libs/domain/handshake/src/transport.rs]
//! The wire boundary is abstracted behind `HandshakeTransport` so the
//! three stages can be driven against a fixture-returning fake in tests
//! (spec §8: "stub HTTP layer... rather than a real network call") while
//! `ReqwestTransport` remains the only implementation wired into the
//! running pipeline.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

pub struct HttpResponse {
    pub body: String,
}

#[derive(Error, Debug)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait HandshakeTransport: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// The real transport: a `reqwest::Client` borrowed from a checked-out
/// session holder, so its cookie jar is shared across all three stages.
pub struct ReqwestTransport<'a> {
    client: &'a reqwest::Client,
}

impl<'a> ReqwestTransport<'a> {
    pub fn new(client: &'a reqwest::Client) -> Self {
        Self { client }
    }
}

impl<'a> HandshakeTransport for ReqwestTransport<'a> {
    fn execute<'b>(&'b self, request: HttpRequest) -> BoxFuture<'b, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }
            if request.method == Method::Post {
                builder = builder.body(request.body);
            }
            let response = builder.send().await.map_err(|e| TransportError(e.to_string()))?;
            let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;
            Ok(HttpResponse { body })
        })
    }
}
