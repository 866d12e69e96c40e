//! The HTTP seam under the client adapter.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;

/// An outgoing request, already resolved to an absolute URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: String,
  pub bearer: Option<String>,
  pub body: Option<Value>,
}

/// A response as received, before any classification.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub body: String,
}

/// Failures below HTTP status handling.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
  /// No response was received.
  #[error("{0}")]
  NoResponse(String),
  /// A status line arrived but the body could not be read.
  #[error("failed to read response body (status {status}): {message}")]
  Body { status: u16, message: String },
}

/// Something that can perform an HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by reqwest.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = self.client.request(request.method, &request.url);

    if let Some(token) = &request.bearer {
      builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder
      .send()
      .await
      .map_err(|e| TransportError::NoResponse(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| TransportError::Body {
      status,
      message: e.to_string(),
    })?;

    Ok(HttpResponse { status, body })
  }
}
