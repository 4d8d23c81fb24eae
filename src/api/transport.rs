use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::secret::Secret;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub url: String,
  pub bearer: Option<Secret>,
  pub body: Option<Value>,
  pub request_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl ApiResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// The request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Moves one request over the wire. No retries, no timeout of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
    let mut builder =
      self.client.request(request.method, &request.url).header("X-Request-ID", request.request_id.to_string());
    if let Some(token) = &request.bearer {
      builder = builder.bearer_auth(token.expose());
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(|e| TransportError(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(|e| TransportError(e.to_string()))?.to_vec();
    Ok(ApiResponse { status, body })
  }
}
