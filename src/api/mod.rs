//! Client for the WhareIQ HTTP service.

pub mod error;
pub mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

pub use self::{
  error::{parse_detail, ApiError},
  transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError},
};
use crate::{
  models::{ConnectionRequest, QueryRequest},
  session::SessionStore,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  ConnectDatabase,
  Query,
  Health,
}

impl Endpoint {
  pub fn path(&self) -> &'static str {
    match self {
      Self::ConnectDatabase => "/connect-database",
      Self::Query => "/query",
      Self::Health => "/health",
    }
  }

  pub fn method(&self) -> Method {
    match self {
      Self::ConnectDatabase | Self::Query => Method::POST,
      Self::Health => Method::GET,
    }
  }

  pub fn requires_auth(&self) -> bool {
    !matches!(self, Self::Health)
  }
}

pub struct ApiClient {
  base_url: String,
  transport: Arc<dyn Transport>,
  session: Arc<SessionStore>,
}

impl ApiClient {
  pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Result<Self, InvalidUrl> {
    validate_base_url(base_url)?;
    Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), transport, session })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub async fn connect_database(&self, request: &ConnectionRequest) -> Result<Value, ApiError> {
    self.call(Endpoint::ConnectDatabase, Some(request)).await
  }

  pub async fn query(&self, request: &QueryRequest) -> Result<Value, ApiError> {
    self.call(Endpoint::Query, Some(request)).await
  }

  pub async fn health(&self) -> Result<Value, ApiError> {
    self.call::<()>(Endpoint::Health, None).await
  }

  /// Send one request and hand back the JSON body untouched.
  pub async fn call<P: Serialize>(&self, endpoint: Endpoint, payload: Option<&P>) -> Result<Value, ApiError> {
    let bearer = if endpoint.requires_auth() {
      let read = self.session.get_session().await;
      if let Some(reason) = &read.transient_error {
        debug!("Using cached session, refresh deferred: {reason}");
      }
      match read.session {
        Some(session) => Some(session.access_token),
        None => {
          debug!("No session, not calling {}", endpoint.path());
          return Err(ApiError::Unauthenticated);
        },
      }
    } else {
      None
    };

    let body = payload.map(serde_json::to_value).transpose().map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let request = ApiRequest {
      method: endpoint.method(),
      url: format!("{}{}", self.base_url, endpoint.path()),
      bearer,
      body,
      request_id: Uuid::new_v4(),
    };
    let request_id = request.request_id;
    debug!(%request_id, "{} {}", request.method, request.url);

    let response = self.transport.send(request).await.map_err(|e| {
      warn!(%request_id, "{} failed: {e}", endpoint.path());
      ApiError::Unreachable(e.0)
    })?;

    if !response.is_success() {
      let detail = parse_detail(&response.body);
      warn!(%request_id, status = response.status, "{} rejected: {detail}", endpoint.path());
      return Err(ApiError::Rejected { status: response.status, detail });
    }

    debug!(%request_id, status = response.status, "{} ok", endpoint.path());
    serde_json::from_slice(&response.body).map_err(|e| ApiError::InvalidBody(e.to_string()))
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid service url {url}: {reason}")]
pub struct InvalidUrl {
  pub url: String,
  pub reason: String,
}

/// Service URLs must be absolute http(s).
pub fn validate_base_url(raw: &str) -> Result<Url, InvalidUrl> {
  let invalid = |reason: String| InvalidUrl { url: raw.to_string(), reason };
  let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    scheme => Err(invalid(format!("unsupported scheme {scheme}"))),
  }
}
