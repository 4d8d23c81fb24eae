use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{
  provider::{AuthError, IdentityProvider, SignUpGrant},
  Session,
};
use crate::{models::Credentials, secret::Secret};

/// GoTrue REST client (the auth service behind Supabase projects).
#[derive(Clone)]
pub struct SupabaseAuth {
  http: Client,
  auth_url: String,
  anon_key: Secret,
}

impl std::fmt::Debug for SupabaseAuth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SupabaseAuth").field("auth_url", &self.auth_url).finish_non_exhaustive()
  }
}

impl SupabaseAuth {
  pub fn new(auth_url: &str, anon_key: Secret) -> Result<Self, AuthError> {
    let parsed =
      Url::parse(auth_url).map_err(|e| AuthError::NotConfigured(format!("invalid auth url {auth_url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(AuthError::NotConfigured(format!("auth url must be http(s): {auth_url}")));
    }
    if anon_key.expose().trim().is_empty() {
      return Err(AuthError::NotConfigured("anon key is empty".to_string()));
    }

    Ok(Self { http: Client::new(), auth_url: auth_url.trim_end_matches('/').to_string(), anon_key })
  }

  async fn post(&self, path: &str, bearer: Option<&str>, body: Value) -> Result<Value, AuthError> {
    let url = format!("{}/auth/v1/{path}", self.auth_url);
    debug!("POST {url}");

    let response = self
      .http
      .post(&url)
      .header("apikey", self.anon_key.expose())
      .bearer_auth(bearer.unwrap_or(self.anon_key.expose()))
      .json(&body)
      .send()
      .await
      .map_err(|e| AuthError::Unreachable(e.to_string()))?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| AuthError::Unreachable(e.to_string()))?;

    if status.is_server_error() {
      let message = error_message(&bytes).unwrap_or_else(|| status.to_string());
      return Err(AuthError::Unreachable(message));
    }
    if !status.is_success() {
      let message = error_message(&bytes).unwrap_or_else(|| status.to_string());
      return Err(AuthError::Rejected { status: status.as_u16(), message });
    }
    if bytes.is_empty() || status == StatusCode::NO_CONTENT {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidResponse(e.to_string()))
  }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
  async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpGrant, AuthError> {
    let body = self.post("signup", None, credential_body(credentials)).await?;
    // Projects with e-mail confirmation answer with the bare user object
    if body.get("access_token").is_none() {
      return Ok(SignUpGrant::ConfirmationRequired);
    }
    parse_grant(body, now()).map(SignUpGrant::Session)
  }

  async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
    let body = self.post("token?grant_type=password", None, credential_body(credentials)).await?;
    parse_grant(body, now())
  }

  async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
    let body = self.post("token?grant_type=refresh_token", None, json!({ "refresh_token": refresh_token })).await?;
    parse_grant(body, now())
  }

  async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
    self.post("logout", Some(access_token), json!({})).await.map(|_| ())
  }
}

fn credential_body(credentials: &Credentials) -> Value {
  json!({ "email": credentials.email, "password": credentials.password.expose() })
}

fn now() -> i64 {
  chrono::Utc::now().timestamp()
}

/// GoTrue is not consistent about where it puts the human-readable message.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
  let value: Value = serde_json::from_slice(body).ok()?;
  ["error_description", "msg", "message", "error"]
    .iter()
    .find_map(|key| value.get(key).and_then(Value::as_str))
    .map(str::to_string)
}

/// Turn a token grant into a [`Session`].
pub(crate) fn parse_grant(body: Value, now: i64) -> Result<Session, AuthError> {
  let access_token = body
    .get("access_token")
    .and_then(Value::as_str)
    .filter(|token| !token.trim().is_empty())
    .ok_or_else(|| AuthError::InvalidResponse("token grant without access_token".to_string()))?;

  let expires_at = body
    .get("expires_at")
    .and_then(Value::as_i64)
    .or_else(|| body.get("expires_in").and_then(Value::as_i64).map(|secs| now + secs));

  let user = body.get("user");
  let user_field = |key: &str| user.and_then(|u| u.get(key)).and_then(Value::as_str).map(str::to_string);

  Ok(Session {
    access_token: Secret::new(access_token),
    user_id: user_field("id"),
    email: user_field("email"),
    refresh_token: body.get("refresh_token").and_then(Value::as_str).map(Secret::from),
    expires_at,
  })
}
