use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Session;
use crate::models::Credentials;

/// Failures talking to the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
  /// Network failure or provider-side outage (5xx). Callers may fall back to
  /// a cached session.
  #[error("identity provider unreachable: {0}")]
  Unreachable(String),

  /// The provider refused the request; `message` is its own wording.
  #[error("{message}")]
  Rejected { status: u16, message: String },

  #[error("unexpected identity provider response: {0}")]
  InvalidResponse(String),

  #[error("identity provider is not configured: {0}")]
  NotConfigured(String),
}

impl AuthError {
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Unreachable(_))
  }
}

/// Sign-up either issues a session right away or waits for the user to
/// confirm their e-mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpGrant {
  Session(Session),
  ConfirmationRequired,
}

/// What a sign-in/sign-up attempt achieved, as reported to the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthOutcome {
  SignedIn,
  ConfirmationSent,
}

/// Session issuing service. The store only relies on these four calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
  async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpGrant, AuthError>;

  async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

  async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;

  /// Revoke the token server-side. Best effort.
  async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
