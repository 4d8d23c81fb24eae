use serde::{Deserialize, Serialize};

use crate::secret::Secret;

/// Credentials for the user's own database, sent once to `/connect-database`.
///
/// Never persisted client-side; the password only leaves the process inside
/// the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
  pub host: String,
  pub port: u16,
  pub db_name: String,
  pub username: String,
  pub password: Secret,
}

/// Outcome of a connect-database submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionResult {
  /// Acknowledgment body exactly as the service sent it
  Connected(serde_json::Value),
  Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
  pub question: String,
}

/// Whatever the service answered. Shape is owned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResponse(pub serde_json::Value);

impl QueryResponse {
  /// Pretty-printed JSON for display
  pub fn render(&self) -> String {
    serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
  }
}

/// Sign-in / sign-up form contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
  pub email: String,
  pub password: Secret,
}

/// Which identity provider call an [`Credentials`] submission makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
  SignIn,
  SignUp,
}

/// Where the user stands, derived on each navigation and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
  Unauthenticated,
  AuthenticatedNoConnection,
  AuthenticatedConnected,
}

impl AuthState {
  /// `connected` is a hint carried by the navigation that led here (a
  /// successful connect-database call), not a cached fact.
  pub fn derive(has_session: bool, connected: bool) -> Self {
    match (has_session, connected) {
      (false, _) => Self::Unauthenticated,
      (true, false) => Self::AuthenticatedNoConnection,
      (true, true) => Self::AuthenticatedConnected,
    }
  }
}
