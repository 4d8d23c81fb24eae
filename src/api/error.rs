use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Everything a call to the WhareIQ service can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
  /// No session; nothing was sent.
  #[error("Not authenticated")]
  Unauthenticated,

  /// Non-2xx answer. `detail` is the service's own message.
  #[error("{detail}")]
  Rejected { status: u16, detail: String },

  #[error("service unreachable: {0}")]
  Unreachable(String),

  #[error("service sent an unreadable response: {0}")]
  InvalidBody(String),
}

impl ApiError {
  /// Text shown inline on the page that made the call.
  pub fn user_message(&self) -> String {
    match self {
      Self::Unauthenticated => NOT_AUTHENTICATED.to_string(),
      Self::Rejected { detail, .. } => detail.clone(),
      other => other.to_string(),
    }
  }
}

/// Extract `detail` from an error body.
///
/// Strings are taken verbatim. FastAPI validation failures (a list of
/// `{loc, msg, type}` objects) are joined from their `msg` fields. Anything
/// else is `"unknown"`.
pub fn parse_detail(body: &[u8]) -> String {
  const UNKNOWN: &str = "unknown";

  let Ok(value) = serde_json::from_slice::<Value>(body) else {
    return UNKNOWN.to_string();
  };

  match value.get("detail") {
    Some(Value::String(detail)) => detail.clone(),
    Some(Value::Array(items)) => {
      let messages: Vec<&str> = items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
      if messages.is_empty() {
        UNKNOWN.to_string()
      } else {
        messages.join("; ")
      }
    },
    _ => UNKNOWN.to_string(),
  }
}
