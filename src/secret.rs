use std::fmt;

use serde::{Deserialize, Serialize};

const REDACTED: &str = "********";

/// A string that must never reach logs or the screen.
///
/// `Debug` and `Display` print a fixed mask. Serialization writes the real
/// value because the remote service needs it on the wire.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl From<String> for Secret {
  fn from(value: String) -> Self {
    Self(value)
  }
}

impl From<&str> for Secret {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(REDACTED)
  }
}

impl fmt::Display for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(REDACTED)
  }
}
