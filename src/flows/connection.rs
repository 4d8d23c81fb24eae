use std::collections::BTreeMap;

use serde_json::Value;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, info};

use crate::{
  api::{ApiClient, ApiError},
  models::{ConnectionRequest, ConnectionResult},
  secret::Secret,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum ConnectionField {
  Host,
  Port,
  #[strum(to_string = "Database")]
  DbName,
  Username,
  Password,
}

impl ConnectionField {
  pub fn next(self) -> Self {
    Self::iter().cycle().skip_while(|f| *f != self).nth(1).unwrap_or(self)
  }

  pub fn previous(self) -> Self {
    Self::iter().rev().cycle().skip_while(|f| *f != self).nth(1).unwrap_or(self)
  }
}

/// Raw text of the connect-database form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionForm {
  pub host: String,
  pub port: String,
  pub db_name: String,
  pub username: String,
  pub password: Secret,
}

impl ConnectionForm {
  pub fn get(&self, field: ConnectionField) -> &str {
    match field {
      ConnectionField::Host => &self.host,
      ConnectionField::Port => &self.port,
      ConnectionField::DbName => &self.db_name,
      ConnectionField::Username => &self.username,
      ConnectionField::Password => self.password.expose(),
    }
  }

  fn set(&mut self, field: ConnectionField, value: String) {
    match field {
      ConnectionField::Host => self.host = value,
      ConnectionField::Port => self.port = value,
      ConnectionField::DbName => self.db_name = value,
      ConnectionField::Username => self.username = value,
      ConnectionField::Password => self.password = Secret::new(value),
    }
  }

  /// Build the request, or report every field that is wrong.
  pub fn validate(&self) -> Result<ConnectionRequest, BTreeMap<ConnectionField, String>> {
    let mut errors = BTreeMap::new();

    let required = [
      (ConnectionField::Host, &self.host),
      (ConnectionField::DbName, &self.db_name),
      (ConnectionField::Username, &self.username),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        errors.insert(field, format!("{field} is required"));
      }
    }

    let port = match self.port.trim().parse::<u16>() {
      Ok(port) if port >= 1 => Some(port),
      _ => {
        errors.insert(ConnectionField::Port, "Port must be a number between 1 and 65535".to_string());
        None
      },
    };

    match port {
      Some(port) if errors.is_empty() => Ok(ConnectionRequest {
        host: self.host.trim().to_string(),
        port,
        db_name: self.db_name.trim().to_string(),
        username: self.username.trim().to_string(),
        password: self.password.clone(),
      }),
      _ => Err(errors),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
  #[default]
  Editing,
  Submitting,
  EditingWithError(String),
  NavigatedAway,
}

#[derive(Debug, Default)]
pub struct ConnectionFlow {
  form: ConnectionForm,
  state: ConnectionState,
  field_errors: BTreeMap<ConnectionField, String>,
}

impl ConnectionFlow {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn form(&self) -> &ConnectionForm {
    &self.form
  }

  pub fn state(&self) -> &ConnectionState {
    &self.state
  }

  pub fn field_error(&self, field: ConnectionField) -> Option<&str> {
    self.field_errors.get(&field).map(String::as_str)
  }

  pub fn is_submitting(&self) -> bool {
    self.state == ConnectionState::Submitting
  }

  /// Fields are frozen while a submission is in flight.
  pub fn set_field(&mut self, field: ConnectionField, value: impl Into<String>) -> bool {
    if !self.is_editable() {
      return false;
    }
    self.form.set(field, value.into());
    self.field_errors.remove(&field);
    true
  }

  /// Validate and move to `Submitting`. `None` means nothing may be sent.
  pub fn begin_submit(&mut self) -> Option<ConnectionRequest> {
    if !self.is_editable() {
      debug!("Ignoring connect submit in state {:?}", self.state);
      return None;
    }

    match self.form.validate() {
      Ok(request) => {
        self.field_errors.clear();
        self.state = ConnectionState::Submitting;
        info!("Connecting to {}@{}:{}/{}", request.username, request.host, request.port, request.db_name);
        Some(request)
      },
      Err(errors) => {
        debug!("Connect form rejected locally: {errors:?}");
        self.field_errors = errors;
        None
      },
    }
  }

  /// Apply the service's answer to an in-flight submission.
  pub fn resolve(&mut self, result: Result<Value, ApiError>) -> Option<ConnectionResult> {
    if !self.is_submitting() {
      return None;
    }

    Some(match result {
      Ok(ack) => {
        self.form = ConnectionForm::default();
        self.state = ConnectionState::NavigatedAway;
        ConnectionResult::Connected(ack)
      },
      Err(e) => {
        let reason = e.user_message();
        self.state = ConnectionState::EditingWithError(reason.clone());
        ConnectionResult::Failed { reason }
      },
    })
  }

  /// Submit and wait for the answer in one step.
  pub async fn submit(&mut self, api: &ApiClient) -> Option<ConnectionResult> {
    let request = self.begin_submit()?;
    let result = api.connect_database(&request).await;
    self.resolve(result)
  }

  fn is_editable(&self) -> bool {
    matches!(self.state, ConnectionState::Editing | ConnectionState::EditingWithError(_))
  }
}
