use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::{
  api::ApiError,
  flows::FlowTicket,
  models::{AuthMode, ConnectionRequest, Credentials, QueryRequest},
  route::Route,
  session::{AuthError, AuthOutcome, Session},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  Tick,
  Render,
  Resize(u16, u16),
  Suspend,
  Resume,
  Quit,
  Error(String),
  Navigate(Route),
  SignOut,
  SessionChanged(Option<Session>),
  SubmitCredentials(AuthMode, Credentials),
  AuthResolved(FlowTicket, Result<AuthOutcome, AuthError>),
  SubmitConnection(ConnectionRequest),
  ConnectionResolved(FlowTicket, Result<Value, ApiError>),
  SubmitQuestion(QueryRequest),
  QueryResolved(FlowTicket, Result<Value, ApiError>),
  CheckHealth,
  HealthChecked(FlowTicket, Result<Value, ApiError>),
}

impl Action {
  /// Completion of a network call issued under `ticket`.
  pub fn ticket(&self) -> Option<FlowTicket> {
    match self {
      Self::AuthResolved(ticket, _)
      | Self::ConnectionResolved(ticket, _)
      | Self::QueryResolved(ticket, _)
      | Self::HealthChecked(ticket, _) => Some(*ticket),
      _ => None,
    }
  }
}
