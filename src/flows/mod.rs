//! Per-page task state machines. They hold no I/O handles: a page starts a
//! submission, the loop performs the call, and the result is fed back with
//! the ticket it was issued under.

pub mod connection;
pub mod query;

use serde::{Deserialize, Serialize};

pub use self::{
  connection::{ConnectionField, ConnectionFlow, ConnectionForm, ConnectionState},
  query::QueryFlow,
};

/// Navigation epoch a network call was issued under.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowTicket(pub u64);

impl FlowTicket {
  pub fn next(self) -> Self {
    Self(self.0.wrapping_add(1))
  }
}
