use serde_json::Value;
use tracing::debug;

use crate::{
  api::{ApiClient, ApiError},
  models::{QueryRequest, QueryResponse},
};

pub const BUSY_LABEL: &str = "Thinking...";
pub const EMPTY_QUESTION: &str = "Please enter a question";

#[derive(Debug, Default)]
pub struct QueryFlow {
  pending: bool,
  answer: Option<QueryResponse>,
  error: Option<String>,
}

impl QueryFlow {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_pending(&self) -> bool {
    self.pending
  }

  pub fn answer(&self) -> Option<&QueryResponse> {
    self.answer.as_ref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// `None` when nothing should be sent: a call is already outstanding or the
  /// question is blank.
  pub fn begin_ask(&mut self, question: &str) -> Option<QueryRequest> {
    if self.pending {
      debug!("Question already in flight");
      return None;
    }
    if question.trim().is_empty() {
      self.error = Some(EMPTY_QUESTION.to_string());
      return None;
    }

    self.pending = true;
    self.error = None;
    Some(QueryRequest { question: question.to_string() })
  }

  pub fn resolve(&mut self, result: Result<Value, ApiError>) {
    if !self.pending {
      return;
    }
    self.pending = false;

    match result {
      Ok(value) => {
        self.answer = Some(QueryResponse(value));
        self.error = None;
      },
      Err(e) => self.error = Some(e.user_message()),
    }
  }

  pub async fn ask(&mut self, api: &ApiClient, question: &str) {
    if let Some(request) = self.begin_ask(question) {
      let result = api.query(&request).await;
      self.resolve(result);
    }
  }
}
