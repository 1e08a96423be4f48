//! The JSON envelope returned for every question.

use cohort_core::{record::Row, result::ExecutionResult};
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Success {
  pub success: bool,
  /// The candidate text that was executed.
  pub query:   String,
  pub results: Vec<Row>,
  pub count:   u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
  pub success: bool,
  pub error:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
  Success(Success),
  Failure(Failure),
}

impl QueryResponse {
  pub fn success(query: impl Into<String>, result: ExecutionResult) -> Self {
    Self::Success(Success {
      success: true,
      query:   query.into(),
      results: result.rows,
      count:   result.count,
    })
  }

  /// Translation failures echo the candidate text in `details`.
  pub fn failure(error: &Error) -> Self {
    Self::Failure(Failure {
      success: false,
      error:   error.to_string(),
      details: error.candidate().map(str::to_owned),
    })
  }

  pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }
}
