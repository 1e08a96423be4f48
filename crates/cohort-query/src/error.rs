//! Error taxonomy for answering a question.
//!
//! Every variant is terminal for the request; there are no partial results.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The candidate text is not a read-only selection.
  #[error("only read-only SELECT queries are allowed")]
  RejectedStatement { candidate: String },

  #[error("unsupported predicate: {reason}")]
  UnsupportedPredicate { reason: String, candidate: String },

  #[error("unsupported query shape: {reason}")]
  UnsupportedQueryShape { reason: String, candidate: String },

  /// The store call failed or timed out.
  #[error("query execution failed: {0}")]
  ExecutionError(String),

  /// The language model produced no usable candidate text.
  #[error("could not generate a query: {0}")]
  UpstreamError(String),
}

impl Error {
  /// Attach the candidate text to a translator error.
  pub fn from_translation(err: cohort_sql::Error, candidate: &str) -> Self {
    let candidate = candidate.to_owned();
    match err {
      cohort_sql::Error::RejectedStatement => Self::RejectedStatement { candidate },
      cohort_sql::Error::UnsupportedPredicate(reason) => {
        Self::UnsupportedPredicate { reason, candidate }
      }
      cohort_sql::Error::UnsupportedQueryShape(reason) => {
        Self::UnsupportedQueryShape { reason, candidate }
      }
    }
  }

  /// The offending candidate text, for translation failures.
  pub fn candidate(&self) -> Option<&str> {
    match self {
      Self::RejectedStatement { candidate }
      | Self::UnsupportedPredicate { candidate, .. }
      | Self::UnsupportedQueryShape { candidate, .. } => Some(candidate),
      Self::ExecutionError(_) | Self::UpstreamError(_) => None,
    }
  }

  /// Whether the candidate text itself was at fault.
  pub fn is_translation(&self) -> bool { self.candidate().is_some() }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
