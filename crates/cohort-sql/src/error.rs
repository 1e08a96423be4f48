//! Error types for the cohort-sql translator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The candidate text is not a read-only selection.
  #[error("only read-only SELECT statements are accepted")]
  RejectedStatement,

  /// A filter fragment or combinator outside the supported grammar.
  #[error("unsupported predicate: {0}")]
  UnsupportedPredicate(String),

  /// A statement shape outside the supported grammar.
  #[error("unsupported query shape: {0}")]
  UnsupportedQueryShape(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
