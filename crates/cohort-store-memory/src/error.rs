//! Error type for `cohort-store-memory`.

use cohort_core::schema::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cohort_core::Error),

  #[error("unknown column {collection}.{field}")]
  UnknownField {
    collection: Collection,
    field:      String,
  },

  #[error("{0} cannot be joined to people")]
  InvalidJoin(Collection),

  #[error("cannot order by {0} columns in this query")]
  InvalidOrder(Collection),

  #[error("joined read without a join restriction")]
  MissingJoin,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
