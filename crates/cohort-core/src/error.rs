//! Error types for `cohort-core`.

use thiserror::Error;

use crate::schema::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown collection: {0:?}")]
  UnknownCollection(String),

  #[error("unknown column {column:?} on {collection}")]
  UnknownColumn {
    collection: Collection,
    column:     String,
  },

  #[error("record did not serialise to a JSON object")]
  NotAnObject,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
