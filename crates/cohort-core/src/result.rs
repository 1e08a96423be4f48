//! The outcome of executing a [`QueryPlan`](crate::plan::QueryPlan).

use serde::{Deserialize, Serialize};

use crate::record::Row;

/// Raw executor output, before formatting.
///
/// `count` equals `rows.len()` except for count aggregations, where `rows` is
/// empty and `count` is the computed scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub rows:  Vec<Row>,
  pub count: u64,
}

impl ExecutionResult {
  pub fn rows(rows: Vec<Row>) -> Self {
    let count = rows.len() as u64;
    Self { rows, count }
  }

  pub fn count(count: u64) -> Self { Self { rows: Vec::new(), count } }
}
