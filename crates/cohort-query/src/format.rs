//! Result formatter: raw executor output → the shape callers receive.

use std::collections::HashSet;

use cohort_core::{plan::QueryPlan, record::Row, result::ExecutionResult};
use serde_json::Value;

/// Normalise `result` for `plan`.
///
/// Counts become a single `{"count": N}` row. Distinct row plans are
/// deduplicated by `id` in first-seen order, then cut to the plan's limit.
pub fn format(plan: &QueryPlan, result: ExecutionResult) -> ExecutionResult {
  if plan.is_count() {
    let mut row = Row::new();
    row.insert("count".into(), Value::from(result.count));
    return ExecutionResult { rows: vec![row], count: result.count };
  }

  let mut rows = result.rows;
  if plan.distinct() {
    let mut seen = HashSet::new();
    rows.retain(|row| match row.get("id") {
      Some(id) => seen.insert(id.to_string()),
      None => true,
    });
  }
  if let Some(limit) = plan.limit() {
    rows.truncate(limit);
  }
  ExecutionResult::rows(rows)
}
