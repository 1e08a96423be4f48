//! Plan executor: maps a [`QueryPlan`] onto [`RosterStore`] calls.
//!
//! Simple plans issue one read against `people`. Joined plans read
//! (person, related) pairs; a joined count is always the number of distinct
//! people. Native store counts are preferred when the backend offers them.

use std::{collections::HashSet, time::Duration};

use chrono::NaiveDate;
use cohort_core::{
  plan::{Operator, Predicate, QueryPlan},
  record::timestamp,
  result::ExecutionResult,
  schema::Collection,
  store::{CompareOp, Filter, JoinRestriction, Order, RosterStore, StoreQuery},
};
use serde_json::Value;

use crate::{Error, Result};

fn invalid(predicate: &Predicate, expected: &str) -> Error {
  Error::ExecutionError(format!(
    "{:?} on {}.{} needs {expected}, got {}",
    predicate.operator, predicate.collection, predicate.field, predicate.value
  ))
}

/// `[YYYY-01-01, YYYY+1-01-01)` as two timestamp bounds.
fn year_bounds(predicate: &Predicate) -> Result<(Value, Value)> {
  let start_of = |year: i64| {
    i32::try_from(year)
      .ok()
      .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
      .and_then(|d| d.and_hms_opt(0, 0, 0))
      .map(|dt| Value::from(timestamp::encode(dt.and_utc())))
  };
  let year = predicate.value.as_i64().ok_or_else(|| invalid(predicate, "a year"))?;
  match (start_of(year), start_of(year + 1)) {
    (Some(lower), Some(upper)) => Ok((lower, upper)),
    _ => Err(invalid(predicate, "a representable year")),
  }
}

/// Lower one predicate to the store's filter vocabulary.
pub(crate) fn lower(predicate: &Predicate) -> Result<Vec<Filter>> {
  let field = predicate.field.clone();
  let value = predicate.value.clone();

  let op = match predicate.operator {
    Operator::Eq => return Ok(vec![Filter::Eq { field, value }]),
    Operator::Gt => CompareOp::Gt,
    Operator::Gte => CompareOp::Gte,
    Operator::Lt => CompareOp::Lt,
    Operator::Lte => CompareOp::Lte,
    Operator::ILike => {
      let pattern = value.as_str().ok_or_else(|| invalid(predicate, "a string"))?;
      return Ok(vec![Filter::Pattern { field, pattern: pattern.to_owned() }]);
    }
    Operator::Contains => {
      let value = value.as_str().ok_or_else(|| invalid(predicate, "a string"))?;
      return Ok(vec![Filter::Contains { field, value: value.to_owned() }]);
    }
    Operator::YearEq => {
      let (lower, upper) = year_bounds(predicate)?;
      return Ok(vec![
        Filter::Compare { field: field.clone(), op: CompareOp::Gte, value: lower },
        Filter::Compare { field, op: CompareOp::Lt, value: upper },
      ]);
    }
  };
  Ok(vec![Filter::Compare { field, op, value }])
}

fn lower_all(plan: &QueryPlan, collection: Collection) -> Result<Vec<Filter>> {
  let mut filters = Vec::new();
  for predicate in plan.predicates_on(collection) {
    filters.extend(lower(predicate)?);
  }
  Ok(filters)
}

/// The store query for `plan`. Counts carry no order or limit.
pub(crate) fn store_query(plan: &QueryPlan) -> Result<StoreQuery> {
  let join = plan
    .relation()
    .related()
    .map(|collection| {
      Ok::<_, Error>(JoinRestriction { collection, filters: lower_all(plan, collection)? })
    })
    .transpose()?;

  let rows = !plan.is_count();
  let order = plan.order_by().filter(|_| rows).map(|o| Order {
    collection: o.collection,
    field:      o.field.clone(),
    ascending:  o.ascending,
  });
  // A distinct join is deduplicated after the read; pushing the limit down
  // would cut the row set short.
  let push_limit = rows && !(plan.relation().is_joined() && plan.distinct());

  Ok(StoreQuery {
    filters: lower_all(plan, Collection::People)?,
    join,
    order,
    limit: plan.limit().filter(|_| push_limit),
  })
}

fn store_error<E: std::error::Error>(err: E) -> Error {
  Error::ExecutionError(err.to_string())
}

async fn execute_inner<S: RosterStore>(
  store: &S,
  plan: &QueryPlan,
) -> Result<ExecutionResult> {
  let query = store_query(plan)?;
  tracing::debug!(?query, "executing plan");

  match (plan.relation().is_joined(), plan.is_count()) {
    (false, true) => match store.count(&query).await.map_err(store_error)? {
      Some(n) => Ok(ExecutionResult::count(n)),
      None => {
        let rows = store.select(&query).await.map_err(store_error)?;
        Ok(ExecutionResult::count(rows.len() as u64))
      }
    },

    (false, false) => {
      let rows = store.select(&query).await.map_err(store_error)?;
      Ok(ExecutionResult::rows(rows))
    }

    (true, true) => {
      match store.count_distinct_joined(&query).await.map_err(store_error)? {
        Some(n) => Ok(ExecutionResult::count(n)),
        None => {
          let pairs = store.select_joined(&query).await.map_err(store_error)?;
          let ids: HashSet<String> = pairs
            .iter()
            .filter_map(|p| p.person.get("id").map(Value::to_string))
            .collect();
          Ok(ExecutionResult::count(ids.len() as u64))
        }
      }
    }

    (true, false) => {
      let pairs = store.select_joined(&query).await.map_err(store_error)?;
      Ok(ExecutionResult::rows(pairs.into_iter().map(|p| p.person).collect()))
    }
  }
}

/// Execute `plan`, failing with [`Error::ExecutionError`] if the store errors
/// or `timeout` elapses first.
pub async fn execute<S: RosterStore>(
  store: &S,
  plan: &QueryPlan,
  timeout: Option<Duration>,
) -> Result<ExecutionResult> {
  match timeout {
    None => execute_inner(store, plan).await,
    Some(limit) => tokio::time::timeout(limit, execute_inner(store, plan))
      .await
      .map_err(|_| {
        Error::ExecutionError(format!("store did not answer within {} ms", limit.as_millis()))
      })?,
  }
}
