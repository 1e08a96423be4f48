//! End-to-end pipeline:
//!
//! ```text
//! question ─▶ CandidateSource ─▶ clean_candidate
//!   candidate ─▶ gate ─▶ parse ─▶ plan ─▶ execute ─▶ format ─▶ QueryResponse
//! ```
//!
//! No state survives a call; concurrent questions run independent pipelines.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use cohort_core::{plan::QueryPlan, result::ExecutionResult, store::RosterStore};

use crate::{
  Error, QueryResponse, Result,
  candidate::{CandidateSource, clean_candidate},
  executor::execute,
  format::format,
};

/// Per-request knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
  /// Evaluation date for "current year" predicates.
  pub today:   NaiveDate,
  /// Upper bound on store time for one question.
  pub timeout: Option<Duration>,
}

impl Settings {
  pub fn new(today: NaiveDate) -> Self { Self { today, timeout: None } }

  /// Settings for a request arriving now.
  pub fn now() -> Self { Self::new(Utc::now().date_naive()) }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }
}

/// Gate, parse and plan `candidate`.
pub fn translate(candidate: &str, today: NaiveDate) -> Result<QueryPlan> {
  cohort_sql::translate(candidate, today)
    .map_err(|e| Error::from_translation(e, candidate))
}

/// Translate and execute `candidate`, returning formatted results.
pub async fn execute_candidate<S: RosterStore>(
  store: &S,
  candidate: &str,
  settings: Settings,
) -> Result<ExecutionResult> {
  let plan = translate(candidate, settings.today)?;
  let raw = execute(store, &plan, settings.timeout).await?;
  Ok(format(&plan, raw))
}

/// [`execute_candidate`], logging the outcome.
pub async fn evaluate<S: RosterStore>(
  store: &S,
  candidate: &str,
  settings: Settings,
) -> Result<ExecutionResult> {
  let outcome = execute_candidate(store, candidate, settings).await;
  match &outcome {
    Ok(result) => tracing::info!(count = result.count, "query answered"),
    Err(e) if e.is_translation() => {
      tracing::warn!(error = %e, candidate, "candidate rejected")
    }
    Err(e) => tracing::error!(error = %e, "query failed"),
  }
  outcome
}

/// Run candidate text through the whole pipeline.
pub async fn run<S: RosterStore>(
  store: &S,
  candidate: &str,
  settings: Settings,
) -> QueryResponse {
  match evaluate(store, candidate, settings).await {
    Ok(result) => QueryResponse::success(candidate, result),
    Err(e) => QueryResponse::failure(&e),
  }
}

/// Ask `source` for candidate text and strip any markdown around it.
pub async fn generate<C: CandidateSource>(source: &C, question: &str) -> Result<String> {
  let raw = source.candidate(question).await.map_err(|e| {
    tracing::error!(error = %e, "candidate source failed");
    Error::UpstreamError(e.to_string())
  })?;

  let candidate = clean_candidate(&raw);
  if candidate.is_empty() {
    return Err(Error::UpstreamError("the model returned an empty query".into()));
  }
  tracing::debug!(question, candidate, "generated candidate");
  Ok(candidate.to_owned())
}

/// [`generate`] candidate text for `question`, then [`run`] it.
pub async fn answer<S, C>(
  store: &S,
  source: &C,
  question: &str,
  settings: Settings,
) -> QueryResponse
where
  S: RosterStore,
  C: CandidateSource,
{
  match generate(source, question).await {
    Ok(candidate) => run(store, &candidate, settings).await,
    Err(e) => QueryResponse::failure(&e),
  }
}
