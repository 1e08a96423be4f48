//! Handlers for `POST /query` and `POST /translate`.

use axum::{Json, extract::State};
use cohort_core::store::RosterStore;
use cohort_query::{CandidateSource, QueryResponse, evaluate, generate};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskBody {
  pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
  /// Candidate query text, run as if the model had written it.
  pub query: String,
}

async fn respond<S, C>(
  state: &AppState<S, C>,
  candidate: &str,
) -> Result<Json<QueryResponse>, ApiError>
where
  S: RosterStore,
{
  let result = evaluate(&*state.store, candidate, state.settings()).await?;
  Ok(Json(QueryResponse::success(candidate, result)))
}

/// `POST /query`, body `{"question":"How many students are searching?"}`
pub async fn ask<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<AskBody>,
) -> Result<Json<QueryResponse>, ApiError>
where
  S: RosterStore,
  C: CandidateSource,
{
  tracing::info!(question = %body.question, "question received");
  let candidate = generate(&*state.source, &body.question).await?;
  respond(&state, &candidate).await
}

/// `POST /translate`, body `{"query":"SELECT ..."}`
pub async fn translate<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<TranslateBody>,
) -> Result<Json<QueryResponse>, ApiError>
where
  S: RosterStore,
  C: CandidateSource,
{
  respond(&state, body.query.trim()).await
}
