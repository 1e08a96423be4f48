//! Handler for `GET /suggestions`: example questions plus collection sizes.

use axum::{Json, extract::State};
use cohort_core::{schema::Collection, store::RosterStore};
use cohort_query::CandidateSource;
use serde::Serialize;

use crate::{AppState, error::ApiError};

pub const EXAMPLE_QUESTIONS: &[&str] = &[
  "How many students are actively searching?",
  "Which students have a GPA above 3.5?",
  "Who is interested in AI?",
  "Which students had a mock interview this year?",
  "Who has notes mentioning Python?",
  "How many students attended an interaction this year?",
  "List the top 5 students by GPA",
  "Which students need visa sponsorship?",
];

#[derive(Debug, Serialize)]
pub struct Counts {
  pub people:       u64,
  pub notes:        u64,
  pub interactions: u64,
}

#[derive(Debug, Serialize)]
pub struct Suggestions {
  pub suggestions: &'static [&'static str],
  pub counts:      Counts,
}

async fn size<S: RosterStore>(store: &S, collection: Collection) -> Result<u64, ApiError> {
  store
    .collection_size(collection)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))
}

/// `GET /suggestions`
pub async fn handler<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<Suggestions>, ApiError>
where
  S: RosterStore,
  C: CandidateSource,
{
  let store = &*state.store;
  let counts = Counts {
    people:       size(store, Collection::People).await?,
    notes:        size(store, Collection::Notes).await?,
    interactions: size(store, Collection::Interactions).await?,
  };
  Ok(Json(Suggestions { suggestions: EXAMPLE_QUESTIONS, counts }))
}
