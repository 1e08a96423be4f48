//! JSON API for asking questions about the roster.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`] and any
//! [`CandidateSource`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/query` | `{"question": "..."}` |
//! | `POST` | `/translate` | `{"query": "SELECT ..."}` |
//! | `GET`  | `/suggestions` | |

pub mod error;
pub mod query;
pub mod suggestions;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use cohort_core::store::RosterStore;
use cohort_query::{CandidateSource, Settings};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S, C> {
  pub store:   Arc<S>,
  pub source:  Arc<C>,
  /// Upper bound on store time per question.
  pub timeout: Option<Duration>,
}

impl<S, C> AppState<S, C> {
  pub fn new(store: S, source: C) -> Self {
    Self { store: Arc::new(store), source: Arc::new(source), timeout: None }
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  /// Settings for a request arriving now.
  pub fn settings(&self) -> Settings { Settings::now().with_timeout(self.timeout) }
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      source:  Arc::clone(&self.source),
      timeout: self.timeout,
    }
  }
}

/// Build a fully-materialised API router for `state`.
pub fn api_router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: RosterStore + 'static,
  C: CandidateSource + 'static,
{
  Router::new()
    .route("/query", post(query::ask::<S, C>))
    .route("/translate", post(query::translate::<S, C>))
    .route("/suggestions", get(suggestions::handler::<S, C>))
    .with_state(state)
}
