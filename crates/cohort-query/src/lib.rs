//! Question answering over a roster store.
//!
//! Wires the translator in `cohort-sql` to any
//! [`RosterStore`](cohort_core::store::RosterStore): the plan executor, the
//! result formatter, and the candidate-source interface to the language
//! model.

pub mod candidate;
pub mod error;
pub mod executor;
pub mod format;
pub mod pipeline;
pub mod response;

pub use candidate::{CandidateSource, clean_candidate};
pub use error::{Error, Result};
pub use pipeline::{
  Settings, answer, evaluate, execute_candidate, generate, run, translate,
};
pub use response::QueryResponse;

#[cfg(test)]
mod tests;
