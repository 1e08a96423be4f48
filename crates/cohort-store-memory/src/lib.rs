//! In-memory implementation of [`cohort_core::store::RosterStore`].
//!
//! Holds a fixed [`cohort_core::record::Roster`] and answers structured
//! queries by scanning it. Used as the fixture store in tests; the count
//! capabilities can be switched off to exercise the executor's fallbacks.

mod filter;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::MemoryStore;

#[cfg(test)]
mod tests;
