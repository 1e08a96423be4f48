//! The `RosterStore` trait and its structured query types.
//!
//! This is the fixed, parameterized read API the executor targets. The store
//! never sees candidate query text: every filter names a schema column and
//! carries a typed value. Backends (`cohort-store-sqlite`,
//! `cohort-store-memory`) implement the trait; the executor depends only on
//! this abstraction.

use std::future::Future;

use serde_json::Value;

use crate::{record::Row, schema::Collection};

// ─── Filters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
  Gt,
  Gte,
  Lt,
  Lte,
}

/// A single filter against a column of the collection it is attached to.
///
/// Timestamp values are RFC 3339 strings in the fixed-width form produced by
/// [`crate::record::timestamp::encode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  Eq {
    field: String,
    value: Value,
  },
  Compare {
    field: String,
    op:    CompareOp,
    value: Value,
  },
  /// Case-insensitive match with `%` (any run) and `_` (any char) wildcards.
  Pattern {
    field:   String,
    pattern: String,
  },
  /// An array column contains `value`.
  Contains {
    field: String,
    value: String,
  },
}

impl Filter {
  pub fn field(&self) -> &str {
    match self {
      Self::Eq { field, .. }
      | Self::Compare { field, .. }
      | Self::Pattern { field, .. }
      | Self::Contains { field, .. } => field,
    }
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Restrict people to those with at least one matching related record.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRestriction {
  /// `Notes` or `Interactions`; joined on `person_id = people.id`.
  pub collection: Collection,
  pub filters:    Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
  pub collection: Collection,
  pub field:      String,
  pub ascending:  bool,
}

/// Parameters for every [`RosterStore`] read. Filters apply to `people`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
  pub filters: Vec<Filter>,
  pub join:    Option<JoinRestriction>,
  pub order:   Option<Order>,
  pub limit:   Option<usize>,
}

/// One (person, related record) pair produced by a joined read.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
  pub person:  Row,
  pub related: Row,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a read-only roster backend.
///
/// Without an `order`, rows come back in insertion order. All methods return
/// `Send` futures so the trait can be used in multi-threaded async runtimes
/// (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Person rows matching `query.filters`. `query.join` is ignored.
  fn select<'a>(
    &'a self,
    query: &'a StoreQuery,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// One entry per (person, related) pair where the person matches
  /// `query.filters` and the related record matches `query.join`.
  fn select_joined<'a>(
    &'a self,
    query: &'a StoreQuery,
  ) -> impl Future<Output = Result<Vec<JoinedRow>, Self::Error>> + Send + 'a;

  /// Server-side count of people matching `query.filters`.
  ///
  /// `None` means the backend has no count primitive; the caller falls back
  /// to counting materialised rows.
  fn count<'a>(
    &'a self,
    query: &'a StoreQuery,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + 'a;

  /// Native count of distinct people matched by a joined read.
  ///
  /// `None` means the backend cannot count distinct across a join; the caller
  /// deduplicates in memory.
  fn count_distinct_joined<'a>(
    &'a self,
    query: &'a StoreQuery,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + 'a;

  /// Total number of records in a collection.
  fn collection_size(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
