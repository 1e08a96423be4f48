//! Query plan types: the validated, store-independent description of what a
//! candidate query asks for.
//!
//! A [`QueryPlan`] is built once per request by the translator and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Collection;

// ─── Predicates ──────────────────────────────────────────────────────────────

/// The comparison a [`Predicate`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
  Eq,
  Gt,
  Gte,
  Lt,
  Lte,
  /// Case-insensitive pattern match; the value is the full `%`/`_` pattern.
  #[serde(rename = "ILIKE")]
  ILike,
  /// Array column contains the value.
  Contains,
  /// Calendar year of a timestamp column equals the value.
  YearEq,
}

impl Operator {
  pub fn is_comparison(self) -> bool {
    matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
  }
}

/// One filter condition against a known column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
  /// The collection that owns `field`.
  pub collection: Collection,
  pub field:      String,
  pub operator:   Operator,
  pub value:      Value,
}

impl Predicate {
  pub fn new(
    collection: Collection,
    field: impl Into<String>,
    operator: Operator,
    value: impl Into<Value>,
  ) -> Self {
    Self { collection, field: field.into(), operator, value: value.into() }
  }
}

// ─── Relation ────────────────────────────────────────────────────────────────

/// Which collections a plan touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
  Person,
  /// Persons with at least one matching note.
  PersonJoinNote,
  /// Persons with at least one matching interaction.
  PersonJoinInteraction,
}

impl Relation {
  /// Build from the related collection of a join, if any.
  pub fn joining(related: Option<Collection>) -> Option<Self> {
    match related {
      None => Some(Self::Person),
      Some(Collection::Notes) => Some(Self::PersonJoinNote),
      Some(Collection::Interactions) => Some(Self::PersonJoinInteraction),
      Some(Collection::People) => None,
    }
  }

  /// The related collection restricted by an inner join.
  pub fn related(self) -> Option<Collection> {
    match self {
      Self::Person => None,
      Self::PersonJoinNote => Some(Collection::Notes),
      Self::PersonJoinInteraction => Some(Collection::Interactions),
    }
  }

  pub fn is_joined(self) -> bool { self.related().is_some() }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
  #[default]
  None,
  Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
  pub collection: Collection,
  pub field:      String,
  pub ascending:  bool,
}

/// The complete description of one query. Predicates are AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
  relation:    Relation,
  predicates:  Vec<Predicate>,
  aggregation: Aggregation,
  distinct:    bool,
  order_by:    Option<OrderBy>,
  limit:       Option<usize>,
}

impl QueryPlan {
  pub fn new(
    relation: Relation,
    predicates: Vec<Predicate>,
    aggregation: Aggregation,
    distinct: bool,
    order_by: Option<OrderBy>,
    limit: Option<usize>,
  ) -> Self {
    Self { relation, predicates, aggregation, distinct, order_by, limit }
  }

  pub fn relation(&self) -> Relation { self.relation }

  pub fn predicates(&self) -> &[Predicate] { &self.predicates }

  pub fn aggregation(&self) -> Aggregation { self.aggregation }

  pub fn is_count(&self) -> bool { self.aggregation == Aggregation::Count }

  pub fn distinct(&self) -> bool { self.distinct }

  pub fn order_by(&self) -> Option<&OrderBy> { self.order_by.as_ref() }

  pub fn limit(&self) -> Option<usize> { self.limit }

  /// Predicates that filter the given collection.
  pub fn predicates_on(
    &self,
    collection: Collection,
  ) -> impl Iterator<Item = &Predicate> + '_ {
    self.predicates.iter().filter(move |p| p.collection == collection)
  }
}
