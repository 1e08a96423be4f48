//! [`MemoryStore`]: the in-memory implementation of [`RosterStore`].

use cohort_core::{
  record::{Roster, Row, to_row},
  schema::Collection,
  store::{Filter, JoinRestriction, JoinedRow, Order, RosterStore, StoreQuery},
};
use serde_json::Value;

use crate::{
  Error, Result,
  filter::{compare_values, matches_all},
};

/// A read-only roster held in memory, rows kept in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  people:              Vec<Row>,
  notes:               Vec<Row>,
  interactions:        Vec<Row>,
  server_count:        bool,
  distinct_join_count: bool,
}

impl MemoryStore {
  /// Encode every record of `roster` as a row. Both count capabilities are
  /// enabled.
  pub fn new(roster: &Roster) -> Result<Self> {
    fn rows<T: serde::Serialize>(records: &[T]) -> Result<Vec<Row>> {
      records.iter().map(|r| to_row(r).map_err(Error::from)).collect()
    }

    Ok(Self {
      people:              rows(&roster.people)?,
      notes:               rows(&roster.notes)?,
      interactions:        rows(&roster.interactions)?,
      server_count:        true,
      distinct_join_count: true,
    })
  }

  /// Report no server-side count, forcing callers to count rows.
  pub fn without_server_count(mut self) -> Self {
    self.server_count = false;
    self
  }

  /// Report no distinct-count-over-join, forcing callers to deduplicate.
  pub fn without_distinct_join_count(mut self) -> Self {
    self.distinct_join_count = false;
    self
  }

  fn rows(&self, collection: Collection) -> &[Row] {
    match collection {
      Collection::People => &self.people,
      Collection::Notes => &self.notes,
      Collection::Interactions => &self.interactions,
    }
  }

  fn check_fields(collection: Collection, filters: &[Filter]) -> Result<()> {
    match filters.iter().find(|f| collection.column(f.field()).is_none()) {
      Some(f) => Err(Error::UnknownField { collection, field: f.field().to_owned() }),
      None => Ok(()),
    }
  }

  fn check_order(order: &Order, allowed: &[Collection]) -> Result<()> {
    if !allowed.contains(&order.collection) {
      return Err(Error::InvalidOrder(order.collection));
    }
    if order.collection.column(&order.field).is_none() {
      return Err(Error::UnknownField {
        collection: order.collection,
        field:      order.field.clone(),
      });
    }
    Ok(())
  }

  fn matching_people(&self, query: &StoreQuery) -> Result<Vec<&Row>> {
    Self::check_fields(Collection::People, &query.filters)?;
    Ok(self.people.iter().filter(|p| matches_all(p, &query.filters)).collect())
  }

  /// Every (person, related) pair satisfying the query, person-major.
  fn matching_pairs<'s>(
    &'s self,
    query: &StoreQuery,
    join: &JoinRestriction,
  ) -> Result<Vec<(&'s Row, &'s Row)>> {
    let Some(key) = join.collection.person_key() else {
      return Err(Error::InvalidJoin(join.collection));
    };
    Self::check_fields(join.collection, &join.filters)?;

    let related: Vec<&Row> = self
      .rows(join.collection)
      .iter()
      .filter(|r| matches_all(r, &join.filters))
      .collect();

    let mut pairs = Vec::new();
    for person in self.matching_people(query)? {
      let id = person.get("id");
      pairs.extend(
        related
          .iter()
          .filter(|r| id.is_some() && r.get(key) == id)
          .map(|r| (person, *r)),
      );
    }
    Ok(pairs)
  }
}

/// The value a joined pair is ordered by.
fn order_key<'r>(order: &Order, (person, related): (&'r Row, &'r Row)) -> Option<&'r Value> {
  let row = if order.collection == Collection::People { person } else { related };
  row.get(&order.field)
}

impl RosterStore for MemoryStore {
  type Error = Error;

  async fn select(&self, query: &StoreQuery) -> Result<Vec<Row>> {
    let mut people = self.matching_people(query)?;

    if let Some(order) = &query.order {
      Self::check_order(order, &[Collection::People])?;
      people.sort_by(|a, b| {
        let ord = compare_values(a.get(&order.field), b.get(&order.field));
        if order.ascending { ord } else { ord.reverse() }
      });
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(people.into_iter().take(limit).cloned().collect())
  }

  async fn select_joined(&self, query: &StoreQuery) -> Result<Vec<JoinedRow>> {
    let Some(join) = &query.join else {
      return Err(Error::MissingJoin);
    };
    let mut pairs = self.matching_pairs(query, join)?;

    if let Some(order) = &query.order {
      Self::check_order(order, &[Collection::People, join.collection])?;
      pairs.sort_by(|a, b| {
        let ord = compare_values(order_key(order, *a), order_key(order, *b));
        if order.ascending { ord } else { ord.reverse() }
      });
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(
      pairs
        .into_iter()
        .take(limit)
        .map(|(person, related)| JoinedRow {
          person:  person.clone(),
          related: related.clone(),
        })
        .collect(),
    )
  }

  async fn count(&self, query: &StoreQuery) -> Result<Option<u64>> {
    if !self.server_count {
      return Ok(None);
    }
    Ok(Some(self.matching_people(query)?.len() as u64))
  }

  async fn count_distinct_joined(&self, query: &StoreQuery) -> Result<Option<u64>> {
    if !self.distinct_join_count {
      return Ok(None);
    }
    let Some(join) = &query.join else {
      return Err(Error::MissingJoin);
    };
    let pairs = self.matching_pairs(query, join)?;

    // Pairs are person-major, so each person's pairs are contiguous.
    let mut distinct = 0u64;
    let mut previous: Option<&Row> = None;
    for (person, _) in pairs {
      if previous.is_none_or(|p| !std::ptr::eq(p, person)) {
        distinct += 1;
      }
      previous = Some(person);
    }
    Ok(Some(distinct))
  }

  async fn collection_size(&self, collection: Collection) -> Result<u64> {
    Ok(self.rows(collection).len() as u64)
  }
}
