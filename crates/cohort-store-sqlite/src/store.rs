//! [`SqliteStore`]: the SQLite implementation of [`RosterStore`].

use std::path::Path;

use cohort_core::{
  record::{Interaction, Note, Person, Roster, Row, to_row},
  schema::Collection,
  store::{JoinedRow, RosterStore, StoreQuery},
};
use rusqlite::types::Value as SqlValue;

use crate::{
  Error, Result,
  encode::{decode_row, encode_row},
  schema::SCHEMA,
  sql::{Shape, Statement, build},
};

/// Rows to insert into one collection, already encoded.
type Batch = (Collection, Vec<Vec<SqlValue>>);

fn insert_sql(collection: Collection) -> String {
  let columns = collection.columns();
  let names: Vec<String> = columns.iter().map(|c| format!("\"{}\"", c.name)).collect();
  let slots = vec!["?"; columns.len()].join(", ");
  format!(
    "INSERT INTO {} ({}) VALUES ({slots})",
    collection.name(),
    names.join(", ")
  )
}

fn batch<T: serde::Serialize>(collection: Collection, records: &[T]) -> Result<Batch> {
  let rows = records
    .iter()
    .map(|r| encode_row(collection, &to_row(r)?))
    .collect::<Result<_>>()?;
  Ok((collection, rows))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert(&self, batches: Vec<Batch>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (collection, rows) in &batches {
          let mut stmt = tx.prepare(&insert_sql(*collection))?;
          for row in rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_person(&self, person: &Person) -> Result<()> {
    self.insert(vec![batch(Collection::People, std::slice::from_ref(person))?]).await
  }

  pub async fn insert_note(&self, note: &Note) -> Result<()> {
    self.insert(vec![batch(Collection::Notes, std::slice::from_ref(note))?]).await
  }

  pub async fn insert_interaction(&self, interaction: &Interaction) -> Result<()> {
    self
      .insert(vec![batch(Collection::Interactions, std::slice::from_ref(interaction))?])
      .await
  }

  /// Insert a whole roster in one transaction, people first.
  pub async fn import(&self, roster: &Roster) -> Result<()> {
    let batches = vec![
      batch(Collection::People, &roster.people)?,
      batch(Collection::Notes, &roster.notes)?,
      batch(Collection::Interactions, &roster.interactions)?,
    ];
    self.insert(batches).await?;
    tracing::info!(
      people = roster.people.len(),
      notes = roster.notes.len(),
      interactions = roster.interactions.len(),
      "imported roster"
    );
    Ok(())
  }

  /// Run a single-value `COUNT` statement.
  async fn scalar(&self, stmt: Statement) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        let n = conn.query_row(
          &stmt.text,
          rusqlite::params_from_iter(stmt.params.iter()),
          |r| r.get(0),
        )?;
        Ok(n)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}

impl RosterStore for SqliteStore {
  type Error = Error;

  async fn select(&self, query: &StoreQuery) -> Result<Vec<Row>> {
    let stmt = build(query, Shape::Rows)?;
    tracing::debug!(sql = %stmt.text, "select");

    let rows = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&stmt.text)?;
        let rows = prepared
          .query_map(rusqlite::params_from_iter(stmt.params.iter()), |row| {
            decode_row(Collection::People, row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn select_joined(&self, query: &StoreQuery) -> Result<Vec<JoinedRow>> {
    let stmt = build(query, Shape::Pairs)?;
    let related = query.join.as_ref().map(|j| j.collection).ok_or(Error::MissingJoin)?;
    let offset = Collection::People.columns().len();
    tracing::debug!(sql = %stmt.text, "select_joined");

    let rows = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&stmt.text)?;
        let rows = prepared
          .query_map(rusqlite::params_from_iter(stmt.params.iter()), |row| {
            Ok(JoinedRow {
              person:  decode_row(Collection::People, row, 0)?,
              related: decode_row(related, row, offset)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn count(&self, query: &StoreQuery) -> Result<Option<u64>> {
    let stmt = build(query, Shape::Count)?;
    Ok(Some(self.scalar(stmt).await?))
  }

  async fn count_distinct_joined(&self, query: &StoreQuery) -> Result<Option<u64>> {
    let stmt = build(query, Shape::CountDistinct)?;
    Ok(Some(self.scalar(stmt).await?))
  }

  async fn collection_size(&self, collection: Collection) -> Result<u64> {
    let text = format!("SELECT COUNT(*) FROM {}", collection.name());
    self.scalar(Statement { text, params: Vec::new() }).await
  }
}
