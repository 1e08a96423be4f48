//! Schema descriptor: the static shape of the three roster collections.
//!
//! Consumed by the translator (column validation and typing) and by the
//! prompt builder (via [`describe`]). Must stay in lock-step with the backing
//! store's real schema.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::record::{
  InteractionStatus, InteractionType, JobSearchStatus, NoteType,
};

// ─── Column types ────────────────────────────────────────────────────────────

/// The storage type of a column, as far as the translator cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Uuid,
  Text,
  /// Text restricted to a fixed value set.
  Enum(&'static [&'static str]),
  /// Floating-point number.
  Number,
  Integer,
  Boolean,
  /// Multi-valued text column (a tag list).
  TextArray,
  Timestamp,
}

impl ColumnType {
  /// Columns that accept a quoted string literal in an equality.
  pub fn is_textual(self) -> bool {
    matches!(self, Self::Uuid | Self::Text | Self::Enum(_))
  }

  pub fn is_numeric(self) -> bool { matches!(self, Self::Number | Self::Integer) }

  /// The Postgres-flavoured type name shown to the language model.
  pub fn sql_name(self) -> &'static str {
    match self {
      Self::Uuid => "uuid",
      Self::Text | Self::Enum(_) => "text",
      Self::Number => "numeric",
      Self::Integer => "integer",
      Self::Boolean => "boolean",
      Self::TextArray => "text[]",
      Self::Timestamp => "timestamptz",
    }
  }
}

/// One column of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub ty:   ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column { Column { name, ty } }

const PEOPLE: &[Column] = &[
  col("id", ColumnType::Uuid),
  col("first_name", ColumnType::Text),
  col("last_name", ColumnType::Text),
  col("email", ColumnType::Text),
  col("phone", ColumnType::Text),
  col("linkedin_url", ColumnType::Text),
  col("major", ColumnType::Text),
  col("job_search_status", ColumnType::Enum(JobSearchStatus::VALUES)),
  col("gpa", ColumnType::Number),
  col("graduation_year", ColumnType::Integer),
  col("interests", ColumnType::TextArray),
  col("target_industries", ColumnType::TextArray),
  col("target_roles", ColumnType::TextArray),
  col("is_active", ColumnType::Boolean),
  col("needs_sponsorship", ColumnType::Boolean),
  col("created_at", ColumnType::Timestamp),
  col("updated_at", ColumnType::Timestamp),
];

const NOTES: &[Column] = &[
  col("id", ColumnType::Uuid),
  col("person_id", ColumnType::Uuid),
  col("content", ColumnType::Text),
  col("type", ColumnType::Enum(NoteType::VALUES)),
  col("created_at", ColumnType::Timestamp),
];

const INTERACTIONS: &[Column] = &[
  col("id", ColumnType::Uuid),
  col("person_id", ColumnType::Uuid),
  col("scheduled_at", ColumnType::Timestamp),
  col("duration_minutes", ColumnType::Integer),
  col("type", ColumnType::Enum(InteractionType::VALUES)),
  col("status", ColumnType::Enum(InteractionStatus::VALUES)),
  col("attended", ColumnType::Boolean),
  col("created_at", ColumnType::Timestamp),
];

// ─── Collections ─────────────────────────────────────────────────────────────

/// A named collection in the backing store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  People,
  Notes,
  Interactions,
}

impl Collection {
  pub const ALL: [Self; 3] = [Self::People, Self::Notes, Self::Interactions];

  /// The table name used by the store and by candidate query text.
  pub fn name(self) -> &'static str {
    match self {
      Self::People => "people",
      Self::Notes => "notes",
      Self::Interactions => "interactions",
    }
  }

  /// Case-insensitive lookup by table name.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name))
  }

  pub fn columns(self) -> &'static [Column] {
    match self {
      Self::People => PEOPLE,
      Self::Notes => NOTES,
      Self::Interactions => INTERACTIONS,
    }
  }

  /// Case-insensitive column lookup.
  pub fn column(self, name: &str) -> Option<&'static Column> {
    self.columns().iter().find(|c| c.name.eq_ignore_ascii_case(name))
  }

  pub fn primary_key(self) -> &'static str { "id" }

  /// The foreign key pointing at `people.id`, for child collections.
  pub fn person_key(self) -> Option<&'static str> {
    match self {
      Self::People => None,
      Self::Notes | Self::Interactions => Some("person_id"),
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Prompt rendering ────────────────────────────────────────────────────────

/// Render every collection as plain text for the prompt builder.
pub fn describe() -> String {
  let mut out = String::new();
  for collection in Collection::ALL {
    let _ = write!(out, "Table {}", collection.name());
    if let Some(fk) = collection.person_key() {
      let _ = write!(out, " ({fk} references people.id)");
    }
    out.push_str(":\n");

    for column in collection.columns() {
      let _ = write!(out, "  {} {}", column.name, column.ty.sql_name());
      if column.name == collection.primary_key() {
        out.push_str(" primary key");
      }
      if let ColumnType::Enum(values) = column.ty {
        let quoted: Vec<String> =
          values.iter().map(|v| format!("'{v}'")).collect();
        let _ = write!(out, ", one of {}", quoted.join(", "));
      }
      out.push('\n');
    }
  }
  out
}
