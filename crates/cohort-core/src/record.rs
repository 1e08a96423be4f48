//! Record types for the three roster collections.
//!
//! Records are owned by the backing store and are read-only from the
//! translator's point of view. The typed structs exist for fixtures, seeding,
//! and row encoding; query results travel as untyped [`Row`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A single result row: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Serialise any record into a [`Row`].
pub fn to_row<T: Serialize>(record: &T) -> Result<Row> {
  match serde_json::to_value(record)? {
    serde_json::Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject),
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Fixed-width RFC 3339 encoding (microseconds, `Z` suffix).
///
/// Every store emits timestamps in this form so that string comparison and
/// chronological comparison agree.
pub mod timestamp {
  use chrono::{DateTime, SecondsFormat, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn encode(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
  }

  pub fn decode(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
  }

  pub fn serialize<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(*dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    decode(&s).map_err(serde::de::Error::custom)
  }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Where a person is in their job search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobSearchStatus {
  #[serde(rename = "Actively Searching")]
  ActivelySearching,
  #[serde(rename = "Casually Looking")]
  CasuallyLooking,
  #[serde(rename = "Not Looking")]
  NotLooking,
  #[serde(rename = "Employed")]
  Employed,
}

impl JobSearchStatus {
  /// Stored values, in declaration order. Must match the serde renames above.
  pub const VALUES: &'static [&'static str] =
    &["Actively Searching", "Casually Looking", "Not Looking", "Employed"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
  General,
  Meeting,
  FollowUp,
  Feedback,
}

impl NoteType {
  pub const VALUES: &'static [&'static str] =
    &["general", "meeting", "follow_up", "feedback"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
  CoffeeChat,
  MockInterview,
  ResumeReview,
  Workshop,
  OneOnOne,
}

impl InteractionType {
  pub const VALUES: &'static [&'static str] = &[
    "coffee_chat",
    "mock_interview",
    "resume_review",
    "workshop",
    "one_on_one",
  ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
  Scheduled,
  Completed,
  Cancelled,
  NoShow,
}

impl InteractionStatus {
  pub const VALUES: &'static [&'static str] =
    &["scheduled", "completed", "cancelled", "no_show"];
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A person on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:                Uuid,
  pub first_name:        String,
  pub last_name:         String,
  pub email:             Option<String>,
  pub phone:             Option<String>,
  pub linkedin_url:      Option<String>,
  pub major:             Option<String>,
  pub job_search_status: JobSearchStatus,
  pub gpa:               Option<f64>,
  pub graduation_year:   Option<i64>,
  #[serde(default)]
  pub interests:         Vec<String>,
  #[serde(default)]
  pub target_industries: Vec<String>,
  #[serde(default)]
  pub target_roles:      Vec<String>,
  #[serde(default)]
  pub is_active:         bool,
  #[serde(default)]
  pub needs_sponsorship: bool,
  #[serde(with = "timestamp")]
  pub created_at:        DateTime<Utc>,
  #[serde(with = "timestamp")]
  pub updated_at:        DateTime<Utc>,
}

/// A free-text note attached to exactly one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
  pub id:         Uuid,
  pub person_id:  Uuid,
  pub content:    String,
  #[serde(rename = "type")]
  pub note_type:  NoteType,
  #[serde(with = "timestamp")]
  pub created_at: DateTime<Utc>,
}

/// A scheduled interaction with exactly one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
  pub id:               Uuid,
  pub person_id:        Uuid,
  #[serde(with = "timestamp")]
  pub scheduled_at:     DateTime<Utc>,
  pub duration_minutes: Option<i64>,
  #[serde(rename = "type")]
  pub interaction_type: InteractionType,
  pub status:           InteractionStatus,
  #[serde(default)]
  pub attended:         bool,
  #[serde(with = "timestamp")]
  pub created_at:       DateTime<Utc>,
}

/// A complete data set, as loaded from a seed file or built in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
  #[serde(default)]
  pub people:       Vec<Person>,
  #[serde(default)]
  pub notes:        Vec<Note>,
  #[serde(default)]
  pub interactions: Vec<Interaction>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn person_row_uses_store_column_names() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
    let person = Person {
      id:                Uuid::nil(),
      first_name:        "Ada".into(),
      last_name:         "Byron".into(),
      email:             None,
      phone:             None,
      linkedin_url:      None,
      major:             Some("Mathematics".into()),
      job_search_status: JobSearchStatus::ActivelySearching,
      gpa:               Some(3.9),
      graduation_year:   Some(2026),
      interests:         vec!["AI".into()],
      target_industries: vec![],
      target_roles:      vec![],
      is_active:         true,
      needs_sponsorship: false,
      created_at:        at,
      updated_at:        at,
    };

    let row = to_row(&person).unwrap();
    assert_eq!(row["job_search_status"], "Actively Searching");
    assert_eq!(row["created_at"], "2025-03-01T09:30:00.000000Z");
    assert_eq!(row["interests"], serde_json::json!(["AI"]));
  }

  #[test]
  fn note_type_serialises_under_type_key() {
    let note = Note {
      id:         Uuid::nil(),
      person_id:  Uuid::nil(),
      content:    "Follow up about internships".into(),
      note_type:  NoteType::FollowUp,
      created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
    };
    let row = to_row(&note).unwrap();
    assert_eq!(row["type"], "follow_up");
    assert!(!row.contains_key("note_type"));
  }

  #[test]
  fn enum_value_tables_match_serde_names() {
    for (status, expected) in [
      (JobSearchStatus::ActivelySearching, JobSearchStatus::VALUES[0]),
      (JobSearchStatus::Employed, JobSearchStatus::VALUES[3]),
    ] {
      assert_eq!(serde_json::to_value(status).unwrap(), expected);
    }
    assert_eq!(
      serde_json::to_value(InteractionStatus::NoShow).unwrap(),
      InteractionStatus::VALUES[3]
    );
  }
}
