//! Tests for `MemoryStore` against a small fixed roster.

use chrono::{TimeZone as _, Utc};
use cohort_core::{
  record::{
    Interaction, InteractionStatus, InteractionType, JobSearchStatus, Note,
    NoteType, Person, Roster,
  },
  schema::Collection,
  store::{CompareOp, Filter, JoinRestriction, Order, RosterStore, StoreQuery},
};
use serde_json::json;
use uuid::Uuid;

use crate::{Error, MemoryStore};

fn person(first: &str, status: JobSearchStatus, gpa: Option<f64>) -> Person {
  let at = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
  Person {
    id:                Uuid::new_v4(),
    first_name:        first.into(),
    last_name:         "Test".into(),
    email:             None,
    phone:             None,
    linkedin_url:      None,
    major:             Some("Computer Science".into()),
    job_search_status: status,
    gpa,
    graduation_year:   Some(2026),
    interests:         vec!["AI".into()],
    target_industries: vec![],
    target_roles:      vec![],
    is_active:         true,
    needs_sponsorship: false,
    created_at:        at,
    updated_at:        at,
  }
}

fn note(person: &Person, content: &str) -> Note {
  Note {
    id:         Uuid::new_v4(),
    person_id:  person.id,
    content:    content.into(),
    note_type:  NoteType::General,
    created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
  }
}

/// Ada (3.9, two notes), Ben (3.1, one note), Cy (no gpa, no notes).
fn roster() -> Roster {
  let ada = person("Ada", JobSearchStatus::ActivelySearching, Some(3.9));
  let ben = person("Ben", JobSearchStatus::Employed, Some(3.1));
  let cy = person("Cy", JobSearchStatus::ActivelySearching, None);
  Roster {
    notes: vec![
      note(&ada, "Strong Python skills"),
      note(&ben, "Asked about Python internships"),
      note(&ada, "Needs resume help"),
    ],
    interactions: vec![Interaction {
      id:               Uuid::new_v4(),
      person_id:        ben.id,
      scheduled_at:     Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap(),
      duration_minutes: Some(30),
      interaction_type: InteractionType::CoffeeChat,
      status:           InteractionStatus::Completed,
      attended:         true,
      created_at:       Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap(),
    }],
    people: vec![ada, ben, cy],
  }
}

fn store() -> MemoryStore { MemoryStore::new(&roster()).expect("memory store") }

fn names(rows: &[cohort_core::record::Row]) -> Vec<&str> {
  rows.iter().map(|r| r["first_name"].as_str().unwrap()).collect()
}

fn notes_matching(pattern: &str) -> JoinRestriction {
  JoinRestriction {
    collection: Collection::Notes,
    filters:    vec![Filter::Pattern { field: "content".into(), pattern: pattern.into() }],
  }
}

// ─── select ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_without_order_keeps_insertion_order() {
  let rows = store().select(&StoreQuery::default()).await.unwrap();
  assert_eq!(names(&rows), vec!["Ada", "Ben", "Cy"]);
}

#[tokio::test]
async fn select_filters_orders_and_limits() {
  let query = StoreQuery {
    filters: vec![Filter::Compare { field: "gpa".into(), op: CompareOp::Gt, value: json!(3) }],
    order: Some(Order { collection: Collection::People, field: "gpa".into(), ascending: true }),
    limit: Some(1),
    ..Default::default()
  };
  let rows = store().select(&query).await.unwrap();
  assert_eq!(names(&rows), vec!["Ben"]);
}

#[tokio::test]
async fn descending_order_puts_nulls_last() {
  let query = StoreQuery {
    order: Some(Order { collection: Collection::People, field: "gpa".into(), ascending: false }),
    ..Default::default()
  };
  let rows = store().select(&query).await.unwrap();
  assert_eq!(names(&rows), vec!["Ada", "Ben", "Cy"]);
}

#[tokio::test]
async fn unknown_filter_field_is_an_error() {
  let query = StoreQuery {
    filters: vec![Filter::Eq { field: "salary".into(), value: json!(1) }],
    ..Default::default()
  };
  let err = store().select(&query).await.unwrap_err();
  assert!(matches!(err, Error::UnknownField { field, .. } if field == "salary"));
}

// ─── Joins ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn joined_read_yields_one_entry_per_pair() {
  let query = StoreQuery { join: Some(notes_matching("%python%")), ..Default::default() };
  let pairs = store().select_joined(&query).await.unwrap();
  let people: Vec<&str> =
    pairs.iter().map(|p| p.person["first_name"].as_str().unwrap()).collect();
  assert_eq!(people, vec!["Ada", "Ben"]);
  assert_eq!(pairs[0].related["content"], "Strong Python skills");
}

#[tokio::test]
async fn joined_read_can_order_by_related_column() {
  let query = StoreQuery {
    join: Some(JoinRestriction { collection: Collection::Notes, filters: vec![] }),
    order: Some(Order { collection: Collection::Notes, field: "content".into(), ascending: true }),
    ..Default::default()
  };
  let pairs = store().select_joined(&query).await.unwrap();
  let contents: Vec<&str> =
    pairs.iter().map(|p| p.related["content"].as_str().unwrap()).collect();
  assert_eq!(contents, vec![
    "Asked about Python internships",
    "Needs resume help",
    "Strong Python skills",
  ]);
}

#[tokio::test]
async fn joining_people_to_people_is_rejected() {
  let query = StoreQuery {
    join: Some(JoinRestriction { collection: Collection::People, filters: vec![] }),
    ..Default::default()
  };
  let err = store().select_joined(&query).await.unwrap_err();
  assert!(matches!(err, Error::InvalidJoin(Collection::People)));
}

// ─── Counts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn counts_when_capable() {
  let s = store();
  let active = StoreQuery {
    filters: vec![Filter::Eq {
      field: "job_search_status".into(),
      value: json!("Actively Searching"),
    }],
    ..Default::default()
  };
  assert_eq!(s.count(&active).await.unwrap(), Some(2));

  let any_note = StoreQuery {
    join: Some(JoinRestriction { collection: Collection::Notes, filters: vec![] }),
    ..Default::default()
  };
  assert_eq!(s.count_distinct_joined(&any_note).await.unwrap(), Some(2));
}

#[tokio::test]
async fn counts_are_absent_when_disabled() {
  let s = store().without_server_count().without_distinct_join_count();
  let query = StoreQuery { join: Some(notes_matching("%")), ..Default::default() };
  assert_eq!(s.count(&query).await.unwrap(), None);
  assert_eq!(s.count_distinct_joined(&query).await.unwrap(), None);
}

#[tokio::test]
async fn collection_sizes() {
  let s = store();
  assert_eq!(s.collection_size(Collection::People).await.unwrap(), 3);
  assert_eq!(s.collection_size(Collection::Notes).await.unwrap(), 3);
  assert_eq!(s.collection_size(Collection::Interactions).await.unwrap(), 1);
}
