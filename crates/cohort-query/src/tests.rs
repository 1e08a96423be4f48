//! End-to-end properties, run against every store configuration:
//! the memory store with and without native counts, and SQLite.

use std::{convert::Infallible, time::Duration};

use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};
use cohort_core::{
  record::{
    Interaction, InteractionStatus, InteractionType, JobSearchStatus, Note,
    NoteType, Person, Roster, Row, to_row,
  },
  schema::Collection,
  store::{JoinedRow, RosterStore, StoreQuery},
};
use cohort_store_memory::MemoryStore;
use cohort_store_sqlite::SqliteStore;
use serde_json::json;
use uuid::Uuid;

use crate::{
  CandidateSource, Error, QueryResponse, Settings, answer,
  pipeline::execute_candidate, run,
};

// ─── Fixture ─────────────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

fn person(
  n: u128,
  first: &str,
  status: JobSearchStatus,
  gpa: Option<f64>,
  interests: &[&str],
  created: DateTime<Utc>,
) -> Person {
  Person {
    id:                Uuid::from_u128(n),
    first_name:        first.into(),
    last_name:         format!("Fixture{n}"),
    email:             Some(format!("{}@example.edu", first.to_lowercase())),
    phone:             None,
    linkedin_url:      None,
    major:             Some(if n % 2 == 0 { "Mathematics" } else { "Computer Science" }.into()),
    job_search_status: status,
    gpa,
    graduation_year:   Some(2026),
    interests:         interests.iter().map(|s| (*s).to_owned()).collect(),
    target_industries: vec![],
    target_roles:      vec![],
    is_active:         n != 4,
    needs_sponsorship: false,
    created_at:        created,
    updated_at:        created,
  }
}

fn note(n: u128, person: &Person, content: &str) -> Note {
  Note {
    id:         Uuid::from_u128(100 + n),
    person_id:  person.id,
    content:    content.into(),
    note_type:  NoteType::General,
    created_at: at(2026, 2, n as u32),
  }
}

fn interaction(
  n: u128,
  person: &Person,
  kind: InteractionType,
  scheduled: DateTime<Utc>,
  attended: bool,
) -> Interaction {
  Interaction {
    id:               Uuid::from_u128(200 + n),
    person_id:        person.id,
    scheduled_at:     scheduled,
    duration_minutes: Some(30),
    interaction_type: kind,
    status:           if attended { InteractionStatus::Completed } else { InteractionStatus::NoShow },
    attended,
    created_at:       scheduled,
  }
}

/// Six people; three actively searching (Ada, Cara, Eli).
///
/// Ada has two notes, one mentioning Python; Ben has one Python note.
/// Attended interactions: Ada (twice), Cara. Eli missed one.
fn fixture() -> Roster {
  use JobSearchStatus::*;

  let ada = person(1, "Ada", ActivelySearching, Some(3.9), &["AI", "Robotics"], at(2026, 2, 1));
  let ben = person(2, "Ben", Employed, Some(3.4), &["Finance"], at(2025, 6, 1));
  let cara = person(3, "Cara", ActivelySearching, Some(3.6), &["Healthcare", "AI"], at(2026, 3, 15));
  let dev = person(4, "Dev", NotLooking, None, &[], at(2024, 9, 1));
  let eli = person(5, "Eli", ActivelySearching, Some(3.5), &["AI"], at(2026, 1, 10));
  let fay = person(6, "Fay", CasuallyLooking, Some(2.8), &["Finance", "AI"], at(2025, 11, 11));

  Roster {
    notes: vec![
      note(1, &ada, "Built a great Python project"),
      note(2, &ada, "Discussed resume formatting"),
      note(3, &ben, "Offered python tutoring"),
      note(4, &cara, "Interested in biotech"),
    ],
    interactions: vec![
      interaction(1, &ada, InteractionType::MockInterview, at(2026, 3, 1), true),
      interaction(2, &ada, InteractionType::CoffeeChat, at(2025, 10, 1), true),
      interaction(3, &eli, InteractionType::MockInterview, at(2026, 4, 2), false),
      interaction(4, &cara, InteractionType::Workshop, at(2026, 5, 5), true),
    ],
    people: vec![ada, ben, cara, dev, eli, fay],
  }
}

fn settings() -> Settings { Settings::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()) }

fn memory() -> MemoryStore { MemoryStore::new(&fixture()).expect("memory store") }

async fn sqlite() -> SqliteStore {
  let store = SqliteStore::open_in_memory().await.expect("sqlite store");
  store.import(&fixture()).await.expect("import fixture");
  store
}

fn first_names(rows: &[Row]) -> Vec<&str> {
  rows.iter().map(|r| r["first_name"].as_str().unwrap()).collect()
}

async fn rows<S: RosterStore>(store: &S, candidate: &str) -> Vec<Row> {
  execute_candidate(store, candidate, settings())
    .await
    .unwrap_or_else(|e| panic!("{candidate}: {e}"))
    .rows
}

async fn count<S: RosterStore>(store: &S, candidate: &str) -> u64 {
  let result = execute_candidate(store, candidate, settings())
    .await
    .unwrap_or_else(|e| panic!("{candidate}: {e}"));
  assert_eq!(result.rows.len(), 1, "count emits one synthetic row");
  assert_eq!(result.rows[0]["count"], json!(result.count));
  result.count
}

/// Generate one test per store configuration for each property.
macro_rules! across_stores {
  ($($check:ident),* $(,)?) => {$(
    mod $check {
      use super::*;

      #[tokio::test]
      async fn memory() { super::$check(&super::memory()).await }

      #[tokio::test]
      async fn memory_without_native_counts() {
        let store = super::memory().without_server_count().without_distinct_join_count();
        super::$check(&store).await
      }

      #[tokio::test]
      async fn sqlite() { super::$check(&super::sqlite().await).await }
    }
  )*};
}

across_stores!(
  count_matches_fixture,
  joined_distinct_returns_each_person_once,
  gpa_filter_matches_reference_filter,
  top_level_or_is_unsupported,
  unknown_field_is_unsupported,
  responses_are_idempotent,
  joined_count_is_distinct_people,
  current_year_predicates,
  distinct_limit_applies_after_dedup,
  order_and_limit_on_simple_plan,
  array_containment_and_booleans,
);

// ─── Properties ──────────────────────────────────────────────────────────────

async fn count_matches_fixture<S: RosterStore>(store: &S) {
  let expected = fixture()
    .people
    .iter()
    .filter(|p| p.job_search_status == JobSearchStatus::ActivelySearching)
    .count() as u64;
  let n = count(
    store,
    "SELECT COUNT(*) FROM people WHERE job_search_status = 'Actively Searching'",
  )
  .await;
  assert_eq!(n, expected);
  assert_eq!(n, 3);
}

async fn joined_distinct_returns_each_person_once<S: RosterStore>(store: &S) {
  let matching = rows(
    store,
    "SELECT DISTINCT p.* FROM people p JOIN notes n ON n.person_id = p.id \
     WHERE n.content ILIKE '%python%'",
  )
  .await;
  assert_eq!(first_names(&matching), vec!["Ada", "Ben"]);

  // Both of Ada's notes match; she still appears once.
  let any_note = "SELECT DISTINCT p.* FROM people p JOIN notes n ON n.person_id = p.id";
  assert_eq!(first_names(&rows(store, any_note).await), vec!["Ada", "Ben", "Cara"]);

  // Without DISTINCT every matching pair yields a row.
  let all_pairs = "SELECT p.* FROM people p JOIN notes n ON n.person_id = p.id";
  assert_eq!(first_names(&rows(store, all_pairs).await), vec!["Ada", "Ada", "Ben", "Cara"]);
}

async fn gpa_filter_matches_reference_filter<S: RosterStore>(store: &S) {
  let reference: Vec<Row> = fixture()
    .people
    .iter()
    .filter(|p| p.gpa.is_some_and(|g| g > 3.5))
    .map(|p| to_row(p).unwrap())
    .collect();
  assert_eq!(rows(store, "SELECT * FROM people WHERE gpa > 3.5").await, reference);
}

async fn top_level_or_is_unsupported<S: RosterStore>(store: &S) {
  let candidate = "SELECT * FROM people WHERE gpa > 3.5 OR major = 'Mathematics'";
  let err = execute_candidate(store, candidate, settings()).await.unwrap_err();
  assert!(matches!(err, Error::UnsupportedPredicate { .. }), "{err:?}");
  assert_eq!(err.candidate(), Some(candidate));
}

async fn unknown_field_is_unsupported<S: RosterStore>(store: &S) {
  let candidate = "SELECT * FROM people WHERE gpa > 3.5 AND hometown = 'Springfield'";
  match run(store, candidate, settings()).await {
    QueryResponse::Failure(f) => {
      assert!(f.error.starts_with("unsupported predicate"), "{}", f.error);
      assert!(f.error.contains("hometown"));
      assert_eq!(f.details.as_deref(), Some(candidate));
    }
    other => panic!("expected a failure, got {other:?}"),
  }
}

async fn responses_are_idempotent<S: RosterStore>(store: &S) {
  for candidate in [
    "SELECT DISTINCT p.* FROM people p JOIN interactions i ON i.person_id = p.id \
     WHERE i.type = 'mock_interview' ORDER BY p.last_name",
    "SELECT COUNT(*) FROM people WHERE interests @> ARRAY['AI']",
    "DELETE FROM people",
  ] {
    let first = serde_json::to_string(&run(store, candidate, settings()).await).unwrap();
    let second = serde_json::to_string(&run(store, candidate, settings()).await).unwrap();
    assert_eq!(first, second);
  }
}

async fn joined_count_is_distinct_people<S: RosterStore>(store: &S) {
  for candidate in [
    "SELECT COUNT(DISTINCT p.id) FROM people p JOIN interactions i ON i.person_id = p.id \
     WHERE i.attended = true",
    "SELECT COUNT(*) FROM people p JOIN interactions i ON i.person_id = p.id \
     WHERE i.attended = true",
  ] {
    assert_eq!(count(store, candidate).await, 2, "{candidate}");
  }
}

async fn current_year_predicates<S: RosterStore>(store: &S) {
  let created = count(
    store,
    "SELECT COUNT(*) FROM people WHERE EXTRACT(YEAR FROM created_at) = EXTRACT(YEAR FROM CURRENT_DATE)",
  )
  .await;
  assert_eq!(created, 3);

  let interviewed = rows(
    store,
    "SELECT DISTINCT p.* FROM people p JOIN interactions i ON i.person_id = p.id \
     WHERE EXTRACT(YEAR FROM i.scheduled_at) = EXTRACT(YEAR FROM NOW()) \
     AND i.type = 'mock_interview'",
  )
  .await;
  assert_eq!(first_names(&interviewed), vec!["Ada", "Eli"]);

  let last_year = count(
    store,
    "SELECT COUNT(*) FROM people p JOIN interactions i ON i.person_id = p.id \
     WHERE DATE_PART('year', i.scheduled_at) = 2025",
  )
  .await;
  assert_eq!(last_year, 1);
}

async fn distinct_limit_applies_after_dedup<S: RosterStore>(store: &S) {
  let limited = rows(
    store,
    "SELECT DISTINCT p.* FROM people p JOIN notes n ON n.person_id = p.id LIMIT 2",
  )
  .await;
  assert_eq!(first_names(&limited), vec!["Ada", "Ben"]);
}

async fn order_and_limit_on_simple_plan<S: RosterStore>(store: &S) {
  let top = rows(
    store,
    "SELECT first_name, gpa FROM people WHERE gpa >= 3 ORDER BY gpa DESC LIMIT 3",
  )
  .await;
  assert_eq!(first_names(&top), vec!["Ada", "Cara", "Eli"]);
  // Whole person rows are returned regardless of the column list.
  assert!(top[0].contains_key("email"));
}

async fn array_containment_and_booleans<S: RosterStore>(store: &S) {
  let ai_and_finance = rows(
    store,
    "SELECT * FROM people WHERE interests @> ARRAY['AI', 'Finance']",
  )
  .await;
  assert_eq!(first_names(&ai_and_finance), vec!["Fay"]);

  let any_form = rows(store, "SELECT * FROM people WHERE 'Healthcare' = ANY(interests)").await;
  assert_eq!(first_names(&any_form), vec!["Cara"]);

  let inactive = count(store, "SELECT COUNT(*) FROM people WHERE is_active = false").await;
  assert_eq!(inactive, 1);
}

// ─── Safety gate never reaches the store ─────────────────────────────────────

/// A store that fails the test if the executor ever calls it.
struct UnreachableStore;

impl RosterStore for UnreachableStore {
  type Error = Infallible;

  async fn select(&self, _: &StoreQuery) -> Result<Vec<Row>, Infallible> {
    unreachable!("select called")
  }

  async fn select_joined(&self, _: &StoreQuery) -> Result<Vec<JoinedRow>, Infallible> {
    unreachable!("select_joined called")
  }

  async fn count(&self, _: &StoreQuery) -> Result<Option<u64>, Infallible> {
    unreachable!("count called")
  }

  async fn count_distinct_joined(&self, _: &StoreQuery) -> Result<Option<u64>, Infallible> {
    unreachable!("count_distinct_joined called")
  }

  async fn collection_size(&self, _: Collection) -> Result<u64, Infallible> {
    unreachable!("collection_size called")
  }
}

#[tokio::test]
async fn non_select_statements_never_reach_the_store() {
  for candidate in [
    "DELETE FROM people",
    "insert into notes values (1)",
    "  UPDATE people SET gpa = 4.0",
    "DROP TABLE interactions; SELECT 1",
    "ALTER TABLE people ADD COLUMN x int",
    "TRUNCATE people",
    "-- sneaky\nDELETE FROM people",
  ] {
    let err = execute_candidate(&UnreachableStore, candidate, settings())
      .await
      .unwrap_err();
    assert_eq!(err, Error::RejectedStatement { candidate: candidate.into() });
  }
}

#[tokio::test]
async fn unsupported_shapes_never_reach_the_store() {
  for candidate in [
    "SELECT * FROM people LEFT JOIN notes ON notes.person_id = people.id",
    "SELECT * FROM people GROUP BY major",
    "SELECT * FROM people; DELETE FROM people",
    "SELECT * FROM notes",
  ] {
    let err = execute_candidate(&UnreachableStore, candidate, settings())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::UnsupportedQueryShape { .. }), "{candidate}: {err:?}");
  }
}

// ─── Timeouts ────────────────────────────────────────────────────────────────

/// A store that answers too slowly.
struct SlowStore(MemoryStore);

impl RosterStore for SlowStore {
  type Error = cohort_store_memory::Error;

  async fn select(&self, query: &StoreQuery) -> Result<Vec<Row>, Self::Error> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    self.0.select(query).await
  }

  async fn select_joined(&self, query: &StoreQuery) -> Result<Vec<JoinedRow>, Self::Error> {
    self.0.select_joined(query).await
  }

  async fn count(&self, query: &StoreQuery) -> Result<Option<u64>, Self::Error> {
    self.0.count(query).await
  }

  async fn count_distinct_joined(&self, query: &StoreQuery) -> Result<Option<u64>, Self::Error> {
    self.0.count_distinct_joined(query).await
  }

  async fn collection_size(&self, collection: Collection) -> Result<u64, Self::Error> {
    self.0.collection_size(collection).await
  }
}

#[tokio::test]
async fn timeout_is_an_execution_error() {
  let store = SlowStore(memory());
  let settings = settings().with_timeout(Some(Duration::from_millis(20)));

  let err = execute_candidate(&store, "SELECT * FROM people", settings).await.unwrap_err();
  assert!(matches!(err, Error::ExecutionError(ref m) if m.contains("20 ms")), "{err:?}");

  // Paths that avoid the slow call still finish.
  let ok = execute_candidate(&store, "SELECT COUNT(*) FROM people", settings).await;
  assert_eq!(ok.unwrap().count, 6);
}

#[tokio::test]
async fn store_errors_become_execution_errors() {
  let store = memory();
  // A plan the translator would never build: ordering by a notes column
  // without a join.
  let plan = cohort_core::plan::QueryPlan::new(
    cohort_core::plan::Relation::Person,
    vec![],
    cohort_core::plan::Aggregation::None,
    false,
    Some(cohort_core::plan::OrderBy {
      collection: Collection::Notes,
      field:      "content".into(),
      ascending:  true,
    }),
    None,
  );
  let err = crate::executor::execute(&store, &plan, None).await.unwrap_err();
  assert!(matches!(err, Error::ExecutionError(_)));
}

// ─── Candidate sources ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("model unavailable")]
struct ModelDown;

/// Replies with fixed text, or fails.
struct Scripted(Option<&'static str>);

impl CandidateSource for Scripted {
  type Error = ModelDown;

  async fn candidate(&self, _question: &str) -> Result<String, ModelDown> {
    self.0.map(str::to_owned).ok_or(ModelDown)
  }
}

#[tokio::test]
async fn answer_cleans_fenced_model_output() {
  let source = Scripted(Some(
    "```sql\nSELECT COUNT(*) FROM people WHERE major ILIKE '%computer%';\n```",
  ));
  match answer(&memory(), &source, "How many CS students?", settings()).await {
    QueryResponse::Success(s) => {
      assert_eq!(s.count, 3);
      assert_eq!(s.query, "SELECT COUNT(*) FROM people WHERE major ILIKE '%computer%';");
      assert_eq!(serde_json::to_value(&s.results).unwrap(), json!([{ "count": 3 }]));
    }
    other => panic!("expected success, got {other:?}"),
  }
}

#[tokio::test]
async fn source_failure_is_an_upstream_error() {
  let response = answer(&memory(), &Scripted(None), "anything", settings()).await;
  assert_eq!(
    serde_json::to_value(&response).unwrap(),
    json!({ "success": false, "error": "could not generate a query: model unavailable" })
  );

  let empty = answer(&memory(), &Scripted(Some("```\n```")), "anything", settings()).await;
  assert!(matches!(empty, QueryResponse::Failure(f) if f.error.contains("empty query")));
}
