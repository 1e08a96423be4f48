//! Constrained query translator for cohort.
//!
//! Turns untrusted, model-generated SQL-like text into a validated
//! [`QueryPlan`]. Pure synchronous; no I/O.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use cohort_sql::translate;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let plan = translate("SELECT COUNT(*) FROM people WHERE gpa > 3.5", today).unwrap();
//! assert!(plan.is_count());
//! ```

pub mod ast;
mod build;
pub mod error;
mod extract;
pub mod gate;
mod lex;
pub mod parse;
mod scope;

use chrono::NaiveDate;
use cohort_core::plan::QueryPlan;
pub use error::{Error, Result};

/// Run the safety gate, parse, and build a plan.
///
/// `today` anchors year predicates such as
/// `EXTRACT(YEAR FROM created_at) = EXTRACT(YEAR FROM CURRENT_DATE)`.
pub fn translate(candidate: &str, today: NaiveDate) -> Result<QueryPlan> {
  let text = gate::check(candidate)?;
  let select = parse::parse(text)?;
  let plan = build::build_plan(&select, today)?;
  tracing::debug!(?plan, "translated candidate");
  Ok(plan)
}
