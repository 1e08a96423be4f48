//! Filter evaluation and ordering over JSON rows.
//!
//! AND semantics, no coercion between strings and numbers. A missing or null
//! field never matches.

use std::cmp::Ordering;

use cohort_core::{
  record::{Row, timestamp},
  store::{CompareOp, Filter},
};
use serde_json::Value;

/// Whether `row` satisfies every filter.
pub(crate) fn matches_all(row: &Row, filters: &[Filter]) -> bool {
  filters.iter().all(|f| matches(row, f))
}

fn matches(row: &Row, filter: &Filter) -> bool {
  let Some(actual) = row.get(filter.field()).filter(|v| !v.is_null()) else {
    return false;
  };

  match filter {
    Filter::Eq { value, .. } => equals(actual, value),
    Filter::Compare { op, value, .. } => {
      let Some(ordering) = ordering(actual, value) else {
        return false;
      };
      match op {
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Gte => ordering.is_ge(),
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Lte => ordering.is_le(),
      }
    }
    Filter::Pattern { pattern, .. } => {
      actual.as_str().is_some_and(|text| like(text, pattern))
    }
    Filter::Contains { value, .. } => actual
      .as_array()
      .is_some_and(|items| items.iter().any(|i| i.as_str() == Some(value))),
  }
}

/// Numbers compare by value (`3 == 3.0`); everything else structurally.
fn equals(actual: &Value, expected: &Value) -> bool {
  match (actual, expected) {
    (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
    _ => actual == expected,
  }
}

/// Order two values of the same kind. Timestamps compare chronologically.
fn ordering(actual: &Value, bound: &Value) -> Option<Ordering> {
  match (actual, bound) {
    (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    (Value::String(a), Value::String(b)) => {
      match (timestamp::decode(a), timestamp::decode(b)) {
        (Ok(a), Ok(b)) => Some(a.cmp(&b)),
        _ => Some(a.cmp(b)),
      }
    }
    _ => None,
  }
}

// ─── Pattern matching ────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Pat {
  /// `%`
  Any,
  /// `_`
  One,
  Lit(char),
}

fn compile(pattern: &str) -> Vec<Pat> {
  let mut out = Vec::new();
  let mut chars = pattern.chars();
  while let Some(c) = chars.next() {
    out.push(match c {
      '%' => Pat::Any,
      '_' => Pat::One,
      '\\' => Pat::Lit(chars.next().unwrap_or('\\').to_ascii_lowercase()),
      c => Pat::Lit(c.to_ascii_lowercase()),
    });
  }
  out
}

/// `ILIKE` semantics: ASCII case-insensitive, `%`/`_` wildcards, `\` escape.
pub(crate) fn like(text: &str, pattern: &str) -> bool {
  let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
  let pattern = compile(pattern);

  let (mut t, mut p) = (0, 0);
  // Resume point after the most recent `%`: (pattern index, text index).
  let mut backtrack: Option<(usize, usize)> = None;

  while t < text.len() {
    match pattern.get(p) {
      Some(Pat::Any) => {
        backtrack = Some((p + 1, t));
        p += 1;
      }
      Some(Pat::One) => {
        t += 1;
        p += 1;
      }
      Some(Pat::Lit(c)) if *c == text[t] => {
        t += 1;
        p += 1;
      }
      _ => match backtrack {
        Some((bp, bt)) => {
          p = bp;
          t = bt + 1;
          backtrack = Some((bp, bt + 1));
        }
        None => return false,
      },
    }
  }

  pattern[p..].iter().all(|x| *x == Pat::Any)
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Sort order for `ORDER BY`: missing/null first, then bool < number < string.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  let rank = |v: Option<&Value>| match v {
    None | Some(Value::Null) => 0u8,
    Some(Value::Bool(_)) => 1,
    Some(Value::Number(_)) => 2,
    Some(Value::String(_)) => 3,
    Some(Value::Array(_)) => 4,
    Some(Value::Object(_)) => 5,
  };

  match (a, b) {
    (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
    (Some(Value::Number(x)), Some(Value::Number(y))) => {
      let x = x.as_f64().unwrap_or(0.0);
      let y = y.as_f64().unwrap_or(0.0);
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
    (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
    _ => rank(a).cmp(&rank(b)),
  }
}
