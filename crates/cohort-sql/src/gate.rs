//! Safety gate: deny every candidate that does not open with `SELECT`.
//!
//! This runs before any parsing. It is a whitelist on the leading keyword,
//! not a blacklist of dangerous ones.

use crate::error::{Error, Result};

const READ_KEYWORD: &str = "select";

/// The first run of identifier characters after leading whitespace.
///
/// Returns an empty string when the text opens with punctuation (a comment,
/// a parenthesis, a quote), which the gate then rejects.
fn leading_word(text: &str) -> &str {
  let trimmed = text.trim_start();
  let end = trimmed
    .char_indices()
    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
    .map_or(trimmed.len(), |(i, _)| i);
  &trimmed[..end]
}

/// Pass `text` through unchanged if its first keyword is `SELECT`.
pub fn check(text: &str) -> Result<&str> {
  if leading_word(text).eq_ignore_ascii_case(READ_KEYWORD) {
    Ok(text)
  } else {
    Err(Error::RejectedStatement)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn select_in_any_case_passes() {
    for text in ["SELECT * FROM people", "  select 1", "\n\tSeLeCt count(*)"] {
      assert_eq!(check(text), Ok(text));
    }
  }

  #[test]
  fn write_statements_are_rejected() {
    for text in [
      "INSERT INTO people (first_name) VALUES ('x')",
      "update people set gpa = 4.0",
      "DELETE FROM notes",
      "ALTER TABLE people ADD COLUMN x int",
      "DROP TABLE interactions",
      "TRUNCATE people",
      "WITH x AS (DELETE FROM notes RETURNING *) SELECT * FROM x",
      "GRANT ALL ON people TO public",
    ] {
      assert_eq!(check(text), Err(Error::RejectedStatement), "{text}");
    }
  }

  #[test]
  fn leading_punctuation_is_rejected() {
    for text in [
      "",
      "   ",
      "-- comment\nSELECT * FROM people",
      "/* hi */ SELECT 1",
      "(SELECT * FROM people)",
      ";SELECT 1",
    ] {
      assert_eq!(check(text), Err(Error::RejectedStatement), "{text:?}");
    }
  }

  #[test]
  fn keyword_prefix_is_not_enough() {
    assert_eq!(check("SELECTED * FROM people"), Err(Error::RejectedStatement));
    assert_eq!(check("select_all()"), Err(Error::RejectedStatement));
  }
}
