//! The interface to the language model that writes candidate query text.

use std::future::Future;

use cohort_core::schema;

/// Produces candidate SQL-like text for a natural-language question.
pub trait CandidateSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn candidate<'a>(
    &'a self,
    question: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// Instructions sent ahead of every question.
pub fn system_prompt() -> String {
  format!(
    "You translate questions about a student career-services roster into a \
     single read-only PostgreSQL SELECT statement.\n\
     \n\
     {}\n\
     Rules:\n\
     - Return only the SQL, with no explanation.\n\
     - Combine conditions with AND only; never use OR, NOT, IN or sub-queries.\n\
     - Use ILIKE '%text%' for text search and col @> ARRAY['value'] for tag lists.\n\
     - Use EXTRACT(YEAR FROM col) = EXTRACT(YEAR FROM CURRENT_DATE) for \"this year\".\n\
     - Join at most one of notes or interactions to people, on person_id = people.id.\n\
     - For \"how many\" questions use COUNT(DISTINCT people.id).\n\
     - Otherwise select people.* and add DISTINCT when joining.\n",
    schema::describe()
  )
}

/// Strip a surrounding markdown code fence and whitespace from model output.
pub fn clean_candidate(raw: &str) -> &str {
  let text = raw.trim();
  let Some(rest) = text.strip_prefix("```") else {
    return text;
  };

  // Drop a language tag such as `sql`, but never the query's own SELECT.
  let tag_len = rest
    .find(|c: char| !c.is_ascii_alphanumeric())
    .unwrap_or(rest.len());
  let body = if rest[..tag_len].eq_ignore_ascii_case("select") {
    rest
  } else {
    &rest[tag_len..]
  };

  body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
