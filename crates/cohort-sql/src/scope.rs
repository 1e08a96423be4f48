//! Name resolution: table aliases and (possibly unqualified) column names.

use cohort_core::schema::{Collection, Column};

use crate::ast::{ColumnRef, TableRef};

struct Binding {
  collection: Collection,
  table:      String,
  alias:      Option<String>,
}

/// The tables visible to a statement, in `FROM`, `JOIN` order.
#[derive(Default)]
pub(crate) struct Scope {
  bindings: Vec<Binding>,
}

impl Scope {
  pub(crate) fn bind(&mut self, collection: Collection, table: &TableRef) {
    self.bindings.push(Binding {
      collection,
      table: table.name.clone(),
      alias: table.alias.clone(),
    });
  }

  /// The collection a qualifier (alias or table name) refers to.
  pub(crate) fn qualifier(&self, qualifier: &str) -> Option<Collection> {
    self
      .bindings
      .iter()
      .find(|b| {
        b.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(qualifier))
          || b.table.eq_ignore_ascii_case(qualifier)
      })
      .map(|b| b.collection)
  }

  /// Resolve a column to its owning collection and schema entry.
  ///
  /// The error is a bare reason; callers decide which error kind it becomes.
  pub(crate) fn resolve(
    &self,
    column: &ColumnRef,
  ) -> Result<(Collection, &'static Column), String> {
    if let Some(q) = &column.qualifier {
      let collection = self
        .qualifier(q)
        .ok_or_else(|| format!("unknown table or alias {q:?}"))?;
      let def = collection.column(&column.name).ok_or_else(|| {
        format!("unknown column {:?} on {collection}", column.name)
      })?;
      return Ok((collection, def));
    }

    let mut owners = self
      .bindings
      .iter()
      .filter_map(|b| b.collection.column(&column.name).map(|c| (b.collection, c)));

    match (owners.next(), owners.next()) {
      (Some(found), None) => Ok(found),
      (Some((a, _)), Some((b, _))) => Err(format!(
        "column {:?} is ambiguous between {a} and {b}; qualify it",
        column.name
      )),
      (None, _) => Err(format!("unknown column {:?}", column.name)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scope() -> Scope {
    let mut scope = Scope::default();
    scope.bind(Collection::People, &TableRef { name: "people".into(), alias: Some("p".into()) });
    scope.bind(Collection::Notes, &TableRef { name: "notes".into(), alias: None });
    scope
  }

  fn col(q: Option<&str>, name: &str) -> ColumnRef {
    ColumnRef { qualifier: q.map(str::to_owned), name: name.into() }
  }

  #[test]
  fn qualified_by_alias_or_table_name() {
    let s = scope();
    assert_eq!(s.resolve(&col(Some("P"), "gpa")).unwrap().0, Collection::People);
    assert_eq!(s.resolve(&col(Some("people"), "gpa")).unwrap().0, Collection::People);
    assert_eq!(s.resolve(&col(Some("notes"), "content")).unwrap().0, Collection::Notes);
  }

  #[test]
  fn unqualified_resolves_to_unique_owner() {
    let s = scope();
    assert_eq!(s.resolve(&col(None, "content")).unwrap().0, Collection::Notes);
    assert_eq!(s.resolve(&col(None, "major")).unwrap().0, Collection::People);
  }

  #[test]
  fn shared_names_are_ambiguous() {
    let err = scope().resolve(&col(None, "created_at")).unwrap_err();
    assert!(err.contains("ambiguous"), "{err}");
  }

  #[test]
  fn unknown_names() {
    let s = scope();
    assert!(s.resolve(&col(None, "salary")).is_err());
    assert!(s.resolve(&col(Some("x"), "gpa")).is_err());
    assert!(s.resolve(&col(Some("p"), "content")).is_err());
  }
}
