//! Parameterized SQL generation from a [`StoreQuery`].
//!
//! Identifiers come only from the static schema tables; every filter value is
//! bound as a `?` parameter. `people` is always aliased `p`, the joined
//! collection `r`.

use std::fmt::Write as _;

use cohort_core::{
  schema::Collection,
  store::{CompareOp, Filter, Order, StoreQuery},
};
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result, encode::encode_value};

/// What a statement returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
  /// Person columns.
  Rows,
  /// Person columns followed by the joined collection's columns.
  Pairs,
  /// `COUNT(*)` of matching people.
  Count,
  /// `COUNT(DISTINCT p.id)` over the join.
  CountDistinct,
}

/// A statement ready to prepare, with its parameters in order.
#[derive(Debug)]
pub struct Statement {
  pub text:   String,
  pub params: Vec<SqlValue>,
}

fn column_list(alias: &str, collection: Collection) -> String {
  collection
    .columns()
    .iter()
    .map(|c| format!("{alias}.\"{}\"", c.name))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Schema-validated column reference.
fn column(alias: &str, collection: Collection, field: &str) -> Result<String> {
  let def = collection.column(field).ok_or_else(|| Error::UnknownField {
    collection,
    field: field.to_owned(),
  })?;
  Ok(format!("{alias}.\"{}\"", def.name))
}

fn push_filter(
  alias: &str,
  collection: Collection,
  filter: &Filter,
  conds: &mut Vec<String>,
  params: &mut Vec<SqlValue>,
) -> Result<()> {
  let col = column(alias, collection, filter.field())?;
  match filter {
    Filter::Eq { value, .. } => {
      conds.push(format!("{col} = ?"));
      params.push(encode_value(value)?);
    }
    Filter::Compare { op, value, .. } => {
      let op = match op {
        CompareOp::Gt => ">",
        CompareOp::Gte => ">=",
        CompareOp::Lt => "<",
        CompareOp::Lte => "<=",
      };
      conds.push(format!("{col} {op} ?"));
      params.push(encode_value(value)?);
    }
    Filter::Pattern { pattern, .. } => {
      // SQLite LIKE is case-insensitive for ASCII.
      conds.push(format!("{col} LIKE ? ESCAPE '\\'"));
      params.push(SqlValue::Text(pattern.clone()));
    }
    Filter::Contains { value, .. } => {
      conds.push(format!(
        "EXISTS (SELECT 1 FROM json_each({col}) WHERE json_each.value = ?)"
      ));
      params.push(SqlValue::Text(value.clone()));
    }
  }
  Ok(())
}

fn order_clause(order: Option<&Order>, related: Option<Collection>) -> Result<String> {
  let mut keys = Vec::new();
  if let Some(order) = order {
    let alias = match order.collection {
      Collection::People => "p",
      c if Some(c) == related => "r",
      c => return Err(Error::InvalidOrder(c)),
    };
    let dir = if order.ascending { "ASC" } else { "DESC" };
    keys.push(format!("{} {dir}", column(alias, order.collection, &order.field)?));
  }
  keys.push("p.rowid".into());
  if related.is_some() {
    keys.push("r.rowid".into());
  }
  Ok(format!(" ORDER BY {}", keys.join(", ")))
}

/// Build the statement for `query` in the given shape.
pub fn build(query: &StoreQuery, shape: Shape) -> Result<Statement> {
  let joined = matches!(shape, Shape::Pairs | Shape::CountDistinct);
  let related = if joined {
    let join = query.join.as_ref().ok_or(Error::MissingJoin)?;
    if join.collection.person_key().is_none() {
      return Err(Error::InvalidJoin(join.collection));
    }
    Some(join)
  } else {
    None
  };

  let mut text = match shape {
    Shape::Rows => format!("SELECT {} FROM people p", column_list("p", Collection::People)),
    Shape::Pairs => format!(
      "SELECT {}, {} FROM people p",
      column_list("p", Collection::People),
      related.map_or(String::new(), |j| column_list("r", j.collection)),
    ),
    Shape::Count => "SELECT COUNT(*) FROM people p".to_owned(),
    Shape::CountDistinct => "SELECT COUNT(DISTINCT p.id) FROM people p".to_owned(),
  };

  let mut conds = Vec::new();
  let mut params = Vec::new();

  if let Some(join) = related {
    let _ = write!(text, " JOIN {} r ON r.person_id = p.id", join.collection.name());
  }
  for filter in &query.filters {
    push_filter("p", Collection::People, filter, &mut conds, &mut params)?;
  }
  if let Some(join) = related {
    for filter in &join.filters {
      push_filter("r", join.collection, filter, &mut conds, &mut params)?;
    }
  }
  if !conds.is_empty() {
    let _ = write!(text, " WHERE {}", conds.join(" AND "));
  }

  if matches!(shape, Shape::Rows | Shape::Pairs) {
    text.push_str(&order_clause(query.order.as_ref(), related.map(|j| j.collection))?);
    if let Some(limit) = query.limit {
      text.push_str(" LIMIT ?");
      params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }
  }

  Ok(Statement { text, params })
}
