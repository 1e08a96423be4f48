//! Query plan builder: validated [`Select`] → immutable [`QueryPlan`].

use chrono::NaiveDate;
use cohort_core::{
  plan::{Aggregation, OrderBy, QueryPlan, Relation},
  schema::{Collection, Column, ColumnType},
};

use crate::{
  ast::{ColumnRef, Join, Projection, Select, SelectItem, TableRef},
  error::{Error, Result},
  extract::extract,
  scope::Scope,
};

fn shape(message: impl Into<String>) -> Error {
  Error::UnsupportedQueryShape(message.into())
}

fn collection_of(table: &TableRef) -> Result<Collection> {
  Collection::from_name(&table.name)
    .ok_or_else(|| shape(format!("unknown table {:?}", table.name)))
}

fn resolve_shape(
  scope: &Scope,
  column: &ColumnRef,
) -> Result<(Collection, &'static Column)> {
  scope.resolve(column).map_err(shape)
}

pub(crate) fn build_plan(select: &Select, today: NaiveDate) -> Result<QueryPlan> {
  let from = collection_of(&select.from)?;
  let mut scope = Scope::default();
  scope.bind(from, &select.from);

  let related = match &select.join {
    None if from == Collection::People => None,
    None => {
      return Err(shape(format!(
        "queries must select from people, not {from}"
      )));
    }
    Some(join) => Some(bind_join(from, join, &mut scope)?),
  };
  let relation = Relation::joining(related)
    .ok_or_else(|| shape("only notes or interactions can be joined to people"))?;

  let aggregation = match &select.projection {
    Projection::Count { column, .. } => {
      if let Some(column) = column {
        check_count_target(&scope, relation, column)?;
      }
      Aggregation::Count
    }
    Projection::Items(items) => {
      for item in items {
        check_row_item(&scope, item)?;
      }
      Aggregation::None
    }
  };

  let distinct = select.distinct
    || matches!(select.projection, Projection::Count { distinct: true, .. });

  let order_by = select
    .order_by
    .as_ref()
    .map(|item| {
      let (collection, def) = resolve_shape(&scope, &item.column)?;
      if def.ty == ColumnType::TextArray {
        return Err(shape(format!(
          "cannot order by the array column {collection}.{}",
          def.name
        )));
      }
      Ok(OrderBy {
        collection,
        field: def.name.to_owned(),
        ascending: item.ascending,
      })
    })
    .transpose()?;

  let predicates = extract(&select.filter, &scope, today)?;

  Ok(QueryPlan::new(
    relation,
    predicates,
    aggregation,
    distinct,
    order_by,
    select.limit,
  ))
}

/// Validate the join and bind its table. Returns the non-people collection.
fn bind_join(from: Collection, join: &Join, scope: &mut Scope) -> Result<Collection> {
  let joined = collection_of(&join.table)?;
  let related = match (from, joined) {
    (Collection::People, other) | (other, Collection::People)
      if other != Collection::People =>
    {
      other
    }
    _ => {
      return Err(shape(format!(
        "unsupported join between {from} and {joined}"
      )));
    }
  };
  scope.bind(joined, &join.table);

  let (left, right) = &join.on;
  let left = resolve_shape(scope, left)?;
  let right = resolve_shape(scope, right)?;
  let key = |(c, def): (Collection, &Column)| (c, def.name);

  let expected = (Collection::People, Collection::People.primary_key());
  let foreign = (related, related.person_key().unwrap_or("person_id"));
  let sides = (key(left), key(right));
  if sides != (expected, foreign) && sides != (foreign, expected) {
    return Err(shape(format!(
      "join must be on people.id = {related}.person_id"
    )));
  }
  Ok(related)
}

fn check_count_target(
  scope: &Scope,
  relation: Relation,
  column: &ColumnRef,
) -> Result<()> {
  let (collection, def) = resolve_shape(scope, column)?;
  let person_id = match collection {
    Collection::People => def.name == Collection::People.primary_key(),
    other => Some(other) == relation.related() && other.person_key() == Some(def.name),
  };
  if person_id {
    Ok(())
  } else {
    Err(shape(format!(
      "COUNT({column}) is not supported; count people with COUNT(*) or COUNT(people.id)"
    )))
  }
}

fn check_row_item(scope: &Scope, item: &SelectItem) -> Result<()> {
  let collection = match item {
    SelectItem::Wildcard(None) => return Ok(()),
    SelectItem::Wildcard(Some(q)) => scope
      .qualifier(q)
      .ok_or_else(|| shape(format!("unknown table or alias {q:?}")))?,
    SelectItem::Column(column) => resolve_shape(scope, column)?.0,
  };
  if collection == Collection::People {
    Ok(())
  } else {
    Err(shape(format!(
      "only people columns can be selected, not {collection} columns"
    )))
  }
}
