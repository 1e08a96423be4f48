//! Predicate extraction: typed `WHERE` conditions → [`Predicate`]s.
//!
//! Every condition either yields predicates on a known, correctly-typed
//! column or fails with [`Error::UnsupportedPredicate`]. Nothing is dropped.

use chrono::{Datelike as _, NaiveDate};
use cohort_core::{
  plan::{Operator, Predicate},
  schema::{Collection, Column, ColumnType},
};
use serde_json::Value;

use crate::{
  ast::{ColumnRef, Comparison, Condition, Literal, YearValue},
  error::{Error, Result},
  scope::Scope,
};

fn unsupported(message: impl Into<String>) -> Error {
  Error::UnsupportedPredicate(message.into())
}

/// Extract predicates from AND-combined conditions, preserving their order.
pub(crate) fn extract(
  conditions: &[Condition],
  scope: &Scope,
  today: NaiveDate,
) -> Result<Vec<Predicate>> {
  let mut predicates = Vec::with_capacity(conditions.len());
  for condition in conditions {
    push_predicates(condition, scope, today, &mut predicates)?;
  }
  Ok(predicates)
}

fn resolve(scope: &Scope, column: &ColumnRef) -> Result<(Collection, &'static Column)> {
  scope.resolve(column).map_err(unsupported)
}

fn push_predicates(
  condition: &Condition,
  scope: &Scope,
  today: NaiveDate,
  out: &mut Vec<Predicate>,
) -> Result<()> {
  match condition {
    Condition::Compare { column, op, value } => {
      let (collection, def) = resolve(scope, column)?;
      out.push(compare(collection, def, *op, value)?);
    }

    Condition::ILike { column, pattern } => {
      let (collection, def) = resolve(scope, column)?;
      if !matches!(def.ty, ColumnType::Text | ColumnType::Enum(_)) {
        return Err(unsupported(format!(
          "ILIKE needs a text column, {collection}.{} is {}",
          def.name,
          def.ty.sql_name()
        )));
      }
      out.push(Predicate::new(collection, def.name, Operator::ILike, pattern.as_str()));
    }

    Condition::ArrayContains { column, values } => {
      let (collection, def) = array_column(scope, column)?;
      out.extend(values.iter().map(|v| {
        Predicate::new(collection, def.name, Operator::Contains, v.as_str())
      }));
    }

    Condition::AnyEquals { column, value } => {
      let (collection, def) = array_column(scope, column)?;
      out.push(Predicate::new(collection, def.name, Operator::Contains, value.as_str()));
    }

    Condition::YearEquals { column, year } => {
      let (collection, def) = resolve(scope, column)?;
      if def.ty != ColumnType::Timestamp {
        return Err(unsupported(format!(
          "year extraction needs a timestamp column, {collection}.{} is {}",
          def.name,
          def.ty.sql_name()
        )));
      }
      let year = match year {
        YearValue::Current => today.year(),
        YearValue::Literal(y) => *y,
      };
      out.push(Predicate::new(collection, def.name, Operator::YearEq, year));
    }
  }
  Ok(())
}

fn array_column(
  scope: &Scope,
  column: &ColumnRef,
) -> Result<(Collection, &'static Column)> {
  let (collection, def) = resolve(scope, column)?;
  if def.ty != ColumnType::TextArray {
    return Err(unsupported(format!(
      "array containment needs an array column, {collection}.{} is {}",
      def.name,
      def.ty.sql_name()
    )));
  }
  Ok((collection, def))
}

fn number_value(text: &str) -> Result<Value> {
  if let Ok(int) = text.parse::<i64>() {
    return Ok(Value::from(int));
  }
  text
    .parse::<f64>()
    .ok()
    .and_then(serde_json::Number::from_f64)
    .map(Value::Number)
    .ok_or_else(|| unsupported(format!("invalid number {text:?}")))
}

fn compare(
  collection: Collection,
  def: &'static Column,
  op: Comparison,
  literal: &Literal,
) -> Result<Predicate> {
  let operator = match op {
    Comparison::Eq => Operator::Eq,
    Comparison::Lt => Operator::Lt,
    Comparison::Lte => Operator::Lte,
    Comparison::Gt => Operator::Gt,
    Comparison::Gte => Operator::Gte,
  };

  let value = match (operator, literal) {
    (Operator::Eq, Literal::Str(s)) if def.ty.is_textual() => {
      if let ColumnType::Enum(values) = def.ty
        && !values.contains(&s.as_str())
      {
        tracing::warn!(
          column = def.name,
          value = %s,
          "equality against a value outside the enumerated set"
        );
      }
      Value::from(s.as_str())
    }
    (Operator::Eq, Literal::Bool(b)) if def.ty == ColumnType::Boolean => Value::from(*b),
    (_, Literal::Number(n)) if def.ty.is_numeric() => number_value(n)?,
    _ => {
      let kind = match literal {
        Literal::Str(_) => "string",
        Literal::Number(_) => "number",
        Literal::Bool(_) => "boolean",
      };
      return Err(unsupported(format!(
        "{operator:?} against a {kind} is not valid on {collection}.{} ({})",
        def.name,
        def.ty.sql_name()
      )));
    }
  };

  Ok(Predicate::new(collection, def.name, operator, value))
}
