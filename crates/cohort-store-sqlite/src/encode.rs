//! Conversions between JSON row values and SQLite column values.
//!
//! Booleans are stored as `0`/`1`, tag lists as compact JSON arrays,
//! timestamps as the fixed-width RFC 3339 text produced by
//! `cohort_core::record::timestamp`. Decoding is driven by the schema
//! column type, so rows read back look exactly like serialised records.

use cohort_core::{
  record::Row,
  schema::{Collection, ColumnType},
};
use rusqlite::types::{Type, Value as SqlValue};
use serde_json::Value;

use crate::Result;

/// A JSON value as a bindable SQLite parameter.
pub fn encode_value(value: &Value) -> Result<SqlValue> {
  Ok(match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(serde_json::to_string(value)?),
  })
}

/// Insert parameters for `row`, in schema column order.
pub fn encode_row(collection: Collection, row: &Row) -> Result<Vec<SqlValue>> {
  collection
    .columns()
    .iter()
    .map(|c| encode_value(row.get(c.name).unwrap_or(&Value::Null)))
    .collect()
}

fn decode_column(
  row: &rusqlite::Row<'_>,
  idx: usize,
  ty: ColumnType,
) -> rusqlite::Result<Value> {
  let value = match ty {
    ColumnType::Number => row.get::<_, Option<f64>>(idx)?.map(Value::from),
    ColumnType::Integer => row.get::<_, Option<i64>>(idx)?.map(Value::from),
    ColumnType::Boolean => row.get::<_, Option<i64>>(idx)?.map(|n| Value::Bool(n != 0)),
    ColumnType::TextArray => match row.get::<_, Option<String>>(idx)? {
      Some(text) => Some(serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
      })?),
      None => None,
    },
    ColumnType::Uuid | ColumnType::Text | ColumnType::Enum(_) | ColumnType::Timestamp => {
      row.get::<_, Option<String>>(idx)?.map(Value::from)
    }
  };
  Ok(value.unwrap_or(Value::Null))
}

/// Decode `collection`'s columns starting at result column `offset`.
pub fn decode_row(
  collection: Collection,
  row: &rusqlite::Row<'_>,
  offset: usize,
) -> rusqlite::Result<Row> {
  collection
    .columns()
    .iter()
    .enumerate()
    .map(|(i, c)| Ok((c.name.to_owned(), decode_column(row, offset + i, c.ty)?)))
    .collect()
}
