//! Typed syntax tree for the supported SELECT subset.
//!
//! Names are kept as written; resolution against the schema happens when the
//! plan is built.

/// A possibly-qualified column reference, e.g. `p.gpa` or `gpa`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
  pub qualifier: Option<String>,
  pub name:      String,
}

impl std::fmt::Display for ColumnRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.qualifier {
      Some(q) => write!(f, "{q}.{}", self.name),
      None => f.write_str(&self.name),
    }
  }
}

/// A table in `FROM` or `JOIN`, with its optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
  pub name:  String,
  pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
  pub table: TableRef,
  /// The two sides of the `ON a = b` equality.
  pub on:    (ColumnRef, ColumnRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
  /// `*` or `alias.*`.
  Wildcard(Option<String>),
  Column(ColumnRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
  /// `COUNT(*)`, `COUNT(col)` or `COUNT(DISTINCT col)`.
  Count {
    distinct: bool,
    column:   Option<ColumnRef>,
  },
  Items(Vec<SelectItem>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
  Eq,
  Lt,
  Lte,
  Gt,
  Gte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  Str(String),
  /// Numeric text as written.
  Number(String),
  Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearValue {
  /// The year of `CURRENT_DATE` / `NOW()`.
  Current,
  Literal(i32),
}

/// One conjunct of a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  Compare {
    column: ColumnRef,
    op:     Comparison,
    value:  Literal,
  },
  ILike {
    column:  ColumnRef,
    pattern: String,
  },
  /// `col @> ARRAY['a', 'b']`
  ArrayContains {
    column: ColumnRef,
    values: Vec<String>,
  },
  /// `'a' = ANY(col)`
  AnyEquals {
    column: ColumnRef,
    value:  String,
  },
  /// `EXTRACT(YEAR FROM col) = ...`
  YearEquals {
    column: ColumnRef,
    year:   YearValue,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
  pub column:    ColumnRef,
  pub ascending: bool,
}

/// A parsed `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
  pub distinct:   bool,
  pub projection: Projection,
  pub from:       TableRef,
  pub join:       Option<Join>,
  /// AND-combined conditions, in textual order.
  pub filter:     Vec<Condition>,
  pub order_by:   Option<OrderItem>,
  pub limit:      Option<usize>,
}
