//! Recursive-descent parser for the supported SELECT subset.
//!
//! Pipeline:
//!   candidate &str
//!     └─ lex::tokenize()   → Vec<Token>
//!          └─ Parser::select() → ast::Select
//!
//! Anything the grammar does not model is a hard error. Errors raised while
//! inside the `WHERE` clause are [`Error::UnsupportedPredicate`]; everywhere
//! else they are [`Error::UnsupportedQueryShape`].

use crate::{
  ast::{
    ColumnRef, Comparison, Condition, Join, Literal, OrderItem, Projection,
    Select, SelectItem, TableRef, YearValue,
  },
  error::{Error, Result},
  lex::{self, Tok, Token},
};

/// Words that can never be an alias or a bare column name.
const RESERVED: &[&str] = &[
  "AND", "AS", "BY", "CROSS", "EXCEPT", "FETCH", "FOR", "FROM", "FULL",
  "GROUP", "HAVING", "INNER", "INTERSECT", "INTO", "JOIN", "LEFT", "LIMIT",
  "NATURAL", "NOT", "OFFSET", "ON", "OR", "ORDER", "OUTER", "RETURNING",
  "RIGHT", "SELECT", "UNION", "USING", "WHERE", "WINDOW",
];

/// Words that legitimately end a `WHERE` clause.
const FILTER_TERMINATORS: &[&str] = &[
  "EXCEPT", "GROUP", "HAVING", "INTERSECT", "LIMIT", "OFFSET", "ORDER", "UNION",
];

fn is_reserved(word: &str) -> bool {
  RESERVED.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn is_keyword(tok: Option<&Tok>, keyword: &str) -> bool {
  matches!(tok, Some(Tok::Word(w)) if w.eq_ignore_ascii_case(keyword))
}

/// Parse a complete candidate statement.
pub fn parse(input: &str) -> Result<Select> {
  let tokens = lex::tokenize(input)?;
  Parser { tokens: &tokens, pos: 0 }.select()
}

// ─── Parser state ────────────────────────────────────────────────────────────

/// Which error kind a failure in the current position maps to.
#[derive(Clone, Copy)]
enum Ctx {
  Shape,
  Predicate,
}

use Ctx::{Predicate as InFilter, Shape};

/// One side of a year comparison.
enum YearTerm {
  Of(ColumnRef),
  Current,
  Literal(i32),
}

struct Parser<'a> {
  tokens: &'a [Token],
  pos:    usize,
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<&'a Tok> { self.peek_nth(0) }

  fn peek_nth(&self, n: usize) -> Option<&'a Tok> {
    self.tokens.get(self.pos + n).map(|t| &t.tok)
  }

  fn at_keyword(&self, keyword: &str) -> bool { is_keyword(self.peek(), keyword) }

  fn eat_keyword(&mut self, keyword: &str) -> bool {
    let hit = self.at_keyword(keyword);
    if hit {
      self.pos += 1;
    }
    hit
  }

  fn eat(&mut self, tok: &Tok) -> bool {
    let hit = self.peek() == Some(tok);
    if hit {
      self.pos += 1;
    }
    hit
  }

  fn found(&self) -> String {
    match self.tokens.get(self.pos) {
      Some(t) => format!("`{}` at byte {}", t.tok.describe(), t.offset),
      None => "end of input".to_string(),
    }
  }

  fn error(&self, ctx: Ctx, message: &str) -> Error {
    let message = format!("{message} (found {})", self.found());
    match ctx {
      Shape => Error::UnsupportedQueryShape(message),
      InFilter => Error::UnsupportedPredicate(message),
    }
  }

  fn expect(&mut self, tok: &Tok, ctx: Ctx, what: &str) -> Result<()> {
    if self.eat(tok) {
      Ok(())
    } else {
      Err(self.error(ctx, &format!("expected {what}")))
    }
  }

  fn expect_keyword(&mut self, keyword: &str, ctx: Ctx) -> Result<()> {
    if self.eat_keyword(keyword) {
      Ok(())
    } else {
      Err(self.error(ctx, &format!("expected {keyword}")))
    }
  }

  // ── Statement ───────────────────────────────────────────────────────────

  fn select(mut self) -> Result<Select> {
    self.expect_keyword("SELECT", Shape)?;
    let distinct = self.eat_keyword("DISTINCT");
    let projection = self.projection()?;

    self.expect_keyword("FROM", Shape)?;
    let from = self.table_ref()?;
    let join = self.join()?;

    let filter = if self.eat_keyword("WHERE") {
      self.conjunction()?
    } else {
      Vec::new()
    };

    for keyword in ["GROUP", "HAVING"] {
      if self.at_keyword(keyword) {
        return Err(self.error(Shape, &format!("{keyword} is not supported")));
      }
    }

    let order_by = self.order_by()?;
    let limit = self.limit()?;

    if self.at_keyword("OFFSET") {
      return Err(self.error(Shape, "OFFSET is not supported"));
    }

    self.eat(&Tok::Semicolon);
    if self.peek().is_some() {
      return Err(self.error(Shape, "unexpected input after the statement"));
    }

    Ok(Select { distinct, projection, from, join, filter, order_by, limit })
  }

  // ── Projection ──────────────────────────────────────────────────────────

  fn projection(&mut self) -> Result<Projection> {
    if self.at_keyword("COUNT") && self.peek_nth(1) == Some(&Tok::LParen) {
      self.pos += 2;
      let (distinct, column) = if self.eat(&Tok::Star) {
        (false, None)
      } else {
        let distinct = self.eat_keyword("DISTINCT");
        (distinct, Some(self.column(Shape)?))
      };
      self.expect(&Tok::RParen, Shape, "`)` after the COUNT argument")?;
      self.alias()?;

      if self.peek() == Some(&Tok::Comma) {
        return Err(
          self.error(Shape, "COUNT cannot be combined with other select items"),
        );
      }
      return Ok(Projection::Count { distinct, column });
    }

    let mut items = vec![self.select_item()?];
    while self.eat(&Tok::Comma) {
      items.push(self.select_item()?);
    }
    Ok(Projection::Items(items))
  }

  fn select_item(&mut self) -> Result<SelectItem> {
    if self.eat(&Tok::Star) {
      return Ok(SelectItem::Wildcard(None));
    }

    if let (Some(Tok::Word(q) | Tok::Quoted(q)), Some(Tok::Dot), Some(Tok::Star)) =
      (self.peek(), self.peek_nth(1), self.peek_nth(2))
    {
      self.pos += 3;
      return Ok(SelectItem::Wildcard(Some(q.clone())));
    }

    if matches!(self.peek(), Some(Tok::Word(_)))
      && self.peek_nth(1) == Some(&Tok::LParen)
    {
      return Err(self.error(
        Shape,
        "only COUNT is supported as a function in the select list",
      ));
    }

    let column = self.column(Shape)?;
    self.alias()?;
    Ok(SelectItem::Column(column))
  }

  /// `[AS] alias`, if present.
  fn alias(&mut self) -> Result<Option<String>> {
    let explicit = self.eat_keyword("AS");
    match self.peek() {
      Some(Tok::Word(a)) if !is_reserved(a) => {
        self.pos += 1;
        Ok(Some(a.clone()))
      }
      Some(Tok::Quoted(a)) => {
        self.pos += 1;
        Ok(Some(a.clone()))
      }
      _ if explicit => Err(self.error(Shape, "expected an alias after AS")),
      _ => Ok(None),
    }
  }

  // ── FROM / JOIN ─────────────────────────────────────────────────────────

  fn table_ref(&mut self) -> Result<TableRef> {
    let mut name = match self.peek() {
      Some(Tok::Word(w)) if !is_reserved(w) => w.clone(),
      Some(Tok::Quoted(w)) => w.clone(),
      Some(Tok::LParen) => {
        return Err(self.error(Shape, "sub-queries are not supported"));
      }
      _ => return Err(self.error(Shape, "expected a table name")),
    };
    self.pos += 1;

    // Tolerate the default `public.` schema prefix.
    if name.eq_ignore_ascii_case("public")
      && self.peek() == Some(&Tok::Dot)
      && let Some(Tok::Word(w) | Tok::Quoted(w)) = self.peek_nth(1)
    {
      name = w.clone();
      self.pos += 2;
    }

    let alias = self.alias()?;
    Ok(TableRef { name, alias })
  }

  fn join(&mut self) -> Result<Option<Join>> {
    for keyword in ["LEFT", "RIGHT", "FULL", "CROSS", "NATURAL", "OUTER"] {
      if self.at_keyword(keyword) {
        return Err(self.error(Shape, "only inner joins are supported"));
      }
    }
    if self.peek() == Some(&Tok::Comma) {
      return Err(self.error(Shape, "comma joins are not supported"));
    }

    let inner = self.eat_keyword("INNER");
    if !self.eat_keyword("JOIN") {
      if inner {
        return Err(self.error(Shape, "expected JOIN after INNER"));
      }
      return Ok(None);
    }

    let table = self.table_ref()?;
    self.expect_keyword("ON", Shape)?;
    let left = self.column(Shape)?;
    self.expect(&Tok::Eq, Shape, "`=` in the join condition")?;
    let right = self.column(Shape)?;

    if self.at_keyword("AND") || self.at_keyword("OR") {
      return Err(self.error(
        Shape,
        "join conditions other than a single key equality are not supported",
      ));
    }
    if self.at_keyword("JOIN") || self.at_keyword("INNER") {
      return Err(self.error(Shape, "only one join is supported"));
    }

    Ok(Some(Join { table, on: (left, right) }))
  }

  // ── Columns ─────────────────────────────────────────────────────────────

  fn identifier(&mut self, ctx: Ctx) -> Result<String> {
    match self.peek() {
      Some(Tok::Word(w)) if !is_reserved(w) => {
        self.pos += 1;
        Ok(w.clone())
      }
      Some(Tok::Quoted(w)) => {
        self.pos += 1;
        Ok(w.clone())
      }
      _ => Err(self.error(ctx, "expected a column name")),
    }
  }

  fn column(&mut self, ctx: Ctx) -> Result<ColumnRef> {
    let first = self.identifier(ctx)?;
    if self.eat(&Tok::Dot) {
      let name = self.identifier(ctx)?;
      return Ok(ColumnRef { qualifier: Some(first), name });
    }
    Ok(ColumnRef { qualifier: None, name: first })
  }

  // ── WHERE ───────────────────────────────────────────────────────────────

  fn ends_filter(&self) -> bool {
    match self.peek() {
      None | Some(Tok::Semicolon) => true,
      Some(Tok::Word(w)) => {
        FILTER_TERMINATORS.iter().any(|k| k.eq_ignore_ascii_case(w))
      }
      _ => false,
    }
  }

  fn conjunction(&mut self) -> Result<Vec<Condition>> {
    let mut conditions = vec![self.condition()?];
    loop {
      if self.eat_keyword("AND") {
        conditions.push(self.condition()?);
      } else if self.at_keyword("OR") {
        return Err(self.error(
          InFilter,
          "OR is not supported; conditions may only be combined with AND",
        ));
      } else if self.ends_filter() {
        return Ok(conditions);
      } else {
        return Err(self.error(InFilter, "unrecognised filter fragment"));
      }
    }
  }

  fn condition(&mut self) -> Result<Condition> {
    match self.peek() {
      Some(Tok::LParen) => {
        Err(self.error(InFilter, "parenthesized grouping is not supported"))
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("NOT") => {
        Err(self.error(InFilter, "NOT is not supported"))
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("EXISTS") => {
        Err(self.error(InFilter, "sub-queries are not supported"))
      }
      Some(Tok::Str(_)) => self.any_equals(),
      Some(Tok::Word(w))
        if (w.eq_ignore_ascii_case("EXTRACT")
          || w.eq_ignore_ascii_case("DATE_PART"))
          && self.peek_nth(1) == Some(&Tok::LParen) =>
      {
        self.year_equals()
      }
      Some(Tok::Word(_)) if self.peek_nth(1) == Some(&Tok::LParen) => {
        Err(self.error(InFilter, "unsupported function call"))
      }
      Some(Tok::Word(_) | Tok::Quoted(_)) => self.column_condition(),
      _ => Err(self.error(InFilter, "unrecognised filter fragment")),
    }
  }

  /// `column <op> literal`, `column ILIKE 'pattern'`, `column @> ARRAY[...]`.
  fn column_condition(&mut self) -> Result<Condition> {
    let column = self.column(InFilter)?;

    let op = match self.peek() {
      Some(Tok::Eq) => Comparison::Eq,
      Some(Tok::Lt) => Comparison::Lt,
      Some(Tok::Lte) => Comparison::Lte,
      Some(Tok::Gt) => Comparison::Gt,
      Some(Tok::Gte) => Comparison::Gte,
      Some(Tok::NotEq) => {
        return Err(self.error(InFilter, "inequality (<>, !=) is not supported"));
      }
      Some(Tok::ArrayContains) => {
        self.pos += 1;
        return self.array_contains(column);
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("ILIKE") => {
        self.pos += 1;
        let Some(Tok::Str(pattern)) = self.peek() else {
          return Err(self.error(InFilter, "ILIKE expects a quoted pattern"));
        };
        self.pos += 1;
        return Ok(Condition::ILike { column, pattern: pattern.clone() });
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("LIKE") => {
        return Err(self.error(
          InFilter,
          "case-sensitive LIKE is not supported; use ILIKE",
        ));
      }
      Some(Tok::Word(w)) => {
        return Err(
          self.error(InFilter, &format!("{} is not supported", w.to_uppercase())),
        );
      }
      _ => return Err(self.error(InFilter, "expected a comparison operator")),
    };
    self.pos += 1;

    let value = self.literal()?;
    Ok(Condition::Compare { column, op, value })
  }

  fn literal(&mut self) -> Result<Literal> {
    let literal = match self.peek() {
      Some(Tok::Str(s)) => Literal::Str(s.clone()),
      Some(Tok::Number(n)) => Literal::Number(n.clone()),
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("TRUE") => Literal::Bool(true),
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("FALSE") => {
        Literal::Bool(false)
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("NULL") => {
        return Err(self.error(InFilter, "NULL comparisons are not supported"));
      }
      Some(Tok::Word(w))
        if w.eq_ignore_ascii_case("ANY") || w.eq_ignore_ascii_case("ALL") =>
      {
        return Err(self.error(
          InFilter,
          "comparison against ANY/ALL of a list is not supported",
        ));
      }
      _ => {
        return Err(self.error(InFilter, "expected a literal value"));
      }
    };
    self.pos += 1;

    if self.peek() == Some(&Tok::Cast) {
      return Err(self.error(InFilter, "casts are not supported"));
    }
    Ok(literal)
  }

  /// `ARRAY['a', 'b'] [::text[]]`, after the `@>`.
  fn array_contains(&mut self, column: ColumnRef) -> Result<Condition> {
    self.expect_keyword("ARRAY", InFilter)?;
    self.expect(&Tok::LBracket, InFilter, "`[` after ARRAY")?;

    let mut values = Vec::new();
    loop {
      let Some(Tok::Str(value)) = self.peek() else {
        return Err(
          self.error(InFilter, "ARRAY elements must be quoted string literals"),
        );
      };
      values.push(value.clone());
      self.pos += 1;
      if !self.eat(&Tok::Comma) {
        break;
      }
    }
    self.expect(&Tok::RBracket, InFilter, "`]` closing ARRAY")?;

    if self.eat(&Tok::Cast) {
      if !matches!(self.peek(), Some(Tok::Word(_))) {
        return Err(self.error(InFilter, "expected an array type after `::`"));
      }
      self.pos += 1;
      self.expect(&Tok::LBracket, InFilter, "`[]` array type")?;
      self.expect(&Tok::RBracket, InFilter, "`[]` array type")?;
    }

    Ok(Condition::ArrayContains { column, values })
  }

  /// `'value' = ANY(column)`
  fn any_equals(&mut self) -> Result<Condition> {
    let Some(Tok::Str(value)) = self.peek() else {
      return Err(self.error(InFilter, "expected a string literal"));
    };
    self.pos += 1;
    self.expect(&Tok::Eq, InFilter, "`= ANY(column)` after a string literal")?;
    self.expect_keyword("ANY", InFilter)?;
    self.expect(&Tok::LParen, InFilter, "`(` after ANY")?;
    let column = self.column(InFilter)?;
    self.expect(&Tok::RParen, InFilter, "`)` closing ANY")?;
    Ok(Condition::AnyEquals { column, value: value.clone() })
  }

  // ── Year extraction ─────────────────────────────────────────────────────

  fn year_equals(&mut self) -> Result<Condition> {
    let lhs = self.year_term()?;
    self.expect(&Tok::Eq, InFilter, "`=` between year expressions")?;
    let rhs = self.year_term()?;

    match (lhs, rhs) {
      (YearTerm::Of(column), YearTerm::Current)
      | (YearTerm::Current, YearTerm::Of(column)) => {
        Ok(Condition::YearEquals { column, year: YearValue::Current })
      }
      (YearTerm::Of(column), YearTerm::Literal(y))
      | (YearTerm::Literal(y), YearTerm::Of(column)) => {
        Ok(Condition::YearEquals { column, year: YearValue::Literal(y) })
      }
      _ => Err(self.error(
        InFilter,
        "a year comparison must relate one column to the current year or a literal year",
      )),
    }
  }

  fn year_term(&mut self) -> Result<YearTerm> {
    match self.peek() {
      Some(Tok::Number(n)) => {
        let year = n
          .parse::<i32>()
          .map_err(|_| self.error(InFilter, "expected a four-digit year"))?;
        self.pos += 1;
        Ok(YearTerm::Literal(year))
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("EXTRACT") => {
        self.pos += 1;
        self.expect(&Tok::LParen, InFilter, "`(` after EXTRACT")?;
        self.expect_keyword("YEAR", InFilter)?;
        self.expect_keyword("FROM", InFilter)?;
        let term = self.year_source()?;
        self.expect(&Tok::RParen, InFilter, "`)` closing EXTRACT")?;
        Ok(term)
      }
      Some(Tok::Word(w)) if w.eq_ignore_ascii_case("DATE_PART") => {
        self.pos += 1;
        self.expect(&Tok::LParen, InFilter, "`(` after DATE_PART")?;
        match self.peek() {
          Some(Tok::Str(part)) if part.eq_ignore_ascii_case("year") => {
            self.pos += 1;
          }
          _ => {
            return Err(self.error(InFilter, "only DATE_PART('year', ...) is supported"));
          }
        }
        self.expect(&Tok::Comma, InFilter, "`,` in DATE_PART")?;
        let term = self.year_source()?;
        self.expect(&Tok::RParen, InFilter, "`)` closing DATE_PART")?;
        Ok(term)
      }
      _ => Err(self.error(
        InFilter,
        "expected EXTRACT(YEAR FROM ...), DATE_PART('year', ...) or a year",
      )),
    }
  }

  /// The argument of a year function: a column, `CURRENT_DATE`, or `NOW()`.
  fn year_source(&mut self) -> Result<YearTerm> {
    if self.eat_keyword("CURRENT_DATE") || self.eat_keyword("CURRENT_TIMESTAMP") {
      return Ok(YearTerm::Current);
    }
    if self.at_keyword("NOW")
      && self.peek_nth(1) == Some(&Tok::LParen)
      && self.peek_nth(2) == Some(&Tok::RParen)
    {
      self.pos += 3;
      return Ok(YearTerm::Current);
    }
    Ok(YearTerm::Of(self.column(InFilter)?))
  }

  // ── ORDER BY / LIMIT ────────────────────────────────────────────────────

  fn order_by(&mut self) -> Result<Option<OrderItem>> {
    if !self.eat_keyword("ORDER") {
      return Ok(None);
    }
    self.expect_keyword("BY", Shape)?;
    let column = self.column(Shape)?;
    let ascending = if self.eat_keyword("DESC") {
      false
    } else {
      self.eat_keyword("ASC");
      true
    };

    if self.at_keyword("NULLS") {
      return Err(self.error(Shape, "NULLS FIRST/LAST is not supported"));
    }
    if self.peek() == Some(&Tok::Comma) {
      return Err(self.error(Shape, "only one ORDER BY key is supported"));
    }
    Ok(Some(OrderItem { column, ascending }))
  }

  fn limit(&mut self) -> Result<Option<usize>> {
    if !self.eat_keyword("LIMIT") {
      return Ok(None);
    }
    if self.eat_keyword("ALL") {
      return Ok(None);
    }
    let Some(Tok::Number(n)) = self.peek() else {
      return Err(self.error(Shape, "LIMIT must be a non-negative integer"));
    };
    let limit = n
      .parse::<usize>()
      .map_err(|_| self.error(Shape, "LIMIT must be a non-negative integer"))?;
    self.pos += 1;
    Ok(Some(limit))
  }
}
