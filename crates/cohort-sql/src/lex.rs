//! Tokenizer for the supported SELECT subset.
//!
//! Keywords are not distinguished from identifiers here; the parser compares
//! [`Tok::Word`] text case-insensitively. Characters with no meaning in the
//! grammar become [`Tok::Other`] so the parser can reject them with context.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
  /// Unquoted identifier or keyword.
  Word(String),
  /// `"double-quoted"` identifier.
  Quoted(String),
  /// `'single-quoted'` string literal, with `''` unescaped.
  Str(String),
  /// Numeric literal as written, including a leading `-`.
  Number(String),
  Comma,
  Dot,
  LParen,
  RParen,
  LBracket,
  RBracket,
  Star,
  Semicolon,
  Eq,
  NotEq,
  Lt,
  Lte,
  Gt,
  Gte,
  /// `@>`
  ArrayContains,
  /// `::`
  Cast,
  Other(char),
}

impl Tok {
  /// Short human-readable form for error messages.
  pub(crate) fn describe(&self) -> String {
    match self {
      Self::Word(w) => w.clone(),
      Self::Quoted(q) => format!("\"{q}\""),
      Self::Str(s) => format!("'{s}'"),
      Self::Number(n) => n.clone(),
      Self::Comma => ",".into(),
      Self::Dot => ".".into(),
      Self::LParen => "(".into(),
      Self::RParen => ")".into(),
      Self::LBracket => "[".into(),
      Self::RBracket => "]".into(),
      Self::Star => "*".into(),
      Self::Semicolon => ";".into(),
      Self::Eq => "=".into(),
      Self::NotEq => "<>".into(),
      Self::Lt => "<".into(),
      Self::Lte => "<=".into(),
      Self::Gt => ">".into(),
      Self::Gte => ">=".into(),
      Self::ArrayContains => "@>".into(),
      Self::Cast => "::".into(),
      Self::Other(c) => c.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
  pub tok:    Tok,
  /// Byte offset into the candidate text.
  pub offset: usize,
}

fn shape(msg: String) -> Error { Error::UnsupportedQueryShape(msg) }

/// Split `input` into tokens, skipping whitespace and comments.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
  let chars: Vec<(usize, char)> = input.char_indices().collect();
  let mut tokens = Vec::new();
  let mut i = 0usize;

  let peek = |i: usize| chars.get(i).map(|&(_, c)| c);

  while i < chars.len() {
    let (offset, c) = chars[i];

    if c.is_whitespace() {
      i += 1;
      continue;
    }

    // -- line comment
    if c == '-' && peek(i + 1) == Some('-') {
      while i < chars.len() && chars[i].1 != '\n' {
        i += 1;
      }
      continue;
    }

    // /* block comment */
    if c == '/' && peek(i + 1) == Some('*') {
      i += 2;
      loop {
        match (peek(i), peek(i + 1)) {
          (Some('*'), Some('/')) => {
            i += 2;
            break;
          }
          (Some(_), _) => i += 1,
          (None, _) => {
            return Err(shape(format!("unterminated comment at byte {offset}")));
          }
        }
      }
      continue;
    }

    if c.is_ascii_alphabetic() || c == '_' {
      let start = i;
      while let Some(c) = peek(i)
        && (c.is_ascii_alphanumeric() || c == '_' || c == '$')
      {
        i += 1;
      }
      let word: String = chars[start..i].iter().map(|&(_, c)| c).collect();
      tokens.push(Token { tok: Tok::Word(word), offset });
      continue;
    }

    let negative = c == '-' && peek(i + 1).is_some_and(|n| n.is_ascii_digit());
    if c.is_ascii_digit() || negative {
      let start = i;
      i += 1;
      let mut seen_dot = false;
      while let Some(c) = peek(i) {
        if c.is_ascii_digit() {
          i += 1;
        } else if c == '.'
          && !seen_dot
          && peek(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
          seen_dot = true;
          i += 1;
        } else {
          break;
        }
      }
      let number: String = chars[start..i].iter().map(|&(_, c)| c).collect();
      tokens.push(Token { tok: Tok::Number(number), offset });
      continue;
    }

    if c == '\'' || c == '"' {
      let quote = c;
      let mut text = String::new();
      i += 1;
      loop {
        match peek(i) {
          Some(q) if q == quote && peek(i + 1) == Some(quote) => {
            text.push(quote);
            i += 2;
          }
          Some(q) if q == quote => {
            i += 1;
            break;
          }
          Some(other) => {
            text.push(other);
            i += 1;
          }
          None => {
            let what = if quote == '\'' { "string literal" } else { "identifier" };
            return Err(shape(format!("unterminated {what} at byte {offset}")));
          }
        }
      }
      let tok = if quote == '\'' { Tok::Str(text) } else { Tok::Quoted(text) };
      tokens.push(Token { tok, offset });
      continue;
    }

    let (tok, width) = match (c, peek(i + 1)) {
      ('<', Some('=')) => (Tok::Lte, 2),
      ('<', Some('>')) => (Tok::NotEq, 2),
      ('!', Some('=')) => (Tok::NotEq, 2),
      ('>', Some('=')) => (Tok::Gte, 2),
      ('@', Some('>')) => (Tok::ArrayContains, 2),
      (':', Some(':')) => (Tok::Cast, 2),
      ('<', _) => (Tok::Lt, 1),
      ('>', _) => (Tok::Gt, 1),
      ('=', _) => (Tok::Eq, 1),
      (',', _) => (Tok::Comma, 1),
      ('.', _) => (Tok::Dot, 1),
      ('(', _) => (Tok::LParen, 1),
      (')', _) => (Tok::RParen, 1),
      ('[', _) => (Tok::LBracket, 1),
      (']', _) => (Tok::RBracket, 1),
      ('*', _) => (Tok::Star, 1),
      (';', _) => (Tok::Semicolon, 1),
      (other, _) => (Tok::Other(other), 1),
    };
    tokens.push(Token { tok, offset });
    i += width;
  }

  Ok(tokens)
}
