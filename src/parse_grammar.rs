//! Line-oriented parsing of grammar files
//!
//! Every non-blank line holds one production, `probability LHS RHS1 [RHS2]`,
//! with whitespace between fields. `#` starts a comment that runs to the end of the line.

use regex::Regex;
use std::fmt;

use crate::rules::{Production, Rhs};

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarErrorKind {
  /// The first field isn't a number
  BadProbability(String),
  /// A number, but not in (0, 1]
  ProbabilityOutOfRange(f64),
  /// Number of right-hand side symbols, when it isn't 1 or 2
  WrongArity(usize),
  /// A symbol containing characters that would break bracketed output
  BadSymbol(String),
  /// No productions at all
  EmptyGrammar,
}

impl fmt::Display for GrammarErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadProbability(s) => write!(f, "couldn't read probability {:?}", s),
      Self::ProbabilityOutOfRange(p) => write!(f, "probability {} is not in (0, 1]", p),
      Self::WrongArity(n) => write!(
        f,
        "expected 1 or 2 right-hand side symbols, found {}",
        n
      ),
      Self::BadSymbol(s) => write!(f, "symbol {:?} may not contain brackets", s),
      Self::EmptyGrammar => write!(f, "grammar has no productions"),
    }
  }
}

/// A grammar line that couldn't be turned into a production
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError {
  /// 1-based, or 0 when the error isn't tied to a line
  pub line: usize,
  pub text: String,
  pub kind: GrammarErrorKind,
}

impl GrammarError {
  fn new(line: usize, text: &str, kind: GrammarErrorKind) -> Self {
    Self {
      line,
      text: text.trim().to_string(),
      kind,
    }
  }
}

impl fmt::Display for GrammarError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.line == 0 {
      write!(f, "{}", self.kind)
    } else {
      write!(f, "line {}: {}: `{}`", self.line, self.kind, self.text)
    }
  }
}

impl std::error::Error for GrammarError {}

fn strip_comment(line: &str) -> &str {
  regex_static!(COMMENT, r"#.*$");
  match COMMENT.find(line) {
    Some(m) => &line[..m.start()],
    None => line,
  }
}

fn parse_probability(field: &str) -> Result<f64, GrammarErrorKind> {
  regex_static!(PROBABILITY, r"^[+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?$");
  if !PROBABILITY.is_match(field) {
    return Err(GrammarErrorKind::BadProbability(field.to_string()));
  }

  let prob: f64 = field
    .parse()
    .map_err(|_| GrammarErrorKind::BadProbability(field.to_string()))?;

  if prob > 0.0 && prob <= 1.0 {
    Ok(prob)
  } else {
    Err(GrammarErrorKind::ProbabilityOutOfRange(prob))
  }
}

fn parse_symbol(field: &str) -> Result<String, GrammarErrorKind> {
  regex_static!(SYMBOL, r"^[^\s()]+$");
  if SYMBOL.is_match(field) {
    Ok(field.to_string())
  } else {
    Err(GrammarErrorKind::BadSymbol(field.to_string()))
  }
}

/// Parses one line. Ok(None) for blank and comment-only lines.
fn parse_line(line: &str) -> Result<Option<Production>, GrammarErrorKind> {
  let fields = strip_comment(line).split_whitespace().collect::<Vec<_>>();
  if fields.is_empty() {
    return Ok(None);
  }

  let prob = parse_probability(fields[0])?;
  if fields.len() < 3 || fields.len() > 4 {
    return Err(GrammarErrorKind::WrongArity(fields.len().saturating_sub(2)));
  }

  let lhs = parse_symbol(fields[1])?;
  let rhs = if fields.len() == 3 {
    Rhs::Word(parse_symbol(fields[2])?)
  } else {
    Rhs::Pair(parse_symbol(fields[2])?, parse_symbol(fields[3])?)
  };

  Ok(Some(Production { lhs, rhs, prob }))
}

/// Parses a whole grammar source into its productions, in file order.
/// Fails on the first malformed line, or if there are no productions.
pub fn parse_productions(s: &str) -> Result<Vec<Production>, GrammarError> {
  let mut productions = Vec::new();

  for (idx, line) in s.lines().enumerate() {
    match parse_line(line) {
      Ok(Some(production)) => productions.push(production),
      Ok(None) => {}
      Err(kind) => return Err(GrammarError::new(idx + 1, line, kind)),
    }
  }

  if productions.is_empty() {
    Err(GrammarError::new(0, "", GrammarErrorKind::EmptyGrammar))
  } else {
    Ok(productions)
  }
}
