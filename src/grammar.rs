use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::parse_grammar::parse_productions;
use crate::rules::{Production, Rhs, SymbolKind};
use crate::Err;

const NO_PRODUCTIONS: &[Production] = &[];
const NO_SYMBOLS: &[String] = &[];

/// An indexed, immutable PCFG.
///
/// Holds three indices over the productions: by left-hand side (in file order, which is
/// also the order the generator picks alternatives from), by right-hand side pair, and
/// by terminal word. Every symbol stored as a value in the last two is a key in the first.
#[derive(Debug, Clone)]
pub struct Grammar {
  /// Left-hand side of the first production
  pub start: String,
  productions: Vec<Production>,
  by_lhs: HashMap<String, Vec<Production>>,
  /// first -> second -> lhs, so a pair lookup doesn't need to build an "A B" key
  by_pair: HashMap<String, HashMap<String, Vec<String>>>,
  by_word: HashMap<String, Vec<String>>,
}

/// Pushes `value` onto the set-like vec unless it's already there. Keeps first-seen order
/// so chart entries come out in grammar order.
fn insert_unique(v: &mut Vec<String>, value: &str) {
  if !v.iter().any(|x| x == value) {
    v.push(value.to_string());
  }
}

impl Grammar {
  /// Builds the indices. Assumes the first production's lhs is the start symbol.
  /// Panics on an empty production list; use `FromStr` to get an error instead.
  pub fn new(productions: Vec<Production>) -> Self {
    assert!(!productions.is_empty(), "grammar needs at least one production");
    let start = productions[0].lhs.clone();

    let mut by_lhs: HashMap<String, Vec<Production>> = HashMap::new();
    let mut by_pair: HashMap<String, HashMap<String, Vec<String>>> = HashMap::new();
    let mut by_word: HashMap<String, Vec<String>> = HashMap::new();

    for p in productions.iter() {
      by_lhs.entry(p.lhs.clone()).or_default().push(p.clone());

      match &p.rhs {
        Rhs::Word(w) => insert_unique(by_word.entry(w.clone()).or_default(), &p.lhs),
        Rhs::Pair(a, b) => insert_unique(
          by_pair
            .entry(a.clone())
            .or_default()
            .entry(b.clone())
            .or_default(),
          &p.lhs,
        ),
      }
    }

    debug!(
      productions = productions.len(),
      nonterminals = by_lhs.len(),
      words = by_word.len(),
      "indexed grammar"
    );

    Self {
      start,
      productions,
      by_lhs,
      by_pair,
      by_word,
    }
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, Err> {
    let src = fs::read_to_string(path.as_ref())
      .map_err(|e| format!("couldn't read {}: {}", path.as_ref().display(), e))?;
    Ok(src.parse()?)
  }

  /// All productions in file order
  pub fn productions(&self) -> &[Production] {
    &self.productions
  }

  pub fn len(&self) -> usize {
    self.productions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Every symbol that appears as a left-hand side, in no particular order
  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.by_lhs.keys().map(String::as_str)
  }

  /// All alternatives for `symbol`, in file order. Empty if `symbol` is a terminal.
  pub fn productions_for(&self, symbol: &str) -> &[Production] {
    self
      .by_lhs
      .get(symbol)
      .map(Vec::as_slice)
      .unwrap_or(NO_PRODUCTIONS)
  }

  /// Left-hand sides of binary rules whose right-hand side is exactly `first second`
  pub fn lhs_for_pair(&self, first: &str, second: &str) -> &[String] {
    self
      .by_pair
      .get(first)
      .and_then(|seconds| seconds.get(second))
      .map(Vec::as_slice)
      .unwrap_or(NO_SYMBOLS)
  }

  /// Same as `lhs_for_pair`, keyed by the space-joined pair `"A B"`
  pub fn lhs_for(&self, pair: &str) -> &[String] {
    match pair.split_once(' ') {
      Some((first, second)) => self.lhs_for_pair(first, second),
      None => NO_SYMBOLS,
    }
  }

  /// Left-hand sides of preterminal rules that produce `word`
  pub fn preterminals_for(&self, word: &str) -> &[String] {
    self
      .by_word
      .get(word)
      .map(Vec::as_slice)
      .unwrap_or(NO_SYMBOLS)
  }

  pub fn symbol_kind(&self, symbol: &str) -> SymbolKind {
    if self.by_lhs.contains_key(symbol) {
      SymbolKind::Nonterminal
    } else {
      SymbolKind::Terminal
    }
  }

  pub fn is_nonterminal(&self, symbol: &str) -> bool {
    self.symbol_kind(symbol) == SymbolKind::Nonterminal
  }

  /// Checks the rule shapes that lookups otherwise tolerate silently: both symbols
  /// of a binary rule must have productions, and a preterminal's word must not.
  pub fn validate(&self) -> Result<(), ClosureError> {
    let mut problems = Vec::new();

    for p in self.productions.iter() {
      match &p.rhs {
        Rhs::Pair(a, b) => {
          for symbol in [a, b] {
            if !self.is_nonterminal(symbol) {
              problems.push(ClosureProblem::Undefined {
                lhs: p.lhs.clone(),
                symbol: symbol.clone(),
              });
            }
          }
        }
        Rhs::Word(w) => {
          if self.is_nonterminal(w) {
            problems.push(ClosureProblem::UnaryChain {
              lhs: p.lhs.clone(),
              symbol: w.clone(),
            });
          }
        }
      }
    }

    if problems.is_empty() {
      Ok(())
    } else {
      Err(ClosureError { problems })
    }
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "# start: {}", self.start)?;
    for p in self.productions.iter() {
      writeln!(f, "{}", p)?;
    }
    Ok(())
  }
}

impl FromStr for Grammar {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self::new(parse_productions(s)?))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClosureProblem {
  /// A binary rule mentions a symbol that has no productions
  Undefined { lhs: String, symbol: String },
  /// A one-symbol rule rewrites to a nonterminal
  UnaryChain { lhs: String, symbol: String },
}

impl fmt::Display for ClosureProblem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Undefined { lhs, symbol } => {
        write!(f, "{} uses {}, which has no productions", lhs, symbol)
      }
      Self::UnaryChain { lhs, symbol } => {
        write!(f, "{} -> {} is a unary nonterminal rule", lhs, symbol)
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureError {
  pub problems: Vec<ClosureProblem>,
}

impl fmt::Display for ClosureError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "malformed grammar:")?;
    for p in self.problems.iter() {
      write!(f, "\n  {}", p)?;
    }
    Ok(())
  }
}

impl std::error::Error for ClosureError {}
