use std::fmt;

/// Whether a symbol is rewritten by the grammar. This is never stored on the symbol itself:
/// a symbol is a nonterminal exactly when some production has it as its left-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
  Terminal,
  Nonterminal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
  /// Preterminal rule: rewrites directly to a single word
  Word(String),
  /// Binary rule: rewrites to two (nominally nonterminal) symbols
  Pair(String, String),
}

impl Rhs {
  pub fn first(&self) -> &str {
    match self {
      Self::Word(w) => w,
      Self::Pair(a, _) => a,
    }
  }

  pub fn second(&self) -> Option<&str> {
    match self {
      Self::Word(_) => None,
      Self::Pair(_, b) => Some(b),
    }
  }

  pub fn is_word(&self) -> bool {
    matches!(self, Self::Word(_))
  }

  pub fn is_pair(&self) -> bool {
    matches!(self, Self::Pair(_, _))
  }
}

impl fmt::Display for Rhs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Word(w) => write!(f, "{}", w),
      Self::Pair(a, b) => write!(f, "{} {}", a, b),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
  pub lhs: String,
  pub rhs: Rhs,
  /// In (0, 1]. Alternatives of one lhs are not required to sum to 1.
  pub prob: f64,
}

impl Production {
  pub fn new(lhs: impl Into<String>, rhs: Rhs, prob: f64) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
      prob,
    }
  }

  pub fn word(lhs: impl Into<String>, word: impl Into<String>, prob: f64) -> Self {
    Self::new(lhs, Rhs::Word(word.into()), prob)
  }

  pub fn pair(
    lhs: impl Into<String>,
    first: impl Into<String>,
    second: impl Into<String>,
    prob: f64,
  ) -> Self {
    Self::new(lhs, Rhs::Pair(first.into(), second.into()), prob)
  }

  pub fn is_preterminal(&self) -> bool {
    self.rhs.is_word()
  }
}

/// Prints the production back in grammar-file form: `prob LHS RHS1 [RHS2]`
impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}\t{}\t{}", self.prob, self.lhs, self.rhs)
  }
}

#[test]
fn test_production_display() {
  assert_eq!(
    Production::pair("ROOT", "NP", "VP", 1.0).to_string(),
    "1\tROOT\tNP VP"
  );
  assert_eq!(
    Production::word("Noun", "cat", 0.25).to_string(),
    "0.25\tNoun\tcat"
  );
}

#[test]
fn test_rhs_accessors() {
  let pair = Rhs::Pair("NP".to_string(), "VP".to_string());
  assert_eq!(pair.first(), "NP");
  assert_eq!(pair.second(), Some("VP"));
  assert!(pair.is_pair());

  let word = Rhs::Word("cat".to_string());
  assert_eq!(word.first(), "cat");
  assert_eq!(word.second(), None);
  assert!(word.is_word());
}
