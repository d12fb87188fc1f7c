use regex::Regex;
use std::error::Error;

use crate::grammar::Grammar;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// A line of raw input split into parser-ready words
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens {
  pub words: Vec<String>,
  /// Sentence-final punctuation (`.`, `!` or `?`), if the line ended with one
  pub end: Option<String>,
}

impl Tokens {
  pub fn as_strs(&self) -> Vec<&str> {
    self.words.iter().map(String::as_str).collect()
  }

  /// Drops words that `g` rewrites. A nonterminal name typed into the input would otherwise
  /// be looked up as a word, find no preterminal, and sink the whole parse.
  pub fn without_nonterminals(mut self, g: &Grammar) -> Self {
    self.words.retain(|w| !g.is_nonterminal(w));
    self
  }
}

/// Splits a line on whitespace and strips everything that isn't an ASCII letter from each
/// word, dropping words that end up empty. Case is left alone. The grammar can't see
/// punctuation, so a trailing `.`, `!` or `?` is handed back separately.
///
/// ```
/// let tokens = pcfg_cyk::utils::tokenize("The president, it seems, ate a sandwich!");
/// assert_eq!(tokens.words, vec!["The", "president", "it", "seems", "ate", "a", "sandwich"]);
/// assert_eq!(tokens.end.as_deref(), Some("!"));
/// ```
pub fn tokenize(line: &str) -> Tokens {
  lazy_static! {
    static ref END: Regex = Regex::new(r"([.!?])\s*$").unwrap();
    static ref NON_LETTER: Regex = Regex::new(r"[^a-zA-Z]").unwrap();
  }

  let end = END.captures(line).map(|caps| caps[1].to_string());
  let words = line
    .split_whitespace()
    .map(|w| NON_LETTER.replace_all(w, "").into_owned())
    .filter(|w| !w.is_empty())
    .collect();

  Tokens { words, end }
}

#[test]
fn test_tokenize() {
  assert_eq!(
    tokenize("  the sandwich ate a staff . "),
    Tokens {
      words: vec!["the", "sandwich", "ate", "a", "staff"]
        .into_iter()
        .map(String::from)
        .collect(),
      end: Some(".".to_string()),
    }
  );

  let tokens = tokenize("Sally's pickle");
  assert_eq!(tokens.as_strs(), vec!["Sallys", "pickle"]);
  assert_eq!(tokens.end, None);

  assert_eq!(
    tokenize("?!"),
    Tokens {
      words: Vec::new(),
      end: Some("!".to_string())
    }
  );
  assert_eq!(tokenize(""), Tokens::default());
}

#[test]
fn test_without_nonterminals() {
  let g: Grammar = "
    1.0 S    NP Verb
    1.0 NP   cats
    1.0 Verb sleep
  "
  .parse()
  .unwrap();

  let tokens = tokenize("cats NP sleep Verb.").without_nonterminals(&g);
  assert_eq!(tokens.as_strs(), vec!["cats", "sleep"]);
  assert_eq!(tokens.end.as_deref(), Some("."));
  assert_eq!(g.parse(&tokens.as_strs()).unwrap(), "(S (NP cats) (Verb sleep))");

  // case matters, so "np" is an ordinary word
  let tokens = tokenize("np cats").without_nonterminals(&g);
  assert_eq!(tokens.as_strs(), vec!["np", "cats"]);
}
