#[macro_use]
extern crate lazy_static;

pub mod cyk;
pub mod forest;
pub mod generator;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod syntree;
pub mod utils;

pub use crate::cyk::{parse_chart, Chart};
pub use crate::forest::{NoParse, ParseTree};
pub use crate::generator::{generate, GenerateError, Generator, Sampling};
pub use crate::grammar::{ClosureError, Grammar};
pub use crate::parse_grammar::GrammarError;
pub use crate::rules::{Production, Rhs, SymbolKind};
pub use crate::utils::Err;

impl Grammar {
  pub fn parse_chart<'a>(&'a self, input: &[&'a str]) -> Chart<'a> {
    parse_chart(self, input)
  }

  /// Parses `input` and renders its first derivation bracketed
  pub fn parse(&self, input: &[&str]) -> Result<String, NoParse> {
    self.parse_chart(input).render_one_parse()
  }

  /// Every derivation of `input` rooted at the start symbol
  pub fn parse_trees(&self, input: &[&str]) -> Vec<ParseTree> {
    self.parse_chart(input).trees_for(&self.start)
  }

  pub fn generator(&self) -> Generator<'_> {
    Generator::new(self)
  }
}

#[cfg(test)]
mod tests {
  use crate::Grammar;

  macro_rules! data_file {
    ($filename:expr) => {
      ($filename, include_str!(concat!("../data/", $filename)))
    };
  }

  #[test]
  fn smoke_test_data() {
    let files = [data_file!("toy.gr")];

    for (filename, src) in files {
      let g = src.parse::<Grammar>();
      assert!(g.is_ok(), "failed to parse {filename}");
      assert!(g.unwrap().validate().is_ok(), "{filename} isn't closed");
    }
  }

  #[test]
  fn test_parse_and_generate_agree() {
    let g: Grammar = "
      1.0 ROOT NP VP
      1.0 NP   cat
      1.0 VP   sat
    "
    .parse()
    .unwrap();

    let generated = crate::generate(&g, "ROOT", 1).unwrap();
    assert_eq!(generated, vec!["(ROOT (NP cat) (VP sat))"]);
    assert_eq!(g.parse(&["cat", "sat"]), Ok(generated[0].clone()));
    assert_eq!(g.parse(&["dog", "sat"]), Err(crate::NoParse));
    assert_eq!(g.parse_trees(&["cat", "sat"]).len(), 1);
  }

  #[test]
  fn test_case_is_significant() {
    let g: Grammar = include_str!("../data/toy.gr").parse().unwrap();
    assert!(g.parse(&["the", "president", "ate", "a", "pickle"]).is_ok());
    assert!(g.parse(&["The", "president", "ate", "a", "pickle"]).is_err());
  }
}
