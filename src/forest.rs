use std::fmt;

use crate::cyk::{Chart, Derivation, EntryRef};
use crate::syntree::{Constituent, SynTree, Word};

/// The sentence has no derivation: the chart's full-span cell is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoParse;

impl fmt::Display for NoParse {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "no parse")
  }
}

impl std::error::Error for NoParse {}

pub type ParseTree = SynTree<String, String>;

impl Chart<'_> {
  /// Rebuilds the tree rooted at `r` by walking backpointers.
  /// None if `r`, or anything it points at, isn't in this chart.
  pub fn tree_at(&self, r: EntryRef) -> Option<ParseTree> {
    let entry = self.get(r)?;
    let span = (r.start, r.end());

    let children = match &entry.derivation {
      Derivation::Word(w) => vec![SynTree::Leaf(Word {
        value: w.to_string(),
        span,
      })],
      Derivation::Split { first, second } => {
        vec![self.tree_at(*first)?, self.tree_at(*second)?]
      }
    };

    Some(SynTree::Branch(
      Constituent {
        value: entry.lhs.to_string(),
        span,
      },
      children,
    ))
  }

  /// The first derivation of the whole sentence, in insertion order. This is not
  /// necessarily the most probable one.
  pub fn first_tree(&self) -> Option<ParseTree> {
    self.tree_at(EntryRef::new(0, self.len(), 0))
  }

  /// Renders the first derivation of the whole sentence in bracketed form
  pub fn render_one_parse(&self) -> Result<String, NoParse> {
    self.first_tree().map(|t| t.to_string()).ok_or(NoParse)
  }

  /// Number of distinct derivations of the sentence. Every entry owns exactly one pair
  /// of children, so each top-cell entry is one tree.
  pub fn parse_count(&self) -> usize {
    self.top().map(|c| c.len()).unwrap_or(0)
  }

  /// Every derivation of the whole sentence, whatever its root symbol
  pub fn trees(&self) -> Vec<ParseTree> {
    self
      .refs(0, self.len())
      .filter_map(|r| self.tree_at(r))
      .collect()
  }

  /// Every derivation of the whole sentence rooted at `symbol`
  pub fn trees_for(&self, symbol: &str) -> Vec<ParseTree> {
    match self.top() {
      Some(top) => top
        .indices_of(symbol)
        .iter()
        .filter_map(|&idx| self.tree_at(EntryRef::new(0, self.len(), idx)))
        .collect(),
      None => Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::cyk::parse_chart;
  use crate::grammar::Grammar;

  use super::*;

  const CAT: &str = "
    1.0 ROOT NP VP
    1.0 NP   cat
    1.0 VP   sat
  ";

  #[test]
  fn test_render_one_parse() {
    let g: Grammar = CAT.parse().unwrap();

    let chart = parse_chart(&g, &["cat", "sat"]);
    assert_eq!(
      chart.render_one_parse(),
      Ok("(ROOT (NP cat) (VP sat))".to_string())
    );

    let chart = parse_chart(&g, &["dog", "sat"]);
    assert_eq!(chart.render_one_parse(), Err(NoParse));
    assert_eq!(chart.parse_count(), 0);
    assert!(chart.trees().is_empty());
  }

  #[test]
  fn test_empty_sentence_has_no_parse() {
    let g: Grammar = CAT.parse().unwrap();
    let chart = parse_chart(&g, &[]);
    assert_eq!(chart.render_one_parse(), Err(NoParse));
    assert!(chart.trees_for("ROOT").is_empty());
  }

  #[test]
  fn test_single_word() {
    let g: Grammar = CAT.parse().unwrap();
    let chart = parse_chart(&g, &["cat"]);
    assert_eq!(chart.render_one_parse(), Ok("(NP cat)".to_string()));
  }

  #[test]
  fn test_tree_generation() {
    // both bracketings of three words:
    //  (S (S x) (S (S x) (S x)))           -> [x][xx]
    //  (S (S (S x) (S x)) (S x))           -> [xx][x]
    let g: Grammar = "
      1.0 S S S
      1.0 S x
    "
    .parse()
    .unwrap();

    let chart = parse_chart(&g, &["x", "x", "x"]);
    let trees = chart
      .trees()
      .into_iter()
      .map(|t| t.to_string())
      .collect::<Vec<_>>();

    assert_eq!(chart.parse_count(), 2);
    assert_eq!(
      trees,
      vec![
        "(S (S x) (S (S x) (S x)))".to_string(),
        "(S (S (S x) (S x)) (S x))".to_string(),
      ]
    );
  }

  #[test]
  fn test_pp_attachment() {
    let g: Grammar = include_str!("../data/toy.gr").parse().unwrap();
    let input = "the president ate a sandwich with a pickle"
      .split(' ')
      .collect::<Vec<_>>();
    let chart = parse_chart(&g, &input);

    assert_eq!(chart.parse_count(), 2);
    assert_eq!(
      chart.render_one_parse().unwrap(),
      "(ROOT (NP (Det the) (Noun president)) (VP (Verb ate) (NP (NP (Det a) (Noun sandwich)) (PP (Prep with) (NP (Det a) (Noun pickle))))))"
    );
    assert_eq!(
      chart.trees_for("ROOT")[1].to_string(),
      "(ROOT (NP (Det the) (Noun president)) (VP (VP (Verb ate) (NP (Det a) (Noun sandwich))) (PP (Prep with) (NP (Det a) (Noun pickle)))))"
    );
    assert!(chart.trees_for("NP").is_empty());

    for tree in chart.trees() {
      assert_eq!(tree.leaves(), input);
      assert_eq!(tree.span(), (0, input.len()));
    }
  }

  #[test]
  fn test_root_filter() {
    let g: Grammar = "
      1.0 S  A B
      1.0 T  A B
      1.0 A  a
      1.0 B  b
    "
    .parse()
    .unwrap();

    let chart = parse_chart(&g, &["a", "b"]);
    assert_eq!(chart.parse_count(), 2);
    assert_eq!(chart.trees_for("T").len(), 1);
    assert_eq!(chart.trees_for("T")[0].to_string(), "(T (A a) (B b))");
    assert_eq!(chart.render_one_parse(), Ok("(S (A a) (B b))".to_string()));
  }
}
