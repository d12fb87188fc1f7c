use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::grammar::Grammar;
use crate::rules::{Production, SymbolKind};

/// How the generator picks among a nonterminal's alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
  /// Every alternative is equally likely; production probabilities are ignored
  #[default]
  Uniform,
  /// Alternatives are drawn in proportion to their probabilities, renormalized per lhs
  Weighted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
  /// The start symbol has no productions
  UnknownStart(String),
  /// Expanding `symbol` would nest deeper than the configured limit
  DepthExceeded { depth: usize, symbol: String },
}

impl fmt::Display for GenerateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnknownStart(s) => write!(f, "no productions for start symbol {}", s),
      Self::DepthExceeded { depth, symbol } => write!(
        f,
        "generation depth exceeded {} while expanding {}",
        depth, symbol
      ),
    }
  }
}

impl std::error::Error for GenerateError {}

/// Pending work while rendering a derivation. Popped in reverse push order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Work<'g> {
  Symbol(&'g str),
  Space,
  Close,
}

/// Samples random derivations top-down from a grammar
#[derive(Debug, Clone)]
pub struct Generator<'g> {
  grammar: &'g Grammar,
  sampling: Sampling,
  max_depth: Option<usize>,
}

impl<'g> Generator<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      sampling: Sampling::default(),
      max_depth: None,
    }
  }

  pub fn sampling(mut self, sampling: Sampling) -> Self {
    self.sampling = sampling;
    self
  }

  /// Fail with `GenerateError::DepthExceeded` instead of nesting more than `depth`
  /// expansions. Unbounded by default, so a grammar that can recurse forever may not return.
  pub fn max_depth(mut self, depth: usize) -> Self {
    self.max_depth = Some(depth);
    self
  }

  fn choose<'p, R: Rng + ?Sized>(
    &self,
    alternatives: &'p [Production],
    rng: &mut R,
  ) -> &'p Production {
    let idx = match self.sampling {
      Sampling::Uniform => rng.gen_range(0..alternatives.len()),
      Sampling::Weighted => match WeightedIndex::new(alternatives.iter().map(|p| p.prob)) {
        Ok(dist) => dist.sample(rng),
        Err(e) => {
          warn!(lhs = %alternatives[0].lhs, error = %e, "unusable weights, sampling uniformly");
          rng.gen_range(0..alternatives.len())
        }
      },
    };
    &alternatives[idx]
  }

  /// Samples one derivation from `start` and renders it bracketed, `(ROOT (NP cat) (VP sat))`
  pub fn sample<R: Rng + ?Sized>(
    &self,
    start: &str,
    rng: &mut R,
  ) -> Result<String, GenerateError> {
    if self.grammar.symbol_kind(start) == SymbolKind::Terminal {
      return Err(GenerateError::UnknownStart(start.to_string()));
    }

    let mut out = String::new();
    let mut stack = vec![Work::Symbol(start)];
    let mut depth = 0;

    while let Some(work) = stack.pop() {
      match work {
        Work::Space => out.push(' '),
        Work::Close => {
          out.push(')');
          depth -= 1;
        }
        Work::Symbol(symbol) => {
          let alternatives = self.grammar.productions_for(symbol);
          if alternatives.is_empty() {
            out.push_str(symbol);
            continue;
          }

          depth += 1;
          if let Some(max) = self.max_depth {
            if depth > max {
              return Err(GenerateError::DepthExceeded {
                depth: max,
                symbol: symbol.to_string(),
              });
            }
          }

          out.push_str(" (");
          out.push_str(symbol);

          let production = self.choose(alternatives, rng);
          trace!(%production, depth, "expanding");

          stack.push(Work::Close);
          if let Some(second) = production.rhs.second() {
            self.push_symbol(&mut stack, second);
          }
          self.push_symbol(&mut stack, production.rhs.first());
        }
      }
    }

    Ok(out.trim_start().to_string())
  }

  /// Terminals get a space marker on top of them so words come out separated
  fn push_symbol<'s>(&self, stack: &mut Vec<Work<'s>>, symbol: &'s str) {
    stack.push(Work::Symbol(symbol));
    if !self.grammar.is_nonterminal(symbol) {
      stack.push(Work::Space);
    }
  }

  /// `count` independent samples from `start`
  pub fn generate<R: Rng + ?Sized>(
    &self,
    start: &str,
    count: usize,
    rng: &mut R,
  ) -> Result<Vec<String>, GenerateError> {
    debug!(start, count, sampling = ?self.sampling, "generating");
    (0..count).map(|_| self.sample(start, rng)).collect()
  }
}

/// `count` uniformly-sampled sentences from `start`, using the thread rng
pub fn generate(
  grammar: &Grammar,
  start: &str,
  count: usize,
) -> Result<Vec<String>, GenerateError> {
  Generator::new(grammar).generate(start, count, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::cyk::parse_chart;

  const CAT: &str = "
    1.0 ROOT NP VP
    1.0 NP   cat
    1.0 VP   sat
  ";

  #[test]
  fn test_single_alternative() {
    let g: Grammar = CAT.parse().unwrap();
    assert_eq!(
      generate(&g, "ROOT", 3).unwrap(),
      vec!["(ROOT (NP cat) (VP sat))"; 3]
    );
    assert_eq!(generate(&g, "NP", 1).unwrap(), vec!["(NP cat)"]);
  }

  #[test]
  fn test_unknown_start() {
    let g: Grammar = CAT.parse().unwrap();
    assert_eq!(
      generate(&g, "cat", 1),
      Err(GenerateError::UnknownStart("cat".to_string()))
    );
    assert_eq!(generate(&g, "ROOT", 0), Ok(Vec::new()));
  }

  /// Counts rule applications in a generated string, checking that brackets balance
  fn count_brackets(s: &str) -> usize {
    let mut open = 0usize;
    let mut total = 0;
    for c in s.chars() {
      match c {
        '(' => {
          open += 1;
          total += 1;
        }
        ')' => open = open.checked_sub(1).expect("unbalanced close"),
        _ => {}
      }
    }
    assert_eq!(open, 0, "unclosed bracket in {}", s);
    total
  }

  #[test]
  fn test_generated_sentences_parse() {
    let g: Grammar = include_str!("../data/toy.gr").parse().unwrap();
    // both NP and VP take PP adjuncts, so long sentences have catalan-many parses; keep them short
    let generator = Generator::new(&g).sampling(Sampling::Weighted).max_depth(8);
    let mut rng = StdRng::seed_from_u64(7);

    let mut produced = 0;
    for _ in 0..50 {
      let s = match generator.sample("ROOT", &mut rng) {
        Ok(s) => s,
        Err(GenerateError::DepthExceeded { .. }) => continue,
        Err(e) => panic!("{}", e),
      };

      let expansions = count_brackets(&s);
      assert!(s.starts_with("(ROOT "));

      // strip the brackets and symbols back off and make sure the words parse again
      let words = s
        .split(' ')
        .filter(|tok| tok.ends_with(')'))
        .map(|tok| tok.trim_end_matches(')'))
        .collect::<Vec<_>>();
      if words.len() > 12 {
        continue;
      }
      produced += 1;

      let chart = parse_chart(&g, &words);
      assert!(chart.parse_count() > 0, "couldn't parse generated {:?}", s);
      // every binary derivation of n words has 2n - 1 rule applications, whichever one we take
      let tree = chart.first_tree().unwrap();
      assert_eq!(tree.branch_count(), expansions);
      assert_eq!(expansions, 2 * words.len() - 1);
    }
    assert!(produced > 0);
  }

  #[test]
  fn test_weighted_with_unusable_weights() {
    // Grammar::new doesn't check probabilities, so all-zero weights can reach the sampler
    let g = Grammar::new(vec![
      Production::word("S", "a", 0.0),
      Production::word("S", "b", 0.0),
    ]);
    let mut rng = StdRng::seed_from_u64(3);
    let samples = Generator::new(&g)
      .sampling(Sampling::Weighted)
      .generate("S", 20, &mut rng)
      .unwrap();

    assert_eq!(samples.len(), 20);
    assert!(samples.iter().all(|s| s == "(S a)" || s == "(S b)"));
  }

  #[test]
  fn test_uniform_covers_alternatives() {
    let g: Grammar = "
      1.0  S  a
      0.01 S  b
    "
    .parse()
    .unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let samples = Generator::new(&g).generate("S", 200, &mut rng).unwrap();

    let bs = samples.iter().filter(|s| *s == "(S b)").count();
    assert!(bs > 50 && bs < 150, "uniform sampling drew (S b) {} times", bs);
  }

  #[test]
  fn test_weighted_follows_probabilities() {
    let g: Grammar = "
      0.99 S  a
      0.01 S  b
    "
    .parse()
    .unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let samples = Generator::new(&g)
      .sampling(Sampling::Weighted)
      .generate("S", 200, &mut rng)
      .unwrap();

    let a_count = samples.iter().filter(|s| *s == "(S a)").count();
    assert!(a_count > 180, "weighted sampling drew (S a) {} times", a_count);
  }

  #[test]
  fn test_depth_limit() {
    // S -> S S is always chosen, so this never bottoms out
    let g: Grammar = "1.0 S S S".parse().unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let err = Generator::new(&g).max_depth(10).sample("S", &mut rng).unwrap_err();
    assert_eq!(
      err,
      GenerateError::DepthExceeded {
        depth: 10,
        symbol: "S".to_string()
      }
    );
  }

  #[test]
  fn test_undefined_symbol_renders_as_word() {
    // Verb has no productions, so it is treated as a terminal and printed as-is
    let g: Grammar = "
      1.0 ROOT NP Verb
      1.0 NP   cat
    "
    .parse()
    .unwrap();
    assert_eq!(generate(&g, "ROOT", 1).unwrap(), vec!["(ROOT (NP cat) Verb)"]);
  }
}
