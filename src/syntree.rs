use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// The words under this tree, left to right
  pub fn leaves(&self) -> Vec<&U> {
    let mut out = Vec::new();
    self.collect_leaves(&mut out);
    out
  }

  fn collect_leaves<'t>(&'t self, out: &mut Vec<&'t U>) {
    match self {
      Self::Leaf(w) => out.push(&w.value),
      Self::Branch(_, children) => {
        for c in children {
          c.collect_leaves(out);
        }
      }
    }
  }

  /// Number of branch nodes, i.e. rule applications
  pub fn branch_count(&self) -> usize {
    match self {
      Self::Leaf(_) => 0,
      Self::Branch(_, children) => 1 + children.iter().map(Self::branch_count).sum::<usize>(),
    }
  }
}

/// Bracketed form, `(S (NP cat) (VP sat))`. Spans are left out.
impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{}", w.value),
      Self::Branch(c, children) => {
        write!(f, "({}", c.value)?;
        for child in children.iter() {
          write!(f, " {}", child)?;
        }
        write!(f, ")")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leaf(w: &str, at: usize) -> SynTree<String, String> {
    SynTree::Leaf(Word {
      value: w.to_string(),
      span: (at, at + 1),
    })
  }

  fn branch(
    sym: &str,
    span: (usize, usize),
    children: Vec<SynTree<String, String>>,
  ) -> SynTree<String, String> {
    SynTree::Branch(
      Constituent {
        value: sym.to_string(),
        span,
      },
      children,
    )
  }

  #[test]
  fn test_bracketed_display() {
    let t = branch(
      "ROOT",
      (0, 2),
      vec![
        branch("NP", (0, 1), vec![leaf("cat", 0)]),
        branch("VP", (1, 2), vec![leaf("sat", 1)]),
      ],
    );

    assert_eq!(t.to_string(), "(ROOT (NP cat) (VP sat))");
    assert_eq!(t.leaves(), vec!["cat", "sat"]);
    assert_eq!(t.branch_count(), 3);
    assert_eq!(t.span(), (0, 2));
    assert!(t.is_branch());
    let np = &t.get_branch().unwrap().1[0];
    let cat = &np.get_branch().unwrap().1[0];
    assert!(cat.is_leaf());
    assert_eq!(cat.get_leaf().unwrap().span, (0, 1));
    assert!(np.get_leaf().is_none());
  }
}
