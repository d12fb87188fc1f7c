use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::grammar::Grammar;

/// Address of an entry in the chart: the cell's span plus the entry's position in that cell.
/// Entries only ever point at entries in strictly shorter spans, so following these never cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRef {
  pub start: usize,
  pub len: usize,
  pub idx: usize,
}

impl EntryRef {
  pub fn new(start: usize, len: usize, idx: usize) -> Self {
    Self { start, len, idx }
  }

  pub fn end(&self) -> usize {
    self.start + self.len
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Derivation<'a> {
  /// A preterminal covering one input word
  Word(&'a str),
  /// A binary rule. `first` covers the front of the span and `second` the rest.
  Split { first: EntryRef, second: EntryRef },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
  pub lhs: &'a str,
  pub derivation: Derivation<'a>,
}

impl<'a> Entry<'a> {
  pub fn word(lhs: &'a str, word: &'a str) -> Self {
    Self {
      lhs,
      derivation: Derivation::Word(word),
    }
  }

  pub fn split(lhs: &'a str, first: EntryRef, second: EntryRef) -> Self {
    Self {
      lhs,
      derivation: Derivation::Split { first, second },
    }
  }

  pub fn is_preterminal(&self) -> bool {
    matches!(self.derivation, Derivation::Word(_))
  }
}

impl fmt::Display for Entry<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.derivation {
      Derivation::Word(w) => write!(f, "{} → {}", self.lhs, w),
      Derivation::Split { first, second } => write!(
        f,
        "{} → {}..{}[{}] {}..{}[{}]",
        self.lhs,
        first.start,
        first.end(),
        first.idx,
        second.start,
        second.end(),
        second.idx
      ),
    }
  }
}

/// Every derivation found for one span. Entries stay in insertion order; several may share an lhs.
#[derive(Debug, Clone, Default)]
pub struct Cell<'a> {
  entries: Vec<Entry<'a>>,
  by_lhs: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Cell<'a> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn add(&mut self, entry: Entry<'a>) {
    self.by_lhs.entry(entry.lhs).or_default().push(self.entries.len());
    self.entries.push(entry);
  }

  pub fn entries(&self) -> &[Entry<'a>] {
    &self.entries
  }

  pub fn get(&self, idx: usize) -> Option<&Entry<'a>> {
    self.entries.get(idx)
  }

  /// Positions of the entries headed by `lhs`, in insertion order
  pub fn indices_of(&self, lhs: &str) -> &[usize] {
    self.by_lhs.get(lhs).map(Vec::as_slice).unwrap_or(&[])
  }

  /// First entry headed by `lhs`
  pub fn find(&self, lhs: &str) -> Option<&Entry<'a>> {
    self.indices_of(lhs).first().map(|&idx| &self.entries[idx])
  }
}

/// Triangular CYK table over one sentence. `cells[start][len - 1]` holds the span `start..start + len`.
#[derive(Debug, Clone)]
pub struct Chart<'a> {
  words: Vec<&'a str>,
  cells: Vec<Vec<Cell<'a>>>,
}

impl<'a> Chart<'a> {
  pub fn new(words: &[&'a str]) -> Self {
    let n = words.len();
    let cells = (0..n)
      .map(|start| vec![Cell::new(); n - start])
      .collect::<Vec<_>>();
    Self {
      words: words.to_vec(),
      cells,
    }
  }

  /// Number of input words
  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn words(&self) -> &[&'a str] {
    &self.words
  }

  pub fn cell(&self, start: usize, len: usize) -> Option<&Cell<'a>> {
    if len == 0 {
      return None;
    }
    self.cells.get(start)?.get(len - 1)
  }

  fn cell_mut(&mut self, start: usize, len: usize) -> &mut Cell<'a> {
    &mut self.cells[start][len - 1]
  }

  /// The cell spanning the whole sentence, if there are any words
  pub fn top(&self) -> Option<&Cell<'a>> {
    self.cell(0, self.len())
  }

  pub fn get(&self, r: EntryRef) -> Option<&Entry<'a>> {
    self.cell(r.start, r.len)?.get(r.idx)
  }

  /// Refs to every entry in a cell, in insertion order
  pub fn refs(&self, start: usize, len: usize) -> impl Iterator<Item = EntryRef> {
    let count = self.cell(start, len).map(Cell::len).unwrap_or(0);
    (0..count).map(move |idx| EntryRef::new(start, len, idx))
  }

  pub fn entry_count(&self) -> usize {
    self.cells.iter().flatten().map(Cell::len).sum()
  }
}

impl fmt::Display for Chart<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for len in 1..=self.len() {
      for start in 0..=(self.len() - len) {
        let cell = &self.cells[start][len - 1];
        if cell.is_empty() {
          continue;
        }
        writeln!(f, "Span {}..{}:", start, start + len)?;
        for (idx, entry) in cell.entries().iter().enumerate() {
          writeln!(f, "  [{}] {}", idx, entry)?;
        }
      }
    }
    Ok(())
  }
}

/// Fills a chart for `input` bottom-up. Never fails: a word the grammar doesn't know
/// leaves its cell empty, and a sentence the grammar can't derive leaves the top cell empty.
pub fn parse_chart<'a>(g: &'a Grammar, input: &[&'a str]) -> Chart<'a> {
  let mut chart = Chart::new(input);
  let n = chart.len();
  debug!(words = n, "parsing");

  for (i, &word) in input.iter().enumerate() {
    let lhss = g.preterminals_for(word);
    if lhss.is_empty() {
      warn!(word, position = i, "no preterminal produces word");
    }
    for lhs in lhss {
      chart.cell_mut(i, 1).add(Entry::word(lhs, word));
    }
  }

  for len in 2..=n {
    for start in 0..=(n - len) {
      // collect first since the source cells are borrowed from the same table
      let mut found = Vec::new();
      for split in 1..len {
        combine(g, &chart, start, split, len, &mut found);
      }

      trace!(start, len, entries = found.len(), "filled cell");
      let cell = chart.cell_mut(start, len);
      for entry in found {
        cell.add(entry);
      }
    }
  }

  debug!(
    parses = chart.top().map(Cell::len).unwrap_or(0),
    entries = chart.entry_count(),
    "chart complete"
  );

  chart
}

/// Builds entries for `start..start + len` out of every pair in the cells
/// `start..start + split` and `start + split..start + len`
fn combine<'a>(
  g: &'a Grammar,
  chart: &Chart<'a>,
  start: usize,
  split: usize,
  len: usize,
  found: &mut Vec<Entry<'a>>,
) {
  let (Some(left), Some(right)) = (
    chart.cell(start, split),
    chart.cell(start + split, len - split),
  ) else {
    return;
  };

  for (i, l) in left.entries().iter().enumerate() {
    for (j, r) in right.entries().iter().enumerate() {
      for lhs in g.lhs_for_pair(l.lhs, r.lhs) {
        found.push(Entry::split(
          lhs,
          EntryRef::new(start, split, i),
          EntryRef::new(start + split, len - split, j),
        ));
      }
    }
  }
}
