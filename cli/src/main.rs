use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcfg_cyk::utils::tokenize;
use pcfg_cyk::{Err, Grammar, Sampling};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Parse sentences read from stdin, one per line
  Parse {
    /// File containing the grammar
    grammar: PathBuf,

    /// Print the parse chart
    #[arg(short, long)]
    chart: bool,

    /// Print every derivation instead of just the first
    #[arg(short, long)]
    all: bool,

    /// Reject grammars with undefined symbols or unary rules
    #[arg(long)]
    strict: bool,

    /// Wrap each parse as (SYMBOL <parse> <punctuation>)
    #[arg(short, long, value_name = "SYMBOL")]
    root: Option<String>,
  },
  /// Generate random sentences
  Generate {
    /// File containing the grammar
    grammar: PathBuf,

    /// Start symbol (default: left-hand side of the first rule)
    #[arg(short, long, value_name = "SYMBOL")]
    start: Option<String>,

    /// Amount to generate
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
    amount: usize,

    /// Sample alternatives by their probabilities instead of uniformly
    #[arg(short, long)]
    weighted: bool,

    /// Give up on a sentence that nests deeper than this
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Reject grammars with undefined symbols or unary rules
    #[arg(long)]
    strict: bool,
  },
}

fn load(path: &Path, strict: bool) -> Result<Grammar, Err> {
  let g = Grammar::read_from_file(path)
    .map_err(|e| format!("{}: {}", path.display(), e))?;
  if strict {
    g.validate()?;
  }
  info!(path = %path.display(), productions = g.len(), "loaded grammar");
  Ok(g)
}

fn parse_line(g: &Grammar, line: &str, print_chart: bool, all: bool, root: Option<&str>) {
  let tokens = tokenize(line).without_nonterminals(g);
  if tokens.words.is_empty() {
    return;
  }
  let words = tokens.as_strs();
  let chart = g.parse_chart(&words);

  if print_chart {
    println!("chart:\n{}", chart);
  }

  let wrap = |parse: String| match root {
    Some(root) => format!(
      "({} {} {})",
      root,
      parse,
      tokens.end.as_deref().unwrap_or(".")
    ),
    None => parse,
  };

  if all {
    let trees = chart.trees();
    println!(
      "Parsed {} tree{}",
      trees.len(),
      if trees.len() == 1 { "" } else { "s" }
    );
    for t in trees {
      println!("{}", wrap(t.to_string()));
    }
  } else {
    match chart.render_one_parse() {
      Ok(parse) => println!("{}", wrap(parse)),
      Err(_) => println!("(NOPARSE {})", chart.words().join(" ")),
    }
  }
}

fn run(cli: Cli) -> Result<(), Err> {
  match cli.command {
    Command::Parse {
      grammar,
      chart,
      all,
      strict,
      root,
    } => {
      let g = load(&grammar, strict)?;
      let stdin = io::stdin();
      for line in stdin.lock().lines() {
        parse_line(&g, &line?, chart, all, root.as_deref());
      }
    }
    Command::Generate {
      grammar,
      start,
      amount,
      weighted,
      max_depth,
      seed,
      strict,
    } => {
      let g = load(&grammar, strict)?;
      let start = start.unwrap_or_else(|| g.start.clone());

      let mut generator = g.generator().sampling(if weighted {
        Sampling::Weighted
      } else {
        Sampling::Uniform
      });
      if let Some(depth) = max_depth {
        generator = generator.max_depth(depth);
      }

      let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
      };

      let mut stdout = io::stdout().lock();
      for sentence in generator.generate(&start, amount, &mut rng)? {
        writeln!(stdout, "{}", sentence)?;
      }
    }
  }

  Ok(())
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run(Cli::parse()) {
    eprintln!("error: {}", e);
    process::exit(1);
  }
}
