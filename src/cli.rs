use std::path::PathBuf;

use chomsky::cnf::Stage;
use chomsky::grammar::{Notation, EPSILON};
use chomsky::parser::LoadOptions;
use clap::Parser;

// Generation recurses once per level, so the budget has to stay well
// inside the stack
const MAX_DEPTH: i64 = 1000;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Token that stands for the empty alternative
    #[arg(short, long, value_name = "MARKER", default_value = EPSILON)]
    pub epsilon: String,

    /// Last stage to run
    #[arg(long, value_enum, value_name = "STAGE", default_value_t = Stage::Terminals)]
    pub until: Stage,

    /// Amount of random sentences to print from the converted grammar
    #[arg(short = 'n', long, value_name = "AMOUNT")]
    pub amount: Option<u32>,

    /// Depth after which generated sentences are finished as fast as possible
    #[arg(long, value_name = "DEPTH", default_value_t = 12, value_parser = clap::value_parser!(u16).range(..=MAX_DEPTH))]
    pub depth: u16,

    /// Compare both languages up to this many terminals per sentence
    #[arg(long, value_name = "LENGTH")]
    pub check: Option<usize>,

    /// Log every rewrite
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            notation: Notation {
                epsilon: self.epsilon.clone(),
            },
            start: self.start.clone(),
        }
    }
}
