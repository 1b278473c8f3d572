/*
    This module rewrites grammars into Chomsky Normal Form
*/

pub mod binarize;
pub mod epsilon;
pub mod start;
pub mod terminals;
pub mod unit;
pub mod validate;

use std::fmt::Display;

use crate::error_handling::ErrorType;
use crate::grammar::Grammar;

/// The rewrites in the order they run. Every stage relies on the
/// invariants established by the ones before it.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, clap::ValueEnum)]
pub enum Stage {
    Start,
    Epsilon,
    Unit,
    Binarize,
    Terminals,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Start,
        Stage::Epsilon,
        Stage::Unit,
        Stage::Binarize,
        Stage::Terminals,
    ];

    pub fn run(self, grammar: Grammar) -> ConvertResult<Grammar> {
        match self {
            Stage::Start => start::normalize_start(grammar),
            Stage::Epsilon => Ok(epsilon::eliminate_epsilon(grammar)),
            Stage::Unit => Ok(unit::eliminate_units(grammar)),
            Stage::Binarize => binarize::binarize(grammar),
            Stage::Terminals => terminals::isolate_terminals(grammar),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Start => write!(f, "start symbol normalization"),
            Stage::Epsilon => write!(f, "epsilon elimination"),
            Stage::Unit => write!(f, "unit elimination"),
            Stage::Binarize => write!(f, "binarization"),
            Stage::Terminals => write!(f, "terminal isolation"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConvertErrorType {
    // A generated nonterminal name is already taken
    NameCollision { stage: Stage, name: String },
}

impl ErrorType for ConvertErrorType {}

impl Display for ConvertErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertErrorType::NameCollision { stage, name } => {
                write!(f, "Nonterminal `{}` introduced by {} already exists", name, stage)
            }
        }
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertErrorType>;

// Declares a nonterminal that must not exist yet
fn declare_fresh(grammar: &mut Grammar, name: &str, stage: Stage) -> ConvertResult<()> {
    if !grammar.declare(name) {
        return Err(ConvertErrorType::NameCollision {
            stage,
            name: name.to_string(),
        });
    }
    log::debug!("{}: introduced `{}`", stage, name);
    Ok(())
}

/// Runs every stage in order.
pub fn convert(grammar: Grammar) -> ConvertResult<Grammar> {
    convert_until(grammar, Stage::Terminals)
}

/// Runs the stages in order up to and including `last`.
pub fn convert_until(mut grammar: Grammar, last: Stage) -> ConvertResult<Grammar> {
    for stage in Stage::ALL.into_iter().take_while(|stage| *stage <= last) {
        grammar = stage.run(grammar)?;
        log::info!(
            "After {}: {} nonterminals, {} alternatives",
            stage,
            grammar.rules.len(),
            grammar.alternative_count()
        );
        for violation in validate::check_after(&grammar, stage) {
            log::warn!("After {}: {}", stage, violation);
        }
    }
    Ok(grammar)
}
