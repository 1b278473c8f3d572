use std::fmt::Display;

use crate::grammar::{is_epsilon, unit_target, Alternative, Grammar, Symbol};
use super::Stage;

#[derive(Debug, PartialEq, Clone)]
pub enum Violation {
    // A right-hand side names a nonterminal that has no entry
    Undeclared { lhs: String, name: String },
    // Epsilon next to other symbols
    MisplacedEpsilon { lhs: String },
    StartOnRhs { lhs: String },
    Epsilon { lhs: String },
    Unit { lhs: String, target: String },
    TooLong { lhs: String, length: usize },
    TerminalInPair { lhs: String, terminal: String },
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Undeclared { lhs, name } => write!(f, "`{}` uses undeclared nonterminal `{}`", lhs, name),
            Violation::MisplacedEpsilon { lhs } => write!(f, "`{}` has epsilon inside a longer alternative", lhs),
            Violation::StartOnRhs { lhs } => write!(f, "`{}` uses the start symbol", lhs),
            Violation::Epsilon { lhs } => write!(f, "`{}` is not the start symbol but has an epsilon alternative", lhs),
            Violation::Unit { lhs, target } => write!(f, "`{}` has the unit alternative `{}`", lhs, target),
            Violation::TooLong { lhs, length } => write!(f, "`{}` has an alternative of length {}", lhs, length),
            Violation::TerminalInPair { lhs, terminal } => write!(f, "`{}` has terminal `{}` in a two-symbol alternative", lhs, terminal),
        }
    }
}

fn check_alternative(grammar: &Grammar, lhs: &str, alternative: &Alternative, stage: Stage, violations: &mut Vec<Violation>) {
    let lhs_owned = || lhs.to_string();

    for symbol in alternative {
        match symbol {
            Symbol::Nonterminal(name) if !grammar.is_declared(name) => {
                violations.push(Violation::Undeclared { lhs: lhs_owned(), name: name.clone() })
            }
            Symbol::Nonterminal(name) if *name == grammar.start_symbol => {
                violations.push(Violation::StartOnRhs { lhs: lhs_owned() })
            }
            Symbol::Epsilon if alternative.len() > 1 => {
                violations.push(Violation::MisplacedEpsilon { lhs: lhs_owned() })
            }
            _ => {}
        }
    }

    if stage >= Stage::Epsilon && is_epsilon(alternative) && lhs != grammar.start_symbol {
        violations.push(Violation::Epsilon { lhs: lhs_owned() });
    }

    if stage >= Stage::Unit {
        if let Some(target) = unit_target(alternative) {
            violations.push(Violation::Unit { lhs: lhs_owned(), target: target.to_string() });
        }
    }

    if stage >= Stage::Binarize && alternative.len() > 2 {
        violations.push(Violation::TooLong { lhs: lhs_owned(), length: alternative.len() });
    }

    if stage >= Stage::Terminals && alternative.len() == 2 {
        for symbol in alternative {
            if let Symbol::Terminal(text) = symbol {
                violations.push(Violation::TerminalInPair { lhs: lhs_owned(), terminal: text.clone() });
            }
        }
    }
}

/// Every violation of the invariants that hold once `stage` has run.
pub fn check_after(grammar: &Grammar, stage: Stage) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (lhs, alternative) in grammar.productions() {
        check_alternative(grammar, lhs, alternative, stage, &mut violations);
    }
    violations
}

/// Every way in which the grammar is not in Chomsky Normal Form.
pub fn check(grammar: &Grammar) -> Vec<Violation> {
    check_after(grammar, Stage::Terminals)
}

pub fn is_cnf(grammar: &Grammar) -> bool {
    check(grammar).is_empty()
}
