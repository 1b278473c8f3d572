/*
    This module is for storing and manipulating grammars
*/

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

// The marker used for the empty alternative unless told otherwise
pub const EPSILON: &str = "ε";

// The base unit in a grammar rule
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
    // Only ever appears as the sole symbol of an alternative
    Epsilon,
}

impl Symbol {
    pub fn nonterminal(&self) -> Option<&str> {
        match self {
            Symbol::Nonterminal(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

// The symbols in a single alternative
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule, in insertion order and without duplicates
pub type Rewrite = IndexSet<Alternative>;

pub fn epsilon_alternative() -> Alternative {
    vec![Symbol::Epsilon]
}

pub fn is_epsilon(alternative: &Alternative) -> bool {
    alternative.as_slice() == [Symbol::Epsilon]
}

// An alternative consisting of exactly one nonterminal
pub fn unit_target(alternative: &Alternative) -> Option<&str> {
    match alternative.as_slice() {
        [symbol] => symbol.nonterminal(),
        _ => None,
    }
}

/// How a grammar is written down: shared by the loader and the printer.
#[derive(Debug, Clone, PartialEq)]
pub struct Notation {
    pub epsilon: String,
}

impl Default for Notation {
    fn default() -> Self {
        Notation {
            epsilon: EPSILON.to_string(),
        }
    }
}

/// A context-free grammar. The keys of `rules` are exactly the declared
/// nonterminals, kept in declaration order.
#[derive(Debug, PartialEq, Clone)]
pub struct Grammar {
    pub start_symbol: String,
    pub rules: IndexMap<String, Rewrite>,
}

impl Grammar {
    pub fn new(start_symbol: &str) -> Self {
        let mut rules = IndexMap::new();
        rules.insert(start_symbol.to_string(), Rewrite::new());
        Grammar {
            start_symbol: start_symbol.to_string(),
            rules,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Declares `name` with no alternatives. Returns false if it already existed.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.is_declared(name) {
            return false;
        }
        self.rules.insert(name.to_string(), Rewrite::new());
        true
    }

    /// Adds an alternative, declaring `lhs` if needed. Returns false for a duplicate.
    pub fn add_alternative(&mut self, lhs: &str, alternative: Alternative) -> bool {
        match self.rules.get_mut(lhs) {
            Some(rewrite) => rewrite.insert(alternative),
            None => {
                self.rules.insert(lhs.to_string(), Rewrite::from([alternative]));
                true
            }
        }
    }

    pub fn alternatives(&self, name: &str) -> Option<&Rewrite> {
        self.rules.get(name)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &String> {
        self.rules.keys()
    }

    pub fn alternative_count(&self) -> usize {
        self.rules.values().map(Rewrite::len).sum()
    }

    // Every (lhs, alternative) pair in declaration order
    pub fn productions(&self) -> impl Iterator<Item = (&String, &Alternative)> {
        self.rules
            .iter()
            .flat_map(|(lhs, rewrite)| rewrite.iter().map(move |alternative| (lhs, alternative)))
    }

    pub fn appears_on_rhs(&self, name: &str) -> bool {
        self.productions()
            .any(|(_, alternative)| alternative.iter().any(|s| s.nonterminal() == Some(name)))
    }

    /// A printable view of the grammar using the given notation.
    pub fn display<'a>(&'a self, notation: &'a Notation) -> GrammarDisplay<'a> {
        GrammarDisplay {
            grammar: self,
            notation,
        }
    }

    // Start symbol first, then the rest in declaration order
    fn print_order(&self) -> impl Iterator<Item = (&String, &Rewrite)> {
        let start = self.rules.get_key_value(&self.start_symbol);
        start.into_iter().chain(
            self.rules
                .iter()
                .filter(move |(lhs, _)| **lhs != self.start_symbol),
        )
    }

    // A terminal can be written bare only if the loader would read it back
    // as the same terminal
    fn is_bare_terminal(&self, text: &str, notation: &Notation) -> bool {
        !text.is_empty()
            && !text.chars().any(|c| c.is_whitespace() || c == '"' || c == '|')
            && !text.starts_with(|c: char| c.is_ascii_uppercase())
            && text != "->"
            && text != notation.epsilon
            && !self.is_declared(text)
    }
}

pub struct GrammarDisplay<'a> {
    grammar: &'a Grammar,
    notation: &'a Notation,
}

impl GrammarDisplay<'_> {
    fn symbol_text(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::Nonterminal(name) => name.clone(),
            Symbol::Terminal(text) if self.grammar.is_bare_terminal(text, self.notation) => text.clone(),
            Symbol::Terminal(text) => format!("\"{}\"", text),
            Symbol::Epsilon => self.notation.epsilon.clone(),
        }
    }
}

impl Display for GrammarDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (lhs, rewrite) in self.grammar.print_order() {
            write!(f, "{} ->", lhs)?;
            let alternatives = rewrite
                .iter()
                .map(|alternative| alternative.iter().map(|s| self.symbol_text(s)).join(" "))
                .join(" | ");
            if !alternatives.is_empty() {
                write!(f, " {}", alternatives)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(&Notation::default()))
    }
}
