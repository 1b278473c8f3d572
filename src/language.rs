/*
    This module enumerates the short sentences of a grammar, which is enough
    to compare two grammars for equivalence on a bounded slice of their
    languages
*/

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::ErrorType;
use crate::grammar::{Alternative, Grammar, Notation, Symbol};

// A sentence is the sequence of terminal texts it consists of
pub type Sentence = Vec<String>;

pub fn sentence_text(sentence: &Sentence, notation: &Notation) -> String {
    if sentence.is_empty() {
        notation.epsilon.clone()
    } else {
        sentence.iter().join(" ")
    }
}

#[derive(Debug, PartialEq)]
pub enum CheckErrorType {
    // Derivable from the source grammar only
    Missing(String),
    // Derivable from the converted grammar only
    Unexpected(String),
}

impl ErrorType for CheckErrorType {}

impl Display for CheckErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckErrorType::Missing(sentence) => write!(f, "`{}` is no longer derivable", sentence),
            CheckErrorType::Unexpected(sentence) => write!(f, "`{}` became derivable", sentence),
        }
    }
}

// All sentences the alternative derives from the sentences known so far
fn derive_alternative(alternative: &Alternative, known: &HashMap<&str, BTreeSet<Sentence>>, max_length: usize) -> BTreeSet<Sentence> {
    let mut partial = BTreeSet::from([Sentence::new()]);

    for symbol in alternative {
        partial = match symbol {
            Symbol::Epsilon => partial,
            Symbol::Terminal(text) => partial
                .into_iter()
                .filter(|prefix| prefix.len() < max_length)
                .map(|mut prefix| {
                    prefix.push(text.clone());
                    prefix
                })
                .collect(),
            Symbol::Nonterminal(name) => {
                let Some(suffixes) = known.get(name.as_str()) else {
                    return BTreeSet::new();
                };
                partial
                    .iter()
                    .cartesian_product(suffixes.iter())
                    .filter(|(prefix, suffix)| prefix.len() + suffix.len() <= max_length)
                    .map(|(prefix, suffix)| prefix.iter().chain(suffix).cloned().collect())
                    .collect()
            }
        };

        if partial.is_empty() {
            break;
        }
    }

    partial
}

/// Every sentence of at most `max_length` terminals derivable from the start
/// symbol. Computed as the least fixed point over all nonterminals, so
/// left recursion, unit cycles and epsilon alternatives are all fine.
pub fn bounded_language(grammar: &Grammar, max_length: usize) -> BTreeSet<Sentence> {
    let mut known: HashMap<&str, BTreeSet<Sentence>> = grammar
        .nonterminals()
        .map(|name| (name.as_str(), BTreeSet::new()))
        .collect();

    loop {
        let mut changed = false;
        for (lhs, alternative) in grammar.productions() {
            let derived = derive_alternative(alternative, &known, max_length);
            if let Some(sentences) = known.get_mut(lhs.as_str()) {
                for sentence in derived {
                    changed |= sentences.insert(sentence);
                }
            }
        }
        if !changed {
            break;
        }
    }

    known.remove(grammar.start_symbol.as_str()).unwrap_or_default()
}

/// Sentences on which two grammars disagree.
#[derive(Debug, PartialEq, Default)]
pub struct LanguageDifference {
    // Derivable from the first grammar only
    pub missing: BTreeSet<Sentence>,
    // Derivable from the second grammar only
    pub unexpected: BTreeSet<Sentence>,
}

impl LanguageDifference {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    pub fn errors(&self, notation: &Notation) -> Vec<CheckErrorType> {
        let missing = self
            .missing
            .iter()
            .map(|sentence| CheckErrorType::Missing(sentence_text(sentence, notation)));
        let unexpected = self
            .unexpected
            .iter()
            .map(|sentence| CheckErrorType::Unexpected(sentence_text(sentence, notation)));
        missing.chain(unexpected).collect()
    }
}

pub fn compare(original: &Grammar, converted: &Grammar, max_length: usize) -> LanguageDifference {
    let expected = bounded_language(original, max_length);
    let actual = bounded_language(converted, max_length);

    LanguageDifference {
        missing: expected.difference(&actual).cloned().collect(),
        unexpected: actual.difference(&expected).cloned().collect(),
    }
}
