/*
    This module generates random sentences
*/

use rand::prelude::*;
use std::collections::HashMap;
use std::fmt::Display;

use crate::error_handling::ErrorType;
use crate::grammar::*;
use crate::language::Sentence;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // A nonterminal with no finite derivation was reached
    Unproductive(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::Unproductive(nonterminal) => write!(f, "`{}` cannot derive any sentence", nonterminal),
        }
    }
}

pub type GenResult<T> = Result<T, GenerateErrorType>;

// Height of the shallowest derivation tree of each productive nonterminal
pub fn derivation_heights(grammar: &Grammar) -> HashMap<&str, usize> {
    let mut heights = HashMap::new();
    loop {
        let mut changed = false;
        for (lhs, alternative) in grammar.productions() {
            let Some(height) = alternative_height(alternative, &heights) else {
                continue;
            };
            match heights.get(lhs.as_str()) {
                Some(&best) if best <= height => {}
                _ => {
                    heights.insert(lhs.as_str(), height);
                    changed = true;
                }
            }
        }
        if !changed {
            return heights;
        }
    }
}

// Nonterminals without any finite derivation, in declaration order
pub fn unproductive(grammar: &Grammar) -> Vec<&str> {
    let heights = derivation_heights(grammar);
    grammar
        .nonterminals()
        .map(String::as_str)
        .filter(|name| !heights.contains_key(name))
        .collect()
}

// One more than the tallest nonterminal in the alternative
fn alternative_height(alternative: &Alternative, heights: &HashMap<&str, usize>) -> Option<usize> {
    alternative
        .iter()
        .filter_map(Symbol::nonterminal)
        .map(|name| heights.get(name).copied())
        .try_fold(0, |tallest, height| Some(tallest.max(height?)))
        .map(|tallest| tallest + 1)
}

struct Generator<'a, R: Rng + ?Sized> {
    grammar: &'a Grammar,
    heights: HashMap<&'a str, usize>,
    max_depth: usize,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Generator<'_, R> {
    fn generate_nonterminal(&mut self, nonterminal: &str, depth: usize, sentence: &mut Sentence) -> GenResult<()> {
        let height = *self
            .heights
            .get(nonterminal)
            .ok_or_else(|| GenerateErrorType::Unproductive(nonterminal.to_string()))?;

        // Past the depth budget only the shallowest alternatives are allowed,
        // which bounds the remaining recursion by the height
        let grammar = self.grammar;
        let candidates: Vec<&Alternative> = grammar
            .alternatives(nonterminal)
            .into_iter()
            .flatten()
            .filter(|alternative| match alternative_height(alternative, &self.heights) {
                Some(h) => depth < self.max_depth || h == height,
                None => false,
            })
            .collect();

        let alternative = candidates
            .choose(&mut *self.rng)
            .ok_or_else(|| GenerateErrorType::Unproductive(nonterminal.to_string()))?;

        for symbol in alternative.iter() {
            match symbol {
                Symbol::Nonterminal(name) => self.generate_nonterminal(name, depth + 1, sentence)?,
                Symbol::Terminal(text) => sentence.push(text.clone()),
                Symbol::Epsilon => {}
            }
        }

        Ok(())
    }
}

// Generates a sentence in the given grammar using the given source of randomness
pub fn generate_with_rng<R: Rng + ?Sized>(grammar: &Grammar, max_depth: usize, rng: &mut R) -> GenResult<Sentence> {
    let mut generator = Generator {
        grammar,
        heights: derivation_heights(grammar),
        max_depth,
        rng,
    };

    let mut sentence = Sentence::new();
    generator.generate_nonterminal(&grammar.start_symbol, 0, &mut sentence)?;
    Ok(sentence)
}

pub fn generate(grammar: &Grammar, max_depth: usize) -> GenResult<Sentence> {
    generate_with_rng(grammar, max_depth, &mut thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::convert;
    use crate::parser::{parse_str, LoadOptions};

    fn load(text: &str) -> Grammar {
        parse_str(text, &LoadOptions::default()).unwrap()
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn heights() {
        let grammar = load("S -> A B | s\nA -> a A | B\nB -> b\nC -> C c");
        let heights = derivation_heights(&grammar);
        assert_eq!(heights.get("S"), Some(&1));
        assert_eq!(heights.get("B"), Some(&1));
        assert_eq!(heights.get("A"), Some(&2));
        assert_eq!(heights.get("C"), None);
        assert_eq!(unproductive(&grammar), vec!["C"]);
    }

    #[test]
    fn depth_budget_forces_the_shortest_way_out() {
        let grammar = load("S -> S a | b");
        let mut rng = seeded();
        for _ in 0..10 {
            assert_eq!(generate_with_rng(&grammar, 0, &mut rng), Ok(vec!["b".to_string()]));
        }
    }

    #[test]
    fn sentences_of_converted_grammar_are_balanced() {
        let grammar = convert(load("S -> a S b | ε")).unwrap();
        let mut rng = seeded();
        for _ in 0..20 {
            let sentence = generate_with_rng(&grammar, 6, &mut rng).unwrap();
            let half = sentence.len() / 2;
            assert_eq!(sentence.len() % 2, 0);
            assert!(sentence[..half].iter().all(|t| t == "a"), "{:?}", sentence);
            assert!(sentence[half..].iter().all(|t| t == "b"), "{:?}", sentence);
        }
    }

    #[test]
    fn epsilon_start() {
        let grammar = load("S -> ε");
        assert_eq!(generate_with_rng(&grammar, 3, &mut seeded()), Ok(vec![]));
    }

    #[test]
    fn unproductive_start() {
        let grammar = load("S -> A\nA -> a A");
        assert_eq!(
            generate_with_rng(&grammar, 3, &mut seeded()),
            Err(GenerateErrorType::Unproductive("S".to_string()))
        );
    }
}
