use std::collections::HashSet;

use crate::grammar::{epsilon_alternative, is_epsilon, Alternative, Grammar, Rewrite, Symbol};

/// Every nonterminal that derives the empty string, directly or through
/// other nullable nonterminals.
pub fn nullable_symbols(grammar: &Grammar) -> HashSet<&str> {
    let mut nullable = HashSet::new();
    loop {
        let known = nullable.len();
        for (lhs, alternative) in grammar.productions() {
            if nullable.contains(lhs.as_str()) {
                continue;
            }
            let all_nullable = alternative.iter().all(|symbol| match symbol {
                Symbol::Epsilon => true,
                Symbol::Nonterminal(name) => nullable.contains(name.as_str()),
                Symbol::Terminal(_) => false,
            });
            if all_nullable {
                nullable.insert(lhs.as_str());
            }
        }
        if nullable.len() == known {
            return nullable;
        }
    }
}

/// The `2^k` ways of keeping or dropping each of the `k` occurrences of
/// `nullable`, starting with the alternative itself. An alternative without
/// occurrences comes back unchanged.
pub fn variants(alternative: &Alternative, nullable: &str) -> Vec<Alternative> {
    let occurrences = alternative
        .iter()
        .filter(|symbol| symbol.nonterminal() == Some(nullable))
        .count();
    if occurrences == 0 {
        return vec![alternative.clone()];
    }

    (0..1usize << occurrences)
        .map(|dropped| {
            let mut nth = 0;
            let variant: Alternative = alternative
                .iter()
                .filter(|symbol| {
                    if symbol.nonterminal() != Some(nullable) {
                        return true;
                    }
                    let keep = dropped & (1 << nth) == 0;
                    nth += 1;
                    keep
                })
                .cloned()
                .collect();
            if variant.is_empty() {
                epsilon_alternative()
            } else {
                variant
            }
        })
        .collect()
}

// The first nonterminal in declaration order, other than the start symbol,
// with a direct epsilon alternative
fn next_epsilon_carrier(grammar: &Grammar) -> Option<String> {
    grammar
        .rules
        .iter()
        .find(|(lhs, rewrite)| **lhs != grammar.start_symbol && rewrite.iter().any(is_epsilon))
        .map(|(lhs, _)| lhs.clone())
}

// Replaces every alternative mentioning `nullable` by its variants.
// Nonterminals whose epsilon was already eliminated do not get it back:
// their nullability is already spelled out wherever they are used.
fn expand_occurrences(grammar: &mut Grammar, nullable: &str, eliminated: &HashSet<String>) {
    let start = grammar.start_symbol.clone();
    for (lhs, rewrite) in grammar.rules.iter_mut() {
        let keep_epsilon = *lhs == start || !eliminated.contains(lhs);
        let mut expanded = Rewrite::with_capacity(rewrite.len());
        for alternative in rewrite.iter() {
            for variant in variants(alternative, nullable) {
                if keep_epsilon || !is_epsilon(&variant) {
                    expanded.insert(variant);
                }
            }
        }
        *rewrite = expanded;
    }
}

/// Removes every epsilon alternative except one on the start symbol, which
/// keeps `[ε]` exactly when it was nullable to begin with.
pub fn eliminate_epsilon(mut grammar: Grammar) -> Grammar {
    let start_nullable = nullable_symbols(&grammar).contains(grammar.start_symbol.as_str());
    let mut eliminated = HashSet::new();

    while let Some(symbol) = next_epsilon_carrier(&grammar) {
        log::debug!("Eliminating the epsilon alternative of `{}`", symbol);
        if let Some(rewrite) = grammar.rules.get_mut(&symbol) {
            rewrite.shift_remove(&epsilon_alternative());
        }
        eliminated.insert(symbol.clone());
        expand_occurrences(&mut grammar, &symbol, &eliminated);
    }

    if start_nullable {
        let start = grammar.start_symbol.clone();
        grammar.add_alternative(&start, epsilon_alternative());
    }

    grammar
}
