use indexmap::{IndexMap, IndexSet};

use crate::grammar::{unit_target, Grammar, Rewrite};

/// Nonterminals reachable from `from` through zero or more unit
/// alternatives, in discovery order. `from` itself comes first.
pub fn unit_closure<'a>(grammar: &'a Grammar, from: &'a str) -> IndexSet<&'a str> {
    let mut closure = IndexSet::from([from]);
    let mut next = 0;
    // The set doubles as the work queue, so cycles stop on their own
    while let Some(&current) = closure.get_index(next) {
        let targets = grammar
            .alternatives(current)
            .into_iter()
            .flatten()
            .filter_map(unit_target);
        closure.extend(targets);
        next += 1;
    }
    closure
}

/// Replaces every alternative of a single nonterminal by the non-unit
/// alternatives that nonterminal leads to.
pub fn eliminate_units(grammar: Grammar) -> Grammar {
    let mut rules = IndexMap::with_capacity(grammar.rules.len());

    for lhs in grammar.nonterminals() {
        let mut rewrite = Rewrite::new();
        for reachable in unit_closure(&grammar, lhs) {
            if let Some(alternatives) = grammar.alternatives(reachable) {
                rewrite.extend(
                    alternatives
                        .iter()
                        .filter(|alternative| unit_target(alternative).is_none())
                        .cloned(),
                );
            }
        }

        if rewrite.is_empty() && !grammar.rules[lhs].is_empty() {
            log::debug!("`{}` only leads to unit cycles and now derives nothing", lhs);
        }
        rules.insert(lhs.clone(), rewrite);
    }

    Grammar {
        start_symbol: grammar.start_symbol,
        rules,
    }
}
