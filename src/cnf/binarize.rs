use indexmap::IndexMap;

use crate::grammar::{Grammar, Symbol};
use super::{declare_fresh, ConvertResult, Stage};

pub fn chain_name(lhs: &str, index: usize) -> String {
    format!("{}_{}", lhs, index)
}

// Emits `lhs -> X1 Y1`, `Y1 -> X2 Y2`, ..., `Yk -> X(n-1) Xn`.
// `counter` numbers the fresh names of one left-hand side across all of its
// long alternatives.
fn split_alternative(grammar: &mut Grammar, lhs: &str, alternative: &[Symbol], counter: &mut usize) -> ConvertResult<()> {
    let (heads, last_pair) = alternative.split_at(alternative.len() - 2);

    let mut current = lhs.to_string();
    for symbol in heads {
        *counter += 1;
        let fresh = chain_name(lhs, *counter);
        declare_fresh(grammar, &fresh, Stage::Binarize)?;
        grammar.add_alternative(&current, vec![symbol.clone(), Symbol::Nonterminal(fresh.clone())]);
        current = fresh;
    }
    grammar.add_alternative(&current, last_pair.to_vec());

    Ok(())
}

/// Rewrites every alternative longer than two symbols into a chain of
/// two-symbol alternatives.
pub fn binarize(grammar: Grammar) -> ConvertResult<Grammar> {
    let mut binarized = Grammar {
        start_symbol: grammar.start_symbol.clone(),
        rules: IndexMap::with_capacity(grammar.rules.len()),
    };
    // Declare everything up front so a fresh name cannot shadow a
    // nonterminal that is only copied over later
    for lhs in grammar.nonterminals() {
        binarized.declare(lhs);
    }

    for (lhs, rewrite) in &grammar.rules {
        let mut counter = 0;
        for alternative in rewrite {
            if alternative.len() <= 2 {
                binarized.add_alternative(lhs, alternative.clone());
            } else {
                split_alternative(&mut binarized, lhs, alternative, &mut counter)?;
            }
        }
    }

    Ok(binarized)
}
