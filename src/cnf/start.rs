use crate::grammar::{Grammar, Symbol};
use super::{declare_fresh, ConvertResult, Stage};

// Derives the name of the replacement start symbol
pub fn fresh_start_name(start: &str) -> String {
    format!("{}'", start)
}

/// Makes sure the start symbol appears on no right-hand side by adding
/// `S' -> S` as the new start when it does.
pub fn normalize_start(mut grammar: Grammar) -> ConvertResult<Grammar> {
    if !grammar.appears_on_rhs(&grammar.start_symbol) {
        return Ok(grammar);
    }

    let old_start = grammar.start_symbol.clone();
    let new_start = fresh_start_name(&old_start);

    declare_fresh(&mut grammar, &new_start, Stage::Start)?;
    grammar.add_alternative(&new_start, vec![Symbol::Nonterminal(old_start)]);
    grammar.start_symbol = new_start;

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::ConvertErrorType;
    use crate::parser::{parse_str, LoadOptions};

    fn load(text: &str) -> Grammar {
        parse_str(text, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn start_on_rhs_gets_a_new_start() {
        let normalized = normalize_start(load("S -> a S b | c")).unwrap();
        assert_eq!(normalized.start_symbol, "S'");
        assert_eq!(normalized.to_string(), "S' -> S\nS -> a S b | c\n");
        assert!(!normalized.appears_on_rhs("S'"));
    }

    #[test]
    fn indirect_recursion_counts() {
        let normalized = normalize_start(load("S -> A\nA -> a S | b")).unwrap();
        assert_eq!(normalized.start_symbol, "S'");
    }

    #[test]
    fn start_not_on_rhs_is_untouched() {
        let grammar = load("S -> A b\nA -> a | ε");
        assert_eq!(normalize_start(grammar.clone()), Ok(grammar));
    }

    #[test]
    fn taken_name_is_a_collision() {
        assert_eq!(
            normalize_start(load("S -> S' S\nS' -> x")),
            Err(ConvertErrorType::NameCollision {
                stage: Stage::Start,
                name: "S'".to_string()
            })
        );
    }
}
