use indexmap::IndexMap;

use crate::grammar::{Alternative, Grammar, Rewrite, Symbol};
use super::{declare_fresh, ConvertResult, Stage};

/// Name of the nonterminal standing in for `terminal`. Letters and `_` are
/// kept, anything else (including `x` and digits) is written as `x`, its hex
/// code point and a closing `_`. Proxy names therefore never end in a digit
/// or `'`, so they cannot meet the names of the other stages.
pub fn proxy_name(terminal: &str) -> String {
    let mut name = String::from("T_");
    for c in terminal.chars() {
        if (c.is_alphabetic() && c != 'x') || c == '_' {
            name.push(c);
        } else {
            name.push_str(&format!("x{:X}_", c as u32));
        }
    }
    name
}

fn needs_isolation(alternative: &Alternative) -> bool {
    alternative.len() == 2 && alternative.iter().any(Symbol::is_terminal)
}

fn replace_terminals(alternative: Alternative, proxies: &IndexMap<String, String>) -> Alternative {
    if alternative.len() != 2 {
        return alternative;
    }
    alternative
        .into_iter()
        .map(|symbol| match symbol {
            Symbol::Terminal(text) => match proxies.get(&text) {
                Some(proxy) => Symbol::Nonterminal(proxy.clone()),
                None => Symbol::Terminal(text),
            },
            other => other,
        })
        .collect()
}

/// Moves terminals out of two-symbol alternatives into `T_a -> a`
/// alternatives, one per distinct terminal.
pub fn isolate_terminals(mut grammar: Grammar) -> ConvertResult<Grammar> {
    // terminal -> proxy nonterminal, in order of first use
    let mut proxies = IndexMap::new();
    for (_, alternative) in grammar.productions().filter(|(_, a)| needs_isolation(a)) {
        for symbol in alternative {
            if let Symbol::Terminal(text) = symbol {
                proxies.entry(text.clone()).or_insert_with(|| proxy_name(text));
            }
        }
    }

    for proxy in proxies.values() {
        declare_fresh(&mut grammar, proxy, Stage::Terminals)?;
    }

    for rewrite in grammar.rules.values_mut() {
        let replaced: Rewrite = rewrite
            .drain(..)
            .map(|alternative| replace_terminals(alternative, &proxies))
            .collect();
        *rewrite = replaced;
    }

    for (terminal, proxy) in proxies {
        grammar.add_alternative(&proxy, vec![Symbol::Terminal(terminal)]);
    }

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::cnf::ConvertErrorType;
    use crate::parser::{parse_str, LoadOptions};

    fn load(text: &str) -> Grammar {
        parse_str(text, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn proxy_names() {
        let terminals = vec!["a", "num_2", "+", "x2B", "a b", "é", "1", "\u{1}2", "\u{12}"];
        let answers = vec![
            "T_a",
            "T_num_x32_",
            "T_x2B_",
            "T_x78_x32_B",
            "T_ax20_b",
            "T_é",
            "T_x31_",
            "T_x1_x32_",
            "T_x12_",
        ];

        for (terminal, answer) in zip(terminals, answers) {
            assert_eq!(proxy_name(terminal), answer);
        }
    }

    #[test]
    fn shared_proxy_per_terminal() {
        let isolated = isolate_terminals(load("S -> a S_1 | S_1 a | a\nS_1 -> b a")).unwrap();
        assert_eq!(
            isolated.to_string(),
            "S -> T_a S_1 | S_1 T_a | a\nS_1 -> T_b T_a\nT_a -> a\nT_b -> b\n"
        );
    }

    #[test]
    fn lookalike_terminals_get_distinct_proxies() {
        let isolated = isolate_terminals(load("S -> + S | x2B S | a")).unwrap();
        assert_eq!(
            isolated.to_string(),
            "S -> T_x2B_ S | T_x78_x32_B S | a\nT_x2B_ -> +\nT_x78_x32_B -> x2B\n"
        );
    }

    #[test]
    fn single_terminals_stay() {
        let grammar = load("S -> A B | a\nA -> a\nB -> b");
        assert_eq!(isolate_terminals(grammar.clone()), Ok(grammar));
    }

    #[test]
    fn taken_proxy_is_a_collision() {
        assert_eq!(
            isolate_terminals(load("S -> a T_a\nT_a -> b")),
            Err(ConvertErrorType::NameCollision {
                stage: Stage::Terminals,
                name: "T_a".to_string()
            })
        );
    }
}
