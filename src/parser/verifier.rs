use indexmap::IndexMap;
use itertools::Itertools;

use crate::error_handling::Location;
use crate::grammar::{epsilon_alternative, Alternative, Grammar, Notation, Symbol};
use super::ParseErrorType::UndeclaredSymbol;
use super::{FileResult, ParseError, ParseErrors, Result, Rule, Token};

// A bare token is a nonterminal if some line defines it. Undefined bare
// tokens that look like nonterminals are rejected instead of silently
// becoming terminals.
fn classify_token(token: &Token, grammar: &Grammar) -> Result<Symbol> {
    match token {
        Token::Word(word) if grammar.is_declared(word) => Ok(Symbol::Nonterminal(word.clone())),
        Token::Word(word) if word.starts_with(|c: char| c.is_ascii_uppercase()) => {
            Err(UndeclaredSymbol(word.clone()))
        }
        Token::Word(text) | Token::Quoted(text) => Ok(Symbol::Terminal(text.clone())),
        // parse_alternative never lets these through
        Token::Arrow => Ok(Symbol::Terminal("->".to_string())),
        Token::Or => Ok(Symbol::Terminal("|".to_string())),
    }
}

fn classify_alternative(tokens: &[Token], location: &Location, grammar: &Grammar, notation: &Notation) -> std::result::Result<Alternative, ParseErrors> {
    if let [Token::Word(word)] = tokens {
        if *word == notation.epsilon {
            return Ok(epsilon_alternative());
        }
    }

    let (symbols, errors): (Vec<_>, Vec<_>) = tokens
        .iter()
        .map(|token| classify_token(token, grammar))
        .partition_result();

    if errors.is_empty() {
        Ok(symbols)
    } else {
        Err(errors.into_iter().map(|error| ParseError::at(location.clone(), error)).collect())
    }
}

// Builds the grammar in two passes: every left-hand side is declared first,
// then the right-hand sides are classified against the complete set.
pub(super) fn build_grammar(start_symbol: String, rules: Vec<Rule>, notation: &Notation) -> FileResult<Grammar> {
    let mut grammar = Grammar {
        start_symbol,
        rules: IndexMap::with_capacity(rules.len()),
    };

    for rule in &rules {
        grammar.declare(&rule.symbol);
    }

    let mut errors = Vec::new();
    let mut classified = Vec::with_capacity(rules.len());
    for rule in &rules {
        for tokens in &rule.alternatives {
            match classify_alternative(tokens, &rule.location, &grammar, notation) {
                Ok(alternative) => classified.push((rule.symbol.as_str(), alternative)),
                Err(e) => errors.extend(e),
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    for (symbol, alternative) in classified {
        grammar.add_alternative(symbol, alternative);
    }

    Ok(grammar)
}
