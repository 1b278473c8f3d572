use itertools::{Itertools, PeekingNext};

use super::{ParseErrorType, Result};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Arrow,
    Or,
    // A bare token, classified once every left-hand side is known
    Word(String),
    // A double-quoted token, always a terminal
    Quoted(String)
}

pub fn lex_quoted(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let token_text = line.peeking_take_while(|&c| c != '\"').collect();

    // Check if there is a close quote and consume it if there is
    if line.next() != Some('\"') {
        return Err(ParseErrorType::UnmatchedQuote);
    }

    Ok(Token::Quoted(token_text))
}

pub fn lex_word(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let text: String = line
        .peeking_take_while(|&c| !c.is_whitespace() && c != '|' && c != '\"')
        .collect();

    if text == "->" {
        Ok(Token::Arrow)
    } else {
        Ok(Token::Word(text))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '\"' {
            tokens.push(lex_quoted(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_word(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    Ok(tokens)
}
