/*
    This module loads grammars written as `LHS -> ALT1 | ALT2 | ...` lines
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error_handling::*;
use crate::grammar::*;
use itertools::Itertools;
use lexer::*;
use verifier::build_grammar;

#[derive(Debug)]
pub enum ParseErrorType {
    // A rule line without `->`
    MissingArrow,
    // A `->` inside an alternative
    UnexpectedArrow,
    // The left-hand side is empty or not a bare name
    MissingNonterminal,
    // More than one token before `->`
    UnexpectedToken(String),
    // There is an unclosed quote
    UnmatchedQuote,
    // Nothing between two `|`
    EmptyAlternative,
    // The epsilon marker next to other symbols
    MisplacedEpsilon,
    // A nonterminal-looking token that is never defined
    UndeclaredSymbol(String),
    // The file has no rules at all
    EmptyGrammar,
    // The requested start symbol is not defined
    UnknownStart(String),
    // Somehow a full rewrite was parsed as a single alternative
    // This is a problem with the loader, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with the loader, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for ParseErrorType {}

impl PartialEq for ParseErrorType {
    fn eq(&self, other: &Self) -> bool {
        use ParseErrorType::*;
        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (UnexpectedToken(a), UnexpectedToken(b))
            | (UndeclaredSymbol(a), UndeclaredSymbol(b))
            | (UnknownStart(a), UnknownStart(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorType::MissingArrow => write!(f, "Expected `->` after nonterminal"),
            ParseErrorType::UnexpectedArrow => write!(f, "Unexpected `->` encountered"),
            ParseErrorType::MissingNonterminal => write!(f, "Expected a nonterminal name before `->`"),
            ParseErrorType::UnexpectedToken(token) => write!(f, "Unexpected `{}` before `->`", token),
            ParseErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            ParseErrorType::EmptyAlternative => write!(f, "Empty alternative (use the epsilon marker instead)"),
            ParseErrorType::MisplacedEpsilon => write!(f, "The epsilon marker must be an alternative on its own"),
            ParseErrorType::UndeclaredSymbol(symbol) => write!(f, "Could not find definition for `{}`", symbol),
            ParseErrorType::EmptyGrammar => write!(f, "No rules found"),
            ParseErrorType::UnknownStart(symbol) => write!(f, "Start symbol `{}` is not defined", symbol),
            ParseErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with the loader, not the grammar)"),
            ParseErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with the loader, not the grammar)"),
            ParseErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type ParseError = Error<ParseErrorType>;
pub type ParseErrors = Errors<ParseErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> ParseError {
    ParseError::at(Location::whole_file(file), ParseErrorType::FileError(error))
}

pub type Result<T> = std::result::Result<T, ParseErrorType>;
pub type LineResult<T> = std::result::Result<T, ParseError>;
pub type FileResult<T> = std::result::Result<T, ParseErrors>;

/// Everything the loader needs besides the text itself.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub notation: Notation,
    // Overrides the first rule's left-hand side
    pub start: Option<String>,
}

// A parsed line whose tokens are not classified yet
#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    alternatives: Vec<Vec<Token>>,
    location: Location
}

fn parse_alternative(tokens: &[Token], notation: &Notation) -> Result<Vec<Token>> {
    if tokens.is_empty() {
        return Err(ParseErrorType::EmptyAlternative);
    }

    for token in tokens {
        match token {
            Token::Arrow => return Err(ParseErrorType::UnexpectedArrow),
            Token::Or => return Err(ParseErrorType::UnsplitRewrite),
            Token::Word(w) if *w == notation.epsilon && tokens.len() > 1 => {
                return Err(ParseErrorType::MisplacedEpsilon)
            }
            _ => {}
        }
    }

    Ok(tokens.to_vec())
}

fn parse_rewrite(tokens: &[Token], notation: &Notation) -> Result<Vec<Vec<Token>>> {
    // `A ->` on its own declares A without alternatives
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    tokens
        .split(|t| *t == Token::Or)
        .map(|alternative| parse_alternative(alternative, notation))
        .collect()
}

fn parse_line(tokens: &[Token], location: Location, notation: &Notation) -> Result<Rule> {
    let arrow = tokens.iter().position(|t| *t == Token::Arrow);

    let (symbol, arrow) = match (tokens.first(), arrow) {
        (None, _) => Err(ParseErrorType::UnexpectedBlankLine),
        (Some(_), None) => Err(ParseErrorType::MissingArrow),
        (Some(Token::Word(s)), Some(arrow)) if *s != notation.epsilon => Ok((s.clone(), arrow)),
        (Some(_), Some(_)) => Err(ParseErrorType::MissingNonterminal),
    }?;

    if arrow > 1 {
        let extra = match &tokens[1] {
            Token::Word(s) | Token::Quoted(s) => s.clone(),
            Token::Or => "|".to_string(),
            Token::Arrow => "->".to_string(),
        };
        return Err(ParseErrorType::UnexpectedToken(extra));
    }

    let alternatives = parse_rewrite(&tokens[arrow + 1..], notation)?;

    Ok(Rule {
        symbol,
        alternatives,
        location
    })
}

fn parse_lex_line(line: &str, location: Location, notation: &Notation) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone(), notation))
        .map_err(|error| ParseError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim_start();
    !line.is_empty() && !line.starts_with(';') && !line.starts_with('#')
}

// Returns an iterator over the lines of a reader, with the io errors wrapped
// in ParseError and enumerated
fn numbered_lines<'a, R: BufRead + 'a>(reader: R, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    reader
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path)))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn grammar_from_rules(rule_list: Vec<Rule>, path: &Path, options: &LoadOptions) -> FileResult<Grammar> {
    let first = rule_list
        .first()
        .map(|rule| rule.symbol.clone())
        .ok_or_else(|| vec![ParseError::at(Location::whole_file(path), ParseErrorType::EmptyGrammar)])?;

    let start_symbol = match &options.start {
        Some(start) if rule_list.iter().any(|rule| rule.symbol == *start) => start.clone(),
        Some(start) => {
            return Err(vec![ParseError::at(
                Location::whole_file(path),
                ParseErrorType::UnknownStart(start.clone())
            )])
        }
        None => first,
    };

    build_grammar(start_symbol, rule_list, &options.notation)
}

/// Loads a grammar from any line reader. `path` is only used to locate errors.
pub fn parse_reader<R: BufRead>(reader: R, path: &Path, options: &LoadOptions) -> FileResult<Grammar> {
    let parsed_lines = numbered_lines(reader, path).map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location::line(path, num), &options.notation))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    let grammar = grammar_from_rules(rules, path, options)?;
    log::info!(
        "Loaded {} nonterminals with {} alternatives from {}",
        grammar.rules.len(),
        grammar.alternative_count(),
        path.display()
    );
    Ok(grammar)
}

pub fn parse_str(text: &str, options: &LoadOptions) -> FileResult<Grammar> {
    parse_reader(text.as_bytes(), &PathBuf::from("<input>"), options)
}

pub fn parse_file(path: &Path, options: &LoadOptions) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    parse_reader(std::io::BufReader::new(file), path, options)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn s_nonterminal(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    fn s_terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    fn nowhere() -> Location {
        Location::whole_file(&PathBuf::new())
    }

    fn line_error(line: usize, error: ParseErrorType) -> ParseError {
        ParseError::at(Location::line(&PathBuf::from("<input>"), line), error)
    }

    #[test]
    fn parse_normal_alternative() {
        let notation = Notation::default();
        let lines = vec![
            vec![word("a"), word("S"), Token::Quoted("b".to_string())],
            vec![word("ε")]
        ];

        for line in lines {
            assert_eq!(parse_alternative(&line[..], &notation).unwrap(), line);
        }
    }

    #[test]
    fn parse_malformed_alternative() {
        let notation = Notation::default();
        assert_eq!(parse_alternative(&[Token::Arrow], &notation), Err(ParseErrorType::UnexpectedArrow));
        assert_eq!(parse_alternative(&[Token::Or], &notation), Err(ParseErrorType::UnsplitRewrite));
        assert_eq!(parse_alternative(&[], &notation), Err(ParseErrorType::EmptyAlternative));
        assert_eq!(
            parse_alternative(&[word("a"), word("ε")], &notation),
            Err(ParseErrorType::MisplacedEpsilon)
        );
    }

    #[test]
    fn parse_normal_line() {
        let notation = Notation::default();
        let lexed = lexer::lex_line("S -> a S b | c").unwrap();

        let answer = Rule {
            symbol: "S".to_string(),
            alternatives: vec![
                vec![word("a"), word("S"), word("b")],
                vec![word("c")]
            ],
            location: nowhere()
        };

        assert_eq!(parse_line(&lexed[..], nowhere(), &notation), Ok(answer));

        let lexed = lexer::lex_line("A ->").unwrap();
        assert_eq!(parse_line(&lexed[..], nowhere(), &notation).unwrap().alternatives, Vec::<Vec<Token>>::new());
    }

    #[test]
    fn parse_malformed_line() {
        let notation = Notation::default();
        let lines = vec![
            "alpha bravo charlie",
            "\"alpha\" -> bravo",
            "-> alpha",
            "| -> alpha",
            "A B -> c",
            "A -> b -> c",
            "A -> b | | c",
            "ε -> a"
        ];
        let answers = vec![
            ParseErrorType::MissingArrow,
            ParseErrorType::MissingNonterminal,
            ParseErrorType::MissingNonterminal,
            ParseErrorType::MissingNonterminal,
            ParseErrorType::UnexpectedToken("B".to_string()),
            ParseErrorType::UnexpectedArrow,
            ParseErrorType::EmptyAlternative,
            ParseErrorType::MissingNonterminal
        ];

        for (line, answer) in zip(lines, answers) {
            let lexed = lexer::lex_line(line).unwrap();
            assert_eq!(parse_line(&lexed[..], nowhere(), &notation), Err(answer), "{}", line);
        }

        assert_eq!(parse_line(&[], nowhere(), &notation), Err(ParseErrorType::UnexpectedBlankLine));
    }

    #[test]
    fn classification_uses_every_line() {
        // B is used before the line that defines it
        let grammar = parse_str("S -> a B | \"B\"\nB -> b | ε\n", &LoadOptions::default()).unwrap();

        let mut expected = Grammar::new("S");
        expected.add_alternative("S", vec![s_terminal("a"), s_nonterminal("B")]);
        expected.add_alternative("S", vec![s_terminal("B")]);
        expected.add_alternative("B", vec![s_terminal("b")]);
        expected.add_alternative("B", epsilon_alternative());

        assert_eq!(grammar, expected);
        assert_eq!(grammar.nonterminals().collect_vec(), vec!["S", "B"]);
    }

    #[test]
    fn repeated_rules_are_merged() {
        let text = "; comment\nS -> a | b\n\n# another\nS -> b | c\n";
        let grammar = parse_str(text, &LoadOptions::default()).unwrap();
        assert_eq!(grammar.to_string(), "S -> a | b | c\n");
    }

    #[test]
    fn start_override() {
        let options = LoadOptions {
            start: Some("B".to_string()),
            ..LoadOptions::default()
        };
        let grammar = parse_str("S -> B\nB -> b\n", &options).unwrap();
        assert_eq!(grammar.start_symbol, "B");

        let options = LoadOptions {
            start: Some("C".to_string()),
            ..LoadOptions::default()
        };
        assert_eq!(
            parse_str("S -> B\nB -> b\n", &options).unwrap_err(),
            vec![ParseError::at(
                Location::whole_file(&PathBuf::from("<input>")),
                ParseErrorType::UnknownStart("C".to_string())
            )]
        );
    }

    #[test]
    fn custom_epsilon_marker() {
        let options = LoadOptions {
            notation: Notation { epsilon: "eps".to_string() },
            start: None,
        };
        let grammar = parse_str("S -> a | eps | ε", &options).unwrap();
        assert_eq!(
            grammar.alternatives("S").unwrap().iter().cloned().collect_vec(),
            vec![vec![s_terminal("a")], epsilon_alternative(), vec![s_terminal("ε")]]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            parse_str("; nothing here\n", &LoadOptions::default()).unwrap_err(),
            vec![ParseError::at(Location::whole_file(&PathBuf::from("<input>")), ParseErrorType::EmptyGrammar)]
        );
    }

    #[test]
    fn every_line_error_is_reported() {
        let text = "S -> a X\nA b\nB -> \"c\nC -> Y | Z\n";
        // Line errors stop the load before classification
        assert_eq!(
            parse_str(text, &LoadOptions::default()).unwrap_err(),
            vec![
                line_error(2, ParseErrorType::MissingArrow),
                line_error(3, ParseErrorType::UnmatchedQuote)
            ]
        );

        let text = "S -> a X\nC -> Y | Z\n";
        assert_eq!(
            parse_str(text, &LoadOptions::default()).unwrap_err(),
            vec![
                line_error(1, ParseErrorType::UndeclaredSymbol("X".to_string())),
                line_error(2, ParseErrorType::UndeclaredSymbol("Y".to_string())),
                line_error(2, ParseErrorType::UndeclaredSymbol("Z".to_string()))
            ]
        );
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/arithmetic.cfg");
        let example_parsed = parse_file(&example_path, &LoadOptions::default()).unwrap();

        let mut expected = Grammar::new("E");
        expected.add_alternative("E", vec![s_nonterminal("E"), s_terminal("+"), s_nonterminal("T")]);
        expected.add_alternative("E", vec![s_nonterminal("T")]);
        expected.add_alternative("T", vec![s_nonterminal("T"), s_terminal("*"), s_nonterminal("F")]);
        expected.add_alternative("T", vec![s_nonterminal("F")]);
        expected.add_alternative("F", vec![s_terminal("("), s_nonterminal("E"), s_terminal(")")]);
        expected.add_alternative("F", vec![s_terminal("x")]);

        assert_eq!(example_parsed, expected);
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.cfg");
        let example_parsed = parse_file(&example_path, &LoadOptions::default()).unwrap_err();

        assert_eq!(example_parsed, vec![
            ParseError {
                location: Location::line(&example_path, 3),
                error: ParseErrorType::MissingArrow
            },
            ParseError {
                location: Location::line(&example_path, 6),
                error: ParseErrorType::MisplacedEpsilon
            }
        ]);
    }

    #[test]
    fn missing_file() {
        let example_path = PathBuf::from("example_data/does_not_exist.cfg");
        let error = parse_file(&example_path, &LoadOptions::default()).unwrap_err();
        assert_eq!(
            error,
            vec![io_error(std::io::Error::from(std::io::ErrorKind::NotFound), &example_path)]
        );
    }
}
