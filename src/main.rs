mod cli;

use std::process::ExitCode;

use chomsky::cnf;
use chomsky::error_handling::{report, Error, Location};
use chomsky::generator;
use chomsky::language::{self, sentence_text};
use chomsky::parser;
use clap::Parser;

use cli::Cli;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.load_options();
    let location = Location::whole_file(&cli.file);

    let grammar = match parser::parse_file(&cli.file, &options) {
        Ok(grammar) => grammar,
        Err(errors) => {
            report(&errors);
            return ExitCode::FAILURE;
        }
    };

    let converted = match cnf::convert_until(grammar.clone(), cli.until) {
        Ok(converted) => converted,
        Err(error) => {
            report(&[Error::at(location, error)]);
            return ExitCode::FAILURE;
        }
    };

    print!("{}", converted.display(&options.notation));

    if let Some(amount) = cli.amount {
        for name in generator::unproductive(&converted) {
            log::warn!("`{}` cannot derive any sentence", name);
        }
        println!();
        for _ in 0..amount {
            match generator::generate(&converted, usize::from(cli.depth)) {
                Ok(sentence) => println!("{}", sentence_text(&sentence, &options.notation)),
                Err(error) => {
                    report(&[Error::at(location.clone(), error)]);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    if let Some(max_length) = cli.check {
        let difference = language::compare(&grammar, &converted, max_length);
        if !difference.is_empty() {
            let errors: Vec<_> = difference
                .errors(&options.notation)
                .into_iter()
                .map(|error| Error::at(location.clone(), error))
                .collect();
            report(&errors);
            return ExitCode::FAILURE;
        }
        log::info!("Languages agree on every sentence of at most {} terminals", max_length);
    }

    ExitCode::SUCCESS
}
