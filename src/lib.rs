pub mod cnf;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod language;
pub mod parser;
