use thiserror::Error;

use crate::pddl::atom::{Action, Atom};

/// Malformed atom or action text. `col` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("col:{col} {message} in {text:?}")]
pub struct ParseError {
    pub text: String,
    pub col: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(text: &str, col: usize, message: &str) -> Self {
        Self { text: text.to_owned(), col, message: message.to_owned() }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("action {0} is not a grounded operator of this problem")]
    UnknownAction(Action),

    #[error("action {action} is not applicable, missing {missing:?}")]
    PreconditionNotSatisfied { action: Action, missing: Vec<Atom> },

    #[error("state belongs to instance {state}, active instance is {active}")]
    StaleInstance { state: u64, active: u64 },

    #[error("inconsistent state: {0}")]
    Consistency(String),

    #[error("action index {index} out of range 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("configuration rejected: {0}")]
    Config(String),

    #[error("problem generator is exhausted")]
    GeneratorExhausted,

    #[error("{path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
