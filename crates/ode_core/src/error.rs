use thiserror::Error;

/// Failures raised while evaluating an expression node.
///
/// These are detected lazily: a node referring to an operator outside the
/// fixed registry builds fine and only fails the first time it is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown {arity} operator: {op}")]
    UnknownOperator { op: String, arity: &'static str },
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("function {name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("invalid integrator settings: {0}")]
    InvalidSettings(String),
    #[error("failed to evaluate d{symbol}/dt at t = {time}")]
    Eval {
        symbol: String,
        time: f64,
        #[source]
        source: EvalError,
    },
    #[error("{symbol} became non-finite at t = {time}")]
    NonFinite { symbol: String, time: f64 },
    #[error("failed to write output row")]
    Sink(#[from] std::io::Error),
}
