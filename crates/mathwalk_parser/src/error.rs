use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character at: {0}")]
    UnexpectedChar(String),
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),
}
