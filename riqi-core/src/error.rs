use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed date '{literal}'")]
    MalformedDate { literal: String },

    #[error("pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(u64),

    #[error("task title is empty")]
    EmptyTitle,
}
