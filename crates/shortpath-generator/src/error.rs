use thiserror::Error;

/// Errors returned when a generator is configured with invalid settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("min_length and max_length must be greater than 0")]
    ZeroLength,
    #[error("min_length and max_length must not exceed {max}")]
    TooLong { max: usize },
    #[error("min_length {min} is greater than max_length {max}")]
    InvertedRange { min: usize, max: usize },
    #[error("charset is empty")]
    EmptyCharset,
    #[error("charset contains invalid characters")]
    InvalidCharset,
    #[error("charset contains duplicate character {0:?}")]
    DuplicateChar(char),
}
