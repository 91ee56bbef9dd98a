use thiserror::Error;

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key not found")]
    NotFound,
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("store operation cancelled: {0}")]
    Cancelled(String),
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Input rejected by a syntactic or policy check.
///
/// The messages are part of the public contract: the HTTP layer returns them
/// verbatim so callers can correct their input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("short_path is empty")]
    ShortPathEmpty,
    #[error("short_path contains leading or trailing spaces")]
    ShortPathPadded,
    #[error("short_path contains disallowed characters")]
    ShortPathDisallowedChars,
    #[error("short_path is reserved")]
    ShortPathReserved,
    #[error("short_path is too long")]
    ShortPathTooLong,
    #[error("target_url contains leading or trailing spaces")]
    TargetUrlPadded,
    #[error("target_url is not valid")]
    TargetUrlInvalid,
}
