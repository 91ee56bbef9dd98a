use shortpath_core::{StoreError, ValidationError};
use thiserror::Error;

/// Broad category of an [`AllocError`], used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Server,
}

#[derive(Debug, Error)]
pub enum AllocError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Internal failure. `message` is safe to log but the fault should not
    /// be shown to callers.
    #[error("{message}")]
    Server {
        message: &'static str,
        #[source]
        fault: ServerFault,
    },
}

#[derive(Debug, Error)]
pub enum ServerFault {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("every generated candidate was taken after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("reverse write failed ({cause}) and the forward mapping could not be removed")]
    Compensation {
        cause: StoreError,
        #[source]
        rollback: StoreError,
    },
}

impl AllocError {
    pub(crate) fn server(message: &'static str, fault: impl Into<ServerFault>) -> Self {
        Self::Server {
            message,
            fault: fault.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// True when a partial allocation may have been left behind.
    pub fn is_compensation_failure(&self) -> bool {
        matches!(
            self,
            Self::Server {
                fault: ServerFault::Compensation { .. },
                ..
            }
        )
    }
}
