use crate::error::StoreError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Execution context handed from the request boundary to every store call.
///
/// Carries an optional deadline and a cancellation token. Operations run
/// through [`Context::guard`] fail fast with [`StoreError::Timeout`] or
/// [`StoreError::Cancelled`] instead of outliving the request.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Derives a context that is cancelled with its parent and keeps the
    /// earlier of the two deadlines.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            deadline,
            cancel: self.cancel.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `fut` under this context.
    ///
    /// `op` names the operation in the resulting error message.
    pub async fn guard<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled(op.to_string()));
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(StoreError::Cancelled(op.to_string())),
                    result = tokio::time::timeout_at(deadline, fut) => match result {
                        Ok(inner) => inner,
                        Err(_) => Err(StoreError::Timeout(format!("{op} exceeded the request deadline"))),
                    },
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(StoreError::Cancelled(op.to_string())),
                    result = fut => result,
                }
            }
        }
    }
}
