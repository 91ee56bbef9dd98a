use thiserror::Error;

/// Failure while bringing up or talking to a disposable test backend.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to run test container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("failed to reach test Redis: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
