use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("collector '{0}' is stopped")]
    Stopped(String),
}
