use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ROLLBACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Tunables for [`AllocationService`](crate::AllocationService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct AllocatorSettings {
    /// Generated candidates tried before giving up, including the first.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Budget for deleting the forward mapping after a failed reverse write.
    /// Applied to a fresh context so it runs even when the request is gone.
    #[builder(default = DEFAULT_ROLLBACK_TIMEOUT)]
    pub rollback_timeout: Duration,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
