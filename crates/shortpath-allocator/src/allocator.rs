use crate::error::AllocError;
use async_trait::async_trait;
use shortpath_core::{Context, ShortPath};
use shortpath_metrics::KeyCount;

/// Bidirectional short path registry as seen by the request boundary.
#[async_trait]
pub trait Allocator: Send + Sync + 'static {
    /// Maps `target_url` to a short path and returns it.
    ///
    /// `short_path` requests a specific path; `None` or an empty string asks
    /// for a generated one. An existing mapping for either side is reused.
    async fn allocate(
        &self,
        ctx: &Context,
        short_path: Option<&str>,
        target_url: &str,
    ) -> Result<ShortPath, AllocError>;

    /// Returns the target URL stored for `short_path`.
    async fn resolve(&self, ctx: &Context, short_path: &str) -> Result<String, AllocError>;

    /// Most frequently shortened domains, highest count first.
    fn top_domains(&self, n: usize) -> Vec<KeyCount>;
}
