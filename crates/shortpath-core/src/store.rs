use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A minimal string key-value store.
///
/// The allocator uses two independent instances as opposite-direction
/// indexes. Implementations must be safe for concurrent use and must keep
/// distinct instances from colliding even when they share one physical
/// backend (for example by namespacing keys).
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Stores `value` under `key`, overwriting any previous value.
    async fn put(&self, ctx: &Context, key: &str, value: &str) -> Result<()>;

    /// Returns the value stored under `key`.
    ///
    /// A missing key is reported as [`StoreError::NotFound`], never as an
    /// empty value.
    ///
    /// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
    async fn get(&self, ctx: &Context, key: &str) -> Result<String>;

    /// Checks whether `key` is present.
    async fn exists(&self, ctx: &Context, key: &str) -> Result<bool>;

    /// Removes `key`. It is not an error if the key does not exist.
    async fn delete(&self, ctx: &Context, key: &str) -> Result<()>;
}

/// Lets a shared handle stand in for the store it points to.
#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn put(&self, ctx: &Context, key: &str, value: &str) -> Result<()> {
        (**self).put(ctx, key, value).await
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        (**self).get(ctx, key).await
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<bool> {
        (**self).exists(ctx, key).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).delete(ctx, key).await
    }
}
