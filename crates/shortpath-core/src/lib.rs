//! Core types and traits for the shortpath allocator.
//!
//! This crate provides the validated identifiers, the key-value store
//! contract and the request context shared by the storage backends, the
//! allocation service and the HTTP gateway.

pub mod context;
pub mod error;
pub mod short_path;
pub mod store;
pub mod target_url;

pub use context::Context;
pub use error::{StoreError, ValidationError};
pub use short_path::ShortPath;
pub use store::KvStore;
pub use target_url::TargetUrl;
