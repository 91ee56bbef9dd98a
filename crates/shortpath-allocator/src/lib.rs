//! Short path allocation.
//!
//! [`AllocationService`] owns the forward (path to target) and reverse
//! (target to path) stores and keeps them consistent: it validates input,
//! reuses existing mappings, claims a free path and writes both directions,
//! rolling the forward write back when the reverse write fails.

pub mod allocator;
pub mod error;
pub mod service;
pub mod settings;

pub use allocator::Allocator;
pub use error::{AllocError, ErrorKind, ServerFault};
pub use service::AllocationService;
pub use settings::AllocatorSettings;
