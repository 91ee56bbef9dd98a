//! In-memory frequency tracking for the shortpath reporting endpoint.
//!
//! A [`Metrics`] registry hands out named [`Collector`]s. Each collector owns
//! a [`CountHeap`] that is only ever mutated by one worker task draining a
//! bounded queue; producers await when the queue is full, so no increment is
//! dropped.

pub mod collector;
pub mod error;
pub mod heap;
pub mod metrics;

pub use collector::Collector;
pub use error::MetricsError;
pub use heap::{CountHeap, KeyCount};
pub use metrics::{Metrics, DOMAIN_SHORTENS};
