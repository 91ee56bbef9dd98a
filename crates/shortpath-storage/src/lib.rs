//! Key-value store backends for the shortpath allocator.

pub mod memory;
pub mod redis;

pub use memory::InMemoryStore;
pub use self::redis::RedisStore;
