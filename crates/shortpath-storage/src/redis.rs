use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use shortpath_core::error::Result;
use shortpath_core::{Context, KvStore, StoreError};
use tracing::{debug, trace, warn};

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

/// Opens a multiplexed connection and checks it with `PING`.
pub async fn connect(redis_url: &str) -> Result<MultiplexedConnection> {
    let client = redis::Client::open(redis_url)
        .map_err(|e| map_redis_error("failed to open Redis client", e))?;
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

    let pong: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| map_redis_error("failed to ping Redis", e))?;
    debug!(reply = %pong, "Redis connection established");

    Ok(conn)
}

/// A Redis-backed implementation of [`KvStore`].
///
/// Every key is stored as `<namespace>:<key>`, so a forward and a reverse
/// store can share one Redis database without colliding.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisStore {
    /// Creates a new Redis store.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `namespace` - Prefix applied to every key (e.g., "short")
    pub fn new(conn: MultiplexedConnection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn put(&self, _ctx: &Context, key: &str, value: &str) -> Result<()> {
        let key = self.namespaced(key);
        trace!(key = %key, "Writing value to Redis");

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&key, value).await.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to write value to Redis");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn get(&self, _ctx: &Context, key: &str) -> Result<String> {
        let key = self.namespaced(key);
        trace!(key = %key, "Fetching value from Redis");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                trace!(key = %key, "Key not found in Redis");
                Err(StoreError::NotFound)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn exists(&self, _ctx: &Context, key: &str) -> Result<bool> {
        let key = self.namespaced(key);

        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on exists");
            map_redis_error("failed to check key in Redis", e)
        })
    }

    async fn delete(&self, _ctx: &Context, key: &str) -> Result<()> {
        let key = self.namespaced(key);
        trace!(key = %key, "Removing key from Redis");

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to remove key from Redis");
            map_redis_error("failed to delete value from Redis", e)
        })
    }
}

// Tests that need a running Redis live in tests/redis_store_integration.rs.
