mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;
mod telemetry;

use crate::app::App;
use crate::cli::{StorageBackendArg, CLI};
use crate::state::AppState;
use clap::Parser;
use shortpath_allocator::{AllocationService, Allocator, AllocatorSettings};
use shortpath_generator::{GeneratorSettings, RandomGenerator};
use shortpath_metrics::{Metrics, DOMAIN_SHORTENS};
use shortpath_storage::redis::connect;
use shortpath_storage::{InMemoryStore, RedisStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;
    telemetry::init(&config.log_level, config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        public_base_url = %config.public_base_url,
        "starting shortpath gateway"
    );

    let generator = RandomGenerator::new(
        GeneratorSettings::builder()
            .min_length(config.generator_min_length)
            .max_length(config.generator_max_length)
            .charset(config.generator_charset.clone())
            .build(),
    )?;
    let metrics = Metrics::new();
    let domains = metrics.collector(DOMAIN_SHORTENS)?;
    let settings = AllocatorSettings::default();

    let allocator: Arc<dyn Allocator> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(AllocationService::new(
            InMemoryStore::new(),
            InMemoryStore::new(),
            generator,
            domains,
            settings,
        )),
        StorageBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .ok_or("redis url is required when storage backend is redis")?;
            let conn = connect(redis_url).await?;
            Arc::new(AllocationService::new(
                RedisStore::new(conn.clone(), config.forward_namespace.as_str()),
                RedisStore::new(conn, config.reverse_namespace.as_str()),
                generator,
                domains,
                settings,
            ))
        }
    };

    let state = AppState::new(
        allocator,
        config.public_base_url,
        Duration::from_millis(config.request_timeout_ms),
        config.top_domains,
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    metrics.shutdown().await;
    info!("gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
