use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SHORTPATH_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "SHORTPATH_PUBLIC_BASE_URL";
pub const LOG_LEVEL_ENV: &str = "SHORTPATH_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "SHORTPATH_LOG_FORMAT";
pub const STORAGE_BACKEND_ENV: &str = "SHORTPATH_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "SHORTPATH_REDIS_URL";
pub const FORWARD_NAMESPACE_ENV: &str = "SHORTPATH_FORWARD_NAMESPACE";
pub const REVERSE_NAMESPACE_ENV: &str = "SHORTPATH_REVERSE_NAMESPACE";
pub const GENERATOR_MIN_LENGTH_ENV: &str = "SHORTPATH_GENERATOR_MIN_LENGTH";
pub const GENERATOR_MAX_LENGTH_ENV: &str = "SHORTPATH_GENERATOR_MAX_LENGTH";
pub const GENERATOR_CHARSET_ENV: &str = "SHORTPATH_GENERATOR_CHARSET";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "SHORTPATH_REQUEST_TIMEOUT_MS";
pub const TOP_DOMAINS_ENV: &str = "SHORTPATH_TOP_DOMAINS";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_FORWARD_NAMESPACE: &str = "short";
pub const DEFAULT_REVERSE_NAMESPACE: &str = "target";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_TOP_DOMAINS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "shortpath-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix for the `short_url` returned on creation.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    /// Filter directive, overridden by `RUST_LOG` when set.
    #[arg(long, env = LOG_LEVEL_ENV, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = FORWARD_NAMESPACE_ENV, default_value = DEFAULT_FORWARD_NAMESPACE)]
    pub forward_namespace: String,

    #[arg(long, env = REVERSE_NAMESPACE_ENV, default_value = DEFAULT_REVERSE_NAMESPACE)]
    pub reverse_namespace: String,

    #[arg(long, env = GENERATOR_MIN_LENGTH_ENV, default_value_t = 4)]
    pub generator_min_length: usize,

    #[arg(long, env = GENERATOR_MAX_LENGTH_ENV, default_value_t = 7)]
    pub generator_max_length: usize,

    #[arg(long, env = GENERATOR_CHARSET_ENV, default_value = shortpath_generator::random::DEFAULT_CHARSET)]
    pub generator_charset: String,

    /// Deadline applied to the store calls of each request.
    #[arg(long, env = REQUEST_TIMEOUT_MS_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// Number of domains listed by `GET /metrics`.
    #[arg(long, env = TOP_DOMAINS_ENV, default_value_t = DEFAULT_TOP_DOMAINS)]
    pub top_domains: usize,
}
