mod metrics;
mod url;

pub use metrics::metrics_handler;
pub use url::{create_short_path_handler, redirect_handler};
