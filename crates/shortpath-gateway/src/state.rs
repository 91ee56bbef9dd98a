use shortpath_allocator::Allocator;
use shortpath_core::Context;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    allocator: Arc<dyn Allocator>,
    base_url: Arc<str>,
    request_timeout: Duration,
    top_domains: usize,
}

impl AppState {
    pub fn new(
        allocator: Arc<dyn Allocator>,
        public_base_url: impl Into<String>,
        request_timeout: Duration,
        top_domains: usize,
    ) -> Self {
        Self {
            allocator,
            base_url: Arc::from(public_base_url.into()),
            request_timeout,
            top_domains,
        }
    }

    pub fn allocator(&self) -> &dyn Allocator {
        self.allocator.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn top_domains(&self) -> usize {
        self.top_domains
    }

    /// Fresh context bounded by the configured request timeout.
    pub fn request_context(&self) -> Context {
        Context::with_timeout(self.request_timeout)
    }
}
