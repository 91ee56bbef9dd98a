use crate::allocator::Allocator;
use crate::error::{AllocError, ServerFault};
use crate::settings::AllocatorSettings;
use async_trait::async_trait;
use shortpath_core::{Context, KvStore, ShortPath, StoreError, TargetUrl};
use shortpath_generator::Generator;
use shortpath_metrics::{Collector, KeyCount};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

const MAPPING_NOT_FOUND: &str = "shortpath mapping not found";
const LOOKUP_FAILED: &str = "could not lookup shortpath";
const TARGET_LOOKUP_FAILED: &str = "could not lookup target url";
const WRITE_FAILED: &str = "could not save shortpath";
const EXHAUSTED: &str = "could not find available short path";
const ROLLBACK_FAILED: &str = "could not roll back partial shortpath";

/// Default [`Allocator`] over a pair of key-value stores.
///
/// `forward` maps short path to target URL, `reverse` maps normalized
/// target URL to short path. Nothing else writes to them.
///
/// The collision check and the two writes are not atomic. Two requests can
/// pass the check for the same generated path, and two requests for the same
/// new target can both allocate; both races are accepted.
#[derive(Debug, Clone)]
pub struct AllocationService<S, G> {
    forward: Arc<S>,
    reverse: Arc<S>,
    generator: Arc<G>,
    domains: Collector,
    settings: AllocatorSettings,
}

impl<S: KvStore, G: Generator> AllocationService<S, G> {
    pub fn new(
        forward: S,
        reverse: S,
        generator: G,
        domains: Collector,
        settings: AllocatorSettings,
    ) -> Self {
        Self {
            forward: Arc::new(forward),
            reverse: Arc::new(reverse),
            generator: Arc::new(generator),
            domains,
            settings,
        }
    }

    /// Returns the short path already mapped to `target`, if any.
    async fn existing_for_target(
        &self,
        ctx: &Context,
        target: &TargetUrl,
    ) -> Result<Option<ShortPath>, AllocError> {
        match ctx
            .guard("get", self.reverse.get(ctx, target.as_str()))
            .await
        {
            Ok(path) => Ok(Some(ShortPath::new_unchecked(path))),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(AllocError::server(TARGET_LOOKUP_FAILED, e)),
        }
    }

    async fn is_taken(&self, ctx: &Context, path: &ShortPath) -> Result<bool, AllocError> {
        ctx.guard("exists", self.forward.exists(ctx, path.as_str()))
            .await
            .map_err(|e| AllocError::server(LOOKUP_FAILED, e))
    }

    /// Draws candidates until one is free, up to `max_attempts` draws.
    async fn claim_generated(&self, ctx: &Context) -> Result<ShortPath, AllocError> {
        let mut attempts = 0;
        while attempts < self.settings.max_attempts {
            attempts += 1;
            let candidate: ShortPath = self.generator.generate().into();

            if candidate.is_reserved() {
                trace!(short_path = %candidate, attempts, "Generated a reserved path");
                continue;
            }
            if !self.is_taken(ctx, &candidate).await? {
                return Ok(candidate);
            }
            debug!(short_path = %candidate, attempts, "Generated path already taken");
        }

        warn!(attempts, "No free short path found");
        Err(AllocError::server(
            EXHAUSTED,
            ServerFault::Exhausted { attempts },
        ))
    }

    /// Stores both directions of `path <-> target`.
    ///
    /// Runs on its own task so the writes and any rollback finish even if
    /// the caller stops polling halfway.
    async fn write_mapping(
        &self,
        ctx: &Context,
        path: &ShortPath,
        target: &TargetUrl,
    ) -> Result<(), AllocError> {
        let writer = MappingWriter {
            forward: Arc::clone(&self.forward),
            reverse: Arc::clone(&self.reverse),
            rollback_timeout: self.settings.rollback_timeout,
        };
        let (ctx, path, target) = (ctx.clone(), path.clone(), target.clone());

        tokio::spawn(async move { writer.write(&ctx, &path, &target).await })
            .await
            .map_err(|e| {
                error!(error = %e, "Mapping write task failed");
                AllocError::server(
                    WRITE_FAILED,
                    StoreError::Operation(format!("write task failed: {e}")),
                )
            })?
    }
}

/// The forward write, reverse write and compensation of one allocation.
struct MappingWriter<S> {
    forward: Arc<S>,
    reverse: Arc<S>,
    rollback_timeout: Duration,
}

impl<S: KvStore> MappingWriter<S> {
    async fn write(
        &self,
        ctx: &Context,
        path: &ShortPath,
        target: &TargetUrl,
    ) -> Result<(), AllocError> {
        ctx.guard("put", self.forward.put(ctx, path.as_str(), target.as_str()))
            .await
            .map_err(|e| AllocError::server(WRITE_FAILED, e))?;

        match ctx
            .guard("put", self.reverse.put(ctx, target.as_str(), path.as_str()))
            .await
        {
            Ok(()) => Ok(()),
            Err(cause) => Err(self.roll_back(path, cause).await),
        }
    }

    /// Removes the forward mapping after the reverse write failed.
    async fn roll_back(&self, path: &ShortPath, cause: StoreError) -> AllocError {
        let rollback_ctx = Context::with_timeout(self.rollback_timeout);

        match rollback_ctx
            .guard("delete", self.forward.delete(&rollback_ctx, path.as_str()))
            .await
        {
            Ok(()) => {
                warn!(short_path = %path, error = %cause, "Reverse write failed, forward mapping rolled back");
                AllocError::server(WRITE_FAILED, cause)
            }
            Err(rollback) => {
                error!(
                    short_path = %path,
                    error = %cause,
                    rollback_error = %rollback,
                    compensation_failed = true,
                    "Forward mapping left without its reverse mapping"
                );
                AllocError::server(ROLLBACK_FAILED, ServerFault::Compensation { cause, rollback })
            }
        }
    }
}

#[async_trait]
impl<S: KvStore, G: Generator> Allocator for AllocationService<S, G> {
    async fn allocate(
        &self,
        ctx: &Context,
        short_path: Option<&str>,
        target_url: &str,
    ) -> Result<ShortPath, AllocError> {
        let target = TargetUrl::parse(target_url)?;
        let requested = match short_path.filter(|p| !p.is_empty()) {
            Some(p) => Some(ShortPath::parse(p)?),
            None => None,
        };

        if let Some(path) = &requested {
            match ctx.guard("get", self.forward.get(ctx, path.as_str())).await {
                Ok(existing) if existing == target.as_str() => {
                    debug!(short_path = %path, target_url = %target, "Short path already maps to target");
                    return Ok(path.clone());
                }
                Ok(_) => {
                    return Err(AllocError::Conflict(format!(
                        "short_path '{path}' is already in use"
                    )));
                }
                Err(StoreError::NotFound) => {}
                Err(e) => return Err(AllocError::server(LOOKUP_FAILED, e)),
            }
        }

        if let Some(existing) = self.existing_for_target(ctx, &target).await? {
            debug!(short_path = %existing, target_url = %target, "Reusing short path for target");
            return Ok(existing);
        }

        let path = match requested {
            Some(path) => {
                if self.is_taken(ctx, &path).await? {
                    return Err(AllocError::Conflict(format!(
                        "short_path '{path}' is already in use"
                    )));
                }
                path
            }
            None => self.claim_generated(ctx).await?,
        };

        self.write_mapping(ctx, &path, &target).await?;
        debug!(short_path = %path, target_url = %target, "Allocated short path");

        if let Err(e) = self.domains.inc(target.domain()).await {
            warn!(error = %e, domain = %target.domain(), "Domain not counted");
        }

        Ok(path)
    }

    async fn resolve(&self, ctx: &Context, short_path: &str) -> Result<String, AllocError> {
        match ctx.guard("get", self.forward.get(ctx, short_path)).await {
            Ok(target) => Ok(target),
            Err(StoreError::NotFound) => Err(AllocError::NotFound(MAPPING_NOT_FOUND.to_string())),
            Err(e) => {
                debug!(short_path, error = %e, "Lookup failed");
                Err(AllocError::server(LOOKUP_FAILED, e))
            }
        }
    }

    fn top_domains(&self, n: usize) -> Vec<KeyCount> {
        self.domains.top(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use shortpath_core::ValidationError;
    use shortpath_generator::{GeneratorSettings, RandomGenerator};
    use shortpath_metrics::{Metrics, DOMAIN_SHORTENS};
    use shortpath_storage::InMemoryStore;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

    /// In-memory store with switchable failures and write counters.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        puts: AtomicUsize,
        fail_get: AtomicBool,
        hide_get: AtomicBool,
        fail_put: AtomicBool,
        fail_delete: AtomicBool,
        hang_put: AtomicBool,
        put_delay_ms: AtomicU64,
    }

    impl FlakyStore {
        fn puts(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    fn injected(op: &str) -> StoreError {
        StoreError::Unavailable(format!("injected {op} failure"))
    }

    #[async_trait]
    impl KvStore for FlakyStore {
        async fn put(&self, ctx: &Context, key: &str, value: &str) -> shortpath_core::error::Result<()> {
            if self.hang_put.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            let delay = self.put_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(injected("put"));
            }
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(ctx, key, value).await
        }

        async fn get(&self, ctx: &Context, key: &str) -> shortpath_core::error::Result<String> {
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(injected("get"));
            }
            if self.hide_get.load(Ordering::SeqCst) {
                return Err(StoreError::NotFound);
            }
            self.inner.get(ctx, key).await
        }

        async fn exists(&self, ctx: &Context, key: &str) -> shortpath_core::error::Result<bool> {
            self.inner.exists(ctx, key).await
        }

        async fn delete(&self, ctx: &Context, key: &str) -> shortpath_core::error::Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(injected("delete"));
            }
            self.inner.delete(ctx, key).await
        }
    }

    /// Always proposes the same path and counts how often it was asked.
    #[derive(Debug)]
    struct FixedGenerator {
        path: &'static str,
        calls: AtomicU32,
    }

    impl FixedGenerator {
        fn new(path: &'static str) -> Self {
            Self {
                path,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Generator for FixedGenerator {
        type Output = ShortPath;

        fn generate(&self) -> ShortPath {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ShortPath::new_unchecked(self.path)
        }
    }

    struct Harness<G> {
        service: AllocationService<Arc<FlakyStore>, G>,
        forward: Arc<FlakyStore>,
        reverse: Arc<FlakyStore>,
        metrics: Metrics,
    }

    fn harness_with<G: Generator>(generator: G) -> Harness<G> {
        let forward = Arc::new(FlakyStore::default());
        let reverse = Arc::new(FlakyStore::default());
        let metrics = Metrics::new();
        let service = AllocationService::new(
            Arc::clone(&forward),
            Arc::clone(&reverse),
            generator,
            metrics.collector(DOMAIN_SHORTENS).unwrap(),
            AllocatorSettings::default(),
        );
        Harness {
            service,
            forward,
            reverse,
            metrics,
        }
    }

    fn harness() -> Harness<RandomGenerator> {
        harness_with(RandomGenerator::new(GeneratorSettings::default()).unwrap())
    }

    #[tokio::test]
    async fn allocates_generated_path() {
        let h = harness();
        let ctx = Context::background();

        let path = h
            .service
            .allocate(&ctx, None, "https://example.com/page")
            .await
            .unwrap();

        assert!((4..=7).contains(&path.as_str().len()));
        assert_eq!(
            h.service.resolve(&ctx, path.as_str()).await.unwrap(),
            "https://example.com/page"
        );
    }

    #[tokio::test]
    async fn allocate_is_idempotent() {
        let h = harness();
        let ctx = Context::background();

        let first = h
            .service
            .allocate(&ctx, Some("abc123"), "https://a.com")
            .await
            .unwrap();
        let writes = h.forward.puts() + h.reverse.puts();

        let second = h
            .service
            .allocate(&ctx, Some("abc123"), "https://a.com")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(writes, 2);
        assert_eq!(h.forward.puts() + h.reverse.puts(), writes);
    }

    #[tokio::test]
    async fn empty_short_path_reuses_target_mapping() {
        let h = harness();
        let ctx = Context::background();

        let path = h
            .service
            .allocate(&ctx, None, "https://docs.rs/")
            .await
            .unwrap();
        let again = h
            .service
            .allocate(&ctx, Some(""), "https://docs.rs")
            .await
            .unwrap();

        assert_eq!(path, again);
        assert_eq!(h.forward.puts(), 1);
    }

    #[tokio::test]
    async fn supplied_path_is_ignored_when_target_is_mapped() {
        let h = harness();
        let ctx = Context::background();

        let original = h
            .service
            .allocate(&ctx, Some("first"), "https://a.com")
            .await
            .unwrap();
        let reused = h
            .service
            .allocate(&ctx, Some("second"), "https://a.com")
            .await
            .unwrap();

        assert_eq!(original.as_str(), "first");
        assert_eq!(reused.as_str(), "first");
        assert!(matches!(
            h.service.resolve(&ctx, "second").await,
            Err(AllocError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn conflicting_short_path() {
        let h = harness();
        let ctx = Context::background();

        h.service
            .allocate(&ctx, Some("abc123"), "https://a.com")
            .await
            .unwrap();
        let err = h
            .service
            .allocate(&ctx, Some("abc123"), "https://b.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            h.service.resolve(&ctx, "abc123").await.unwrap(),
            "https://a.com"
        );
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let h = harness();
        let ctx = Context::background();
        let long = "a".repeat(51);

        let cases = [
            (Some("metrics"), "https://a.com", ValidationError::ShortPathReserved),
            (Some("a/b"), "https://a.com", ValidationError::ShortPathDisallowedChars),
            (Some(long.as_str()), "https://a.com", ValidationError::ShortPathTooLong),
            (Some(" abc"), "https://a.com", ValidationError::ShortPathPadded),
            (None, " https://a.com", ValidationError::TargetUrlPadded),
            (None, "ftp://hello", ValidationError::TargetUrlInvalid),
            (None, "://www.google.com", ValidationError::TargetUrlInvalid),
        ];

        for (path, target, expected) in cases {
            match h.service.allocate(&ctx, path, target).await {
                Err(AllocError::Validation(e)) => assert_eq!(e, expected, "{path:?} {target}"),
                other => panic!("expected validation error for {path:?} {target}, got {other:?}"),
            }
        }
        assert_eq!(h.forward.puts() + h.reverse.puts(), 0);
    }

    #[tokio::test]
    async fn generated_paths_differ_per_target() {
        let h = harness();
        let ctx = Context::background();

        let mut paths = HashSet::new();
        for i in 0..50 {
            let target = format!("https://site{i}.example.com");
            let path = h.service.allocate(&ctx, None, &target).await.unwrap();
            assert!(paths.insert(path), "path reused for {target}");
        }
    }

    #[tokio::test]
    async fn collision_budget_is_exhausted() {
        let generator = Arc::new(FixedGenerator::new("taken"));
        let h = harness_with(Arc::clone(&generator));
        let ctx = Context::background();

        h.service
            .allocate(&ctx, Some("taken"), "https://first.com")
            .await
            .unwrap();
        let err = h
            .service
            .allocate(&ctx, None, "https://second.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(matches!(
            err,
            AllocError::Server {
                fault: ServerFault::Exhausted { attempts: 3 },
                ..
            }
        ));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.to_string(), "could not find available short path");
    }

    #[tokio::test]
    async fn reserved_candidate_counts_as_collision() {
        let generator = Arc::new(FixedGenerator::new("metrics"));
        let h = harness_with(Arc::clone(&generator));
        let ctx = Context::background();

        let err = h
            .service
            .allocate(&ctx, None, "https://a.com")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AllocError::Server {
                fault: ServerFault::Exhausted { attempts: 3 },
                ..
            }
        ));
        assert_eq!(h.forward.puts(), 0);
    }

    #[tokio::test]
    async fn existence_check_catches_taken_supplied_path() {
        let h = harness();
        let ctx = Context::background();

        h.forward
            .inner
            .put(&ctx, "shared", "https://a.com")
            .await
            .unwrap();
        // Reuse lookup misses, so only the pre-write check sees the entry.
        h.forward.hide_get.store(true, Ordering::SeqCst);

        let err = h
            .service
            .allocate(&ctx, Some("shared"), "https://b.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(h.forward.puts(), 0);
    }

    #[tokio::test]
    async fn reverse_write_failure_rolls_back_forward() {
        let h = harness();
        let ctx = Context::background();
        h.reverse.fail_put.store(true, Ordering::SeqCst);

        let err = h
            .service
            .allocate(&ctx, Some("abc123"), "https://a.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(!err.is_compensation_failure());
        assert!(matches!(
            err,
            AllocError::Server {
                fault: ServerFault::Store(StoreError::Unavailable(_)),
                ..
            }
        ));
        assert!(h.forward.inner.is_empty());
        assert!(matches!(
            h.service.resolve(&ctx, "abc123").await,
            Err(AllocError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_rollback_is_reported() {
        let h = harness();
        let ctx = Context::background();
        h.reverse.fail_put.store(true, Ordering::SeqCst);
        h.forward.fail_delete.store(true, Ordering::SeqCst);

        let err = h
            .service
            .allocate(&ctx, Some("abc123"), "https://a.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(err.is_compensation_failure());
        assert_eq!(h.forward.inner.len(), 1);
    }

    #[tokio::test]
    async fn forward_write_failure_leaves_nothing() {
        let h = harness();
        let ctx = Context::background();
        h.forward.fail_put.store(true, Ordering::SeqCst);

        let err = h
            .service
            .allocate(&ctx, None, "https://a.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(h.forward.inner.is_empty());
        assert!(h.reverse.inner.is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_fails_as_server_error() {
        let h = harness();
        let ctx = Context::background();
        ctx.cancel();

        let err = h
            .service
            .allocate(&ctx, None, "https://a.com")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AllocError::Server {
                fault: ServerFault::Store(StoreError::Cancelled(_)),
                ..
            }
        ));
        assert!(h.forward.inner.is_empty());
    }

    #[tokio::test]
    async fn deadline_interrupts_hung_write() {
        let h = harness();
        h.forward.hang_put.store(true, Ordering::SeqCst);
        let ctx = Context::with_timeout(Duration::from_millis(20));

        let err = h
            .service
            .allocate(&ctx, None, "https://a.com")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AllocError::Server {
                fault: ServerFault::Store(StoreError::Timeout(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn resolve_missing_and_failing() {
        let h = harness();
        let ctx = Context::background();

        let err = h.service.resolve(&ctx, "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "shortpath mapping not found");

        h.forward.fail_get.store(true, Ordering::SeqCst);
        let err = h.service.resolve(&ctx, "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.to_string(), "could not lookup shortpath");
    }

    #[tokio::test]
    async fn new_allocations_feed_domain_counts() {
        let h = harness();
        let ctx = Context::background();

        for target in [
            "https://github.com/a",
            "https://www.github.com/b",
            "https://github.com/c",
            "https://google.com/a",
            "https://google.com/b",
            "https://facebook.com",
        ] {
            h.service.allocate(&ctx, None, target).await.unwrap();
        }
        // Reuse does not count again.
        h.service
            .allocate(&ctx, None, "https://facebook.com/")
            .await
            .unwrap();
        h.metrics.shutdown().await;

        let top: Vec<_> = h
            .service
            .top_domains(3)
            .into_iter()
            .map(|kc| (kc.key, kc.count))
            .collect();
        assert_eq!(
            top,
            vec![
                ("github.com".to_string(), 3),
                ("google.com".to_string(), 2),
                ("facebook.com".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn stopped_tracker_does_not_fail_allocation() {
        let h = harness();
        let ctx = Context::background();
        h.metrics.shutdown().await;

        let path = h
            .service
            .allocate(&ctx, None, "https://a.com")
            .await
            .unwrap();
        assert_eq!(
            h.service.resolve(&ctx, path.as_str()).await.unwrap(),
            "https://a.com"
        );
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let h = harness();
        let allocator: Arc<dyn Allocator> = Arc::new(h.service);
        let ctx = Context::background();

        let path = allocator
            .allocate(&ctx, Some("dyn"), "https://a.com")
            .await
            .unwrap();
        assert_eq!(allocator.resolve(&ctx, path.as_str()).await.unwrap(), "https://a.com");
    }

    #[tokio::test]
    async fn abandoned_allocation_still_rolls_back() {
        let h = harness();
        let ctx = Context::background();
        h.forward.put_delay_ms.store(100, Ordering::SeqCst);
        h.reverse.put_delay_ms.store(100, Ordering::SeqCst);
        h.reverse.fail_put.store(true, Ordering::SeqCst);

        // Give up while the reverse write is in flight.
        let abandoned = tokio::time::timeout(
            Duration::from_millis(150),
            h.service.allocate(&ctx, Some("orphan"), "https://a.com"),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(matches!(
            h.service.resolve(&ctx, "orphan").await,
            Err(AllocError::NotFound(_))
        ));
        assert!(h.forward.inner.is_empty());
    }

    #[tokio::test]
    async fn abandoned_allocation_completes_both_directions() {
        let h = harness();
        let ctx = Context::background();
        h.forward.put_delay_ms.store(100, Ordering::SeqCst);
        h.reverse.put_delay_ms.store(100, Ordering::SeqCst);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(150),
            h.service.allocate(&ctx, Some("orphan"), "https://a.com"),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            h.service.resolve(&ctx, "orphan").await.unwrap(),
            "https://a.com"
        );
        assert_eq!(
            h.reverse.inner.get(&ctx, "https://a.com").await.unwrap(),
            "orphan"
        );
    }
}
