//! Cache manager lifecycle: install, fetch interception, activate
//!
//! One manager embodies one manifest version. The hosting environment (the
//! CLI, or an embedding application) drives the three entry points; the
//! manager itself never decides when a new version ships.
//!
//! Policy is cache-first with no racing: lookup always completes before any
//! network attempt, and a hit never touches the network at all. A miss is
//! forwarded unmodified and, by default, not written back.

use crate::asset::{AssetRequest, Method, StoredResponse};
use crate::error::{LarderError, LarderResult};
use crate::manifest::Manifest;
use crate::store::{GenerationState, GenerationStore};
use crate::transport::Transport;
use futures_util::future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a successful install
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Version identifier of the populated generation
    pub version: String,
    /// Number of assets stored
    pub entries: usize,
    /// Total body bytes stored
    pub bytes: u64,
}

/// Outcome of a successful activate
#[derive(Debug, Clone)]
pub struct ActivateReport {
    /// Version identifier now serving reads
    pub version: String,
    /// Names of the generations evicted
    pub evicted: Vec<String>,
}

/// The asset cache manager
pub struct CacheManager {
    manifest: Manifest,
    store: Arc<dyn GenerationStore>,
    transport: Arc<dyn Transport>,
}

impl CacheManager {
    /// Create a manager for one manifest version
    pub fn new(
        manifest: Manifest,
        store: Arc<dyn GenerationStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            manifest,
            store,
            transport,
        }
    }

    /// The version identifier this manager serves
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// Install: populate a generation with every manifest asset.
    ///
    /// All-or-nothing. Assets are fetched concurrently; if any fetch fails or
    /// comes back non-2xx, the staged generation is discarded wholesale and
    /// nothing is promoted. The previously complete generation (if any)
    /// keeps serving reads untouched.
    pub async fn install(&self) -> LarderResult<InstallReport> {
        let version = self.manifest.version.clone();
        let requests = self.manifest.asset_requests()?;
        info!(
            version = %version,
            assets = requests.len(),
            "installing generation"
        );

        self.store.begin(&version).await?;

        let fetches = requests.iter().map(|r| self.transport.fetch(r));
        let results = future::join_all(fetches).await;

        let mut fetched = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(results) {
            let failure = match result {
                Ok(response) if response.is_success() => {
                    fetched.push((request, response));
                    continue;
                }
                Ok(response) => format!("status {}", response.status),
                Err(e) => e.to_string(),
            };

            self.store.discard(&version).await?;
            warn!(version = %version, url = %request.url, "install failed: {}", failure);
            return Err(LarderError::InstallFailed {
                version,
                url: request.url.to_string(),
                reason: failure,
            });
        }

        let mut bytes = 0u64;
        for (request, response) in &fetched {
            bytes += response.body.len() as u64;
            self.store.put(&version, &request.key(), response).await?;
        }
        self.store.commit(&version).await?;

        info!(version = %version, entries = fetched.len(), bytes, "generation installed");
        Ok(InstallReport {
            version,
            entries: fetched.len(),
            bytes,
        })
    }

    /// Fetch interception: serve from cache, else forward to the network.
    ///
    /// The lookup targets the complete generation named by the manifest
    /// version; an in-progress install of the same name is invisible here.
    /// A miss with an unreachable network propagates the network error to
    /// the caller; no synthetic fallback content is generated.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> LarderResult<StoredResponse> {
        let key = request.key();

        if let Some(response) = self.store.get(&self.manifest.version, &key).await? {
            debug!(url = %request.url, "serving from cache");
            return Ok(response);
        }

        debug!(url = %request.url, "cache miss, forwarding to network");
        let response = self.transport.fetch(request).await?;

        if self.manifest.policy.store_on_miss
            && request.method == Method::Get
            && response.is_success()
        {
            // Opportunistic write: never fails the fetch itself
            if let Err(e) = self.store.put(&self.manifest.version, &key, &response).await {
                warn!(url = %request.url, "store-on-miss write failed: {}", e);
            }
        }

        Ok(response)
    }

    /// Activate: evict every generation other than this manager's.
    ///
    /// Requires a completed install of the manifest version. Eviction is
    /// wholesale per generation; a deletion failure is logged and skipped,
    /// since leftover generations cost storage but never serve reads.
    /// Re-activating the already-active version is a no-op.
    pub async fn activate(&self) -> LarderResult<ActivateReport> {
        let version = self.manifest.version.clone();

        if !self.store.contains(&version).await? {
            return Err(LarderError::ActivateIncomplete { version });
        }

        let mut evicted = Vec::new();
        for generation in self.store.list().await? {
            if generation.name == version && generation.state == GenerationState::Complete {
                continue;
            }

            info!(generation = %generation.name, "evicting old generation");
            let result = match generation.state {
                GenerationState::Installing => self.store.discard(&generation.name).await,
                GenerationState::Complete => self.store.remove(&generation.name).await,
            };
            match result {
                Ok(()) => evicted.push(generation.name),
                Err(e) => {
                    warn!(generation = %generation.name, "eviction failed: {}", e);
                }
            }
        }

        info!(version = %version, evicted = evicted.len(), "generation active");
        Ok(ActivateReport { version, evicted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{NetworkConfig, PolicyConfig};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const ORIGIN: &str = "https://shop.example";

    fn manifest(version: &str, assets: &[&str]) -> Manifest {
        Manifest {
            version: version.to_string(),
            origin: ORIGIN.to_string(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
            policy: PolicyConfig::default(),
            network: NetworkConfig::default(),
        }
    }

    fn request(path: &str) -> AssetRequest {
        AssetRequest::get(Url::parse(&format!("{}{}", ORIGIN, path)).unwrap())
    }

    /// Scripted transport: per-URL responses, with a call counter
    struct FakeTransport {
        responses: HashMap<String, Result<StoredResponse, String>>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn ok(mut self, path: &str, body: &[u8]) -> Self {
            self.responses.insert(
                format!("{}{}", ORIGIN, path),
                Ok(StoredResponse::new(200, vec![], body.to_vec())),
            );
            self
        }

        fn status(mut self, path: &str, status: u16) -> Self {
            self.responses.insert(
                format!("{}{}", ORIGIN, path),
                Ok(StoredResponse::new(status, vec![], vec![])),
            );
            self
        }

        fn unreachable(mut self, path: &str) -> Self {
            self.responses.insert(
                format!("{}{}", ORIGIN, path),
                Err("connection refused".to_string()),
            );
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn fetch(&self, request: &AssetRequest) -> LarderResult<StoredResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(request.url.as_str()) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(reason)) => {
                    Err(LarderError::network(request.url.as_str(), reason.as_str()))
                }
                None => Err(LarderError::network(request.url.as_str(), "no route")),
            }
        }
    }

    fn manager(
        manifest: Manifest,
        store: &Arc<MemoryStore>,
        transport: &Arc<FakeTransport>,
    ) -> CacheManager {
        CacheManager::new(manifest, store.clone(), transport.clone())
    }

    /// Store whose deletions always fail, for the non-fatal eviction path
    struct StubbornStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl GenerationStore for StubbornStore {
        async fn begin(&self, name: &str) -> LarderResult<()> {
            self.inner.begin(name).await
        }

        async fn put(
            &self,
            name: &str,
            key: &crate::asset::AssetKey,
            response: &StoredResponse,
        ) -> LarderResult<()> {
            self.inner.put(name, key, response).await
        }

        async fn commit(&self, name: &str) -> LarderResult<()> {
            self.inner.commit(name).await
        }

        async fn discard(&self, name: &str) -> LarderResult<()> {
            self.inner.discard(name).await
        }

        async fn get(
            &self,
            name: &str,
            key: &crate::asset::AssetKey,
        ) -> LarderResult<Option<StoredResponse>> {
            self.inner.get(name, key).await
        }

        async fn list(&self) -> LarderResult<Vec<crate::store::Generation>> {
            self.inner.list().await
        }

        async fn remove(&self, _name: &str) -> LarderResult<()> {
            Err(LarderError::io(
                "removing generation",
                std::io::Error::other("device busy"),
            ))
        }

        async fn contains(&self, name: &str) -> LarderResult<bool> {
            self.inner.contains(name).await
        }
    }

    #[tokio::test]
    async fn install_populates_every_asset() {
        let store = Arc::new(MemoryStore::new());
        let transport =
            Arc::new(FakeTransport::new().ok("/index.html", b"<html>").ok("/logo.png", b"png"));
        let mgr = manager(manifest("v1", &["/index.html", "/logo.png"]), &store, &transport);

        let report = mgr.install().await.unwrap();
        assert_eq!(report.version, "v1");
        assert_eq!(report.entries, 2);
        assert_eq!(report.bytes, 9);
        assert!(store.contains("v1").await.unwrap());
    }

    #[tokio::test]
    async fn install_is_all_or_nothing() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            FakeTransport::new()
                .ok("/index.html", b"<html>")
                .unreachable("/logo.png"),
        );
        let mgr = manager(manifest("v1", &["/index.html", "/logo.png"]), &store, &transport);

        let err = mgr.install().await.unwrap_err();
        assert!(matches!(err, LarderError::InstallFailed { .. }));

        // No generation at all, not a partial one
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.contains("v1").await.unwrap());
    }

    #[tokio::test]
    async fn install_treats_non_success_status_as_failure() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            FakeTransport::new()
                .ok("/index.html", b"<html>")
                .status("/logo.png", 404),
        );
        let mgr = manager(manifest("v1", &["/index.html", "/logo.png"]), &store, &transport);

        let err = mgr.install().await.unwrap_err();
        match err {
            LarderError::InstallFailed { url, reason, .. } => {
                assert!(url.ends_with("/logo.png"));
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn failed_install_leaves_previous_generation_serving() {
        let store = Arc::new(MemoryStore::new());
        let t1 = Arc::new(FakeTransport::new().ok("/index.html", b"v1 html"));
        manager(manifest("v1", &["/index.html"]), &store, &t1)
            .install()
            .await
            .unwrap();

        let t2 = Arc::new(FakeTransport::new().unreachable("/index.html"));
        let mgr2 = manager(manifest("v2", &["/index.html"]), &store, &t2);
        assert!(mgr2.install().await.is_err());

        // v1 still complete and readable
        let mgr1 = manager(manifest("v1", &[]), &store, &t1);
        let got = mgr1.handle_fetch(&request("/index.html")).await.unwrap();
        assert_eq!(got.body, b"v1 html");
    }

    #[tokio::test]
    async fn cache_hit_never_touches_network() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new().ok("/logo.png", b"png"));
        let mgr = manager(manifest("v1", &["/logo.png"]), &store, &transport);

        mgr.install().await.unwrap();
        let after_install = transport.calls();

        let got = mgr.handle_fetch(&request("/logo.png")).await.unwrap();
        assert_eq!(got.body, b"png");
        assert_eq!(transport.calls(), after_install);
    }

    #[tokio::test]
    async fn miss_passes_through_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            FakeTransport::new()
                .ok("/logo.png", b"png")
                .ok("/extra.js", b"js"),
        );
        let mgr = manager(manifest("v1", &["/logo.png"]), &store, &transport);
        mgr.install().await.unwrap();

        let got = mgr.handle_fetch(&request("/extra.js")).await.unwrap();
        assert_eq!(got.body, b"js");

        // Not written back: a second fetch hits the network again
        let before = transport.calls();
        mgr.handle_fetch(&request("/extra.js")).await.unwrap();
        assert_eq!(transport.calls(), before + 1);
        assert!(store
            .get("v1", &request("/extra.js").key())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn miss_with_unreachable_network_errors() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new().unreachable("/gone.js"));
        let mgr = manager(manifest("v1", &[]), &store, &transport);
        mgr.install().await.unwrap();

        let err = mgr.handle_fetch(&request("/gone.js")).await.unwrap_err();
        assert!(matches!(err, LarderError::Network { .. }));
    }

    #[tokio::test]
    async fn non_success_miss_passes_through_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new().status("/missing.css", 404));
        let mgr = manager(manifest("v1", &[]), &store, &transport);
        mgr.install().await.unwrap();

        let got = mgr.handle_fetch(&request("/missing.css")).await.unwrap();
        assert_eq!(got.status, 404);
    }

    #[tokio::test]
    async fn activate_evicts_every_other_generation() {
        let store = Arc::new(MemoryStore::new());
        let t1 = Arc::new(FakeTransport::new().ok("/a.css", b"v1 css"));
        manager(manifest("v1", &["/a.css"]), &store, &t1)
            .install()
            .await
            .unwrap();

        let t2 = Arc::new(FakeTransport::new().ok("/a.css", b"v2 css"));
        let mgr2 = manager(manifest("v2", &["/a.css"]), &store, &t2);
        mgr2.install().await.unwrap();

        let report = mgr2.activate().await.unwrap();
        assert_eq!(report.evicted, vec!["v1".to_string()]);

        // v1 unreachable, v2 reachable
        assert!(store
            .get("v1", &request("/a.css").key())
            .await
            .unwrap()
            .is_none());
        let got = store.get("v2", &request("/a.css").key()).await.unwrap().unwrap();
        assert_eq!(got.body, b"v2 css");
    }

    #[tokio::test]
    async fn activate_evicts_abandoned_staging() {
        let store = Arc::new(MemoryStore::new());
        store.begin("half-done").await.unwrap();

        let transport = Arc::new(FakeTransport::new().ok("/a.css", b"css"));
        let mgr = manager(manifest("v1", &["/a.css"]), &store, &transport);
        mgr.install().await.unwrap();

        let report = mgr.activate().await.unwrap();
        assert_eq!(report.evicted, vec!["half-done".to_string()]);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn eviction_failure_is_non_fatal() {
        let store: Arc<StubbornStore> = Arc::new(StubbornStore {
            inner: MemoryStore::new(),
        });
        let t1 = Arc::new(FakeTransport::new().ok("/a.css", b"v1"));
        CacheManager::new(manifest("v1", &["/a.css"]), store.clone(), t1.clone())
            .install()
            .await
            .unwrap();

        let t2 = Arc::new(FakeTransport::new().ok("/a.css", b"v2"));
        let mgr2 = CacheManager::new(manifest("v2", &["/a.css"]), store.clone(), t2.clone());
        mgr2.install().await.unwrap();

        // v1 cannot be deleted, but activation still succeeds and v2 serves
        let report = mgr2.activate().await.unwrap();
        assert!(report.evicted.is_empty());

        let got = mgr2.handle_fetch(&request("/a.css")).await.unwrap();
        assert_eq!(got.body, b"v2");
    }

    #[tokio::test]
    async fn activate_twice_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new().ok("/a.css", b"css"));
        let mgr = manager(manifest("v1", &["/a.css"]), &store, &transport);
        mgr.install().await.unwrap();

        let first = mgr.activate().await.unwrap();
        assert!(first.evicted.is_empty());

        let second = mgr.activate().await.unwrap();
        assert!(second.evicted.is_empty());

        let got = mgr.handle_fetch(&request("/a.css")).await.unwrap();
        assert_eq!(got.body, b"css");
    }

    #[tokio::test]
    async fn activate_without_completed_install_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());
        let mgr = manager(manifest("v1", &[]), &store, &transport);

        let err = mgr.activate().await.unwrap_err();
        assert!(matches!(err, LarderError::ActivateIncomplete { .. }));

        // Same after a failed install
        let transport = Arc::new(FakeTransport::new().unreachable("/a.css"));
        let mgr = manager(manifest("v1", &["/a.css"]), &store, &transport);
        assert!(mgr.install().await.is_err());
        assert!(matches!(
            mgr.activate().await.unwrap_err(),
            LarderError::ActivateIncomplete { .. }
        ));
    }

    #[tokio::test]
    async fn store_on_miss_opt_in_writes_successful_gets() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            FakeTransport::new()
                .ok("/late.js", b"late")
                .status("/bad.js", 500),
        );
        let mut m = manifest("v1", &[]);
        m.policy.store_on_miss = true;
        let mgr = manager(m, &store, &transport);
        mgr.install().await.unwrap();

        mgr.handle_fetch(&request("/late.js")).await.unwrap();
        let before = transport.calls();
        let got = mgr.handle_fetch(&request("/late.js")).await.unwrap();
        assert_eq!(got.body, b"late");
        assert_eq!(transport.calls(), before);

        // Non-success responses are never written back
        mgr.handle_fetch(&request("/bad.js")).await.unwrap();
        assert!(store
            .get("v1", &request("/bad.js").key())
            .await
            .unwrap()
            .is_none());
    }

    /// The end-to-end scenario from the design notes: fresh deploy of "v1"
    /// with two assets, then one hit and one passthrough.
    #[tokio::test]
    async fn fresh_deploy_scenario() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            FakeTransport::new()
                .ok("/index.html", b"<html>")
                .ok("/logo.png", b"png bytes")
                .ok("/unknown.js", b"js"),
        );
        let mgr = manager(manifest("v1", &["/index.html", "/logo.png"]), &store, &transport);

        mgr.install().await.unwrap();
        let report = mgr.activate().await.unwrap();
        assert!(report.evicted.is_empty());

        let baseline = transport.calls();

        let logo = mgr.handle_fetch(&request("/logo.png")).await.unwrap();
        assert_eq!(logo.body, b"png bytes");
        assert_eq!(transport.calls(), baseline);

        let unknown = mgr.handle_fetch(&request("/unknown.js")).await.unwrap();
        assert_eq!(unknown.body, b"js");
        assert_eq!(transport.calls(), baseline + 1);
    }
}
