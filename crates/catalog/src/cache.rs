//! Per-family details cache.
//!
//! [`FamilyDetailsCache`] tracks one load state per family id so that
//! several rows can load concurrently without cross-talk: each result is
//! applied only to its own entry, whatever order the loads resolve in.
//! A master [`CancellationToken`] covers teardown — once the hosting
//! modal is gone, late results are discarded instead of mutating state
//! nobody is watching.
//!
//! Load failures are terminal for that attempt: the entry parks in
//! `Failed` (rendered as an empty/error affordance) until an explicit
//! [`FamilyDetailsCache::retry`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Notify, RwLock};
use tokio_util::sync::CancellationToken;

use callsheet_core::catalog::{Colourway, FamilyDetails};
use callsheet_core::error::CoreError;
use callsheet_core::types::FamilyId;

use crate::loader::FamilyDetailsLoader;

/// Observable load state of one family's details.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// No load has been requested.
    Idle,
    /// A load is in flight; dependent pickers stay disabled.
    Loading,
    Ready(Arc<FamilyDetails>),
    /// The last load rejected; carries the surfaced reason.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

enum Entry {
    Loading,
    Ready(Arc<FamilyDetails>),
    Failed(String),
}

/// Shared, per-family-keyed cache of lazily loaded catalog details.
pub struct FamilyDetailsCache {
    loader: Arc<dyn FamilyDetailsLoader>,
    entries: RwLock<HashMap<FamilyId, Entry>>,
    /// Woken on every entry transition so waiters can re-check.
    changed: Notify,
    /// Cancelled at teardown; guards against state updates after disposal.
    cancel: CancellationToken,
}

impl FamilyDetailsCache {
    pub fn new(loader: Arc<dyn FamilyDetailsLoader>) -> Arc<Self> {
        Arc::new(Self {
            loader,
            entries: RwLock::new(HashMap::new()),
            changed: Notify::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Current load state for a family. Non-blocking.
    pub async fn state(&self, family_id: &FamilyId) -> LoadState {
        match self.entries.read().await.get(family_id) {
            None => LoadState::Idle,
            Some(Entry::Loading) => LoadState::Loading,
            Some(Entry::Ready(details)) => LoadState::Ready(Arc::clone(details)),
            Some(Entry::Failed(reason)) => LoadState::Failed(reason.clone()),
        }
    }

    /// The loaded details for a family, if ready. Non-blocking.
    pub async fn get(&self, family_id: &FamilyId) -> Option<Arc<FamilyDetails>> {
        match self.entries.read().await.get(family_id) {
            Some(Entry::Ready(details)) => Some(Arc::clone(details)),
            _ => None,
        }
    }

    /// Load a family's details, waiting for the result.
    ///
    /// At most one load per family is in flight: if another caller is
    /// already loading this family, this waits for that load instead of
    /// issuing a second one. Returns `None` when the load failed or the
    /// cache was shut down; the failure reason is available via
    /// [`Self::state`].
    pub async fn load(&self, family_id: &FamilyId) -> Option<Arc<FamilyDetails>> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            // Register the wakeup before inspecting state so a
            // transition between the check and the await is not missed.
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();
            {
                let mut entries = self.entries.write().await;
                match entries.get(family_id) {
                    Some(Entry::Ready(details)) => return Some(Arc::clone(details)),
                    Some(Entry::Failed(_)) => return None,
                    Some(Entry::Loading) => {}
                    None => {
                        entries.insert(family_id.clone(), Entry::Loading);
                        drop(entries);
                        return self.perform_load(family_id).await;
                    }
                }
            }
            changed.await;
        }
    }

    /// Kick off a load without waiting for it. No-op if the family is
    /// already loading, ready, or parked in `Failed`.
    pub fn ensure_loaded(self: Arc<Self>, family_id: &FamilyId) {
        let family_id = family_id.clone();
        tokio::spawn(async move {
            let _ = self.load(&family_id).await;
        });
    }

    /// Warm the cache for every family a link list references. Loads run
    /// concurrently and independently, one spinner per row rather than a
    /// global flag.
    pub fn ensure_all(self: Arc<Self>, family_ids: &[FamilyId]) {
        for family_id in family_ids {
            Arc::clone(&self).ensure_loaded(family_id);
        }
    }

    /// Clear a `Failed` entry and load again. A no-op for entries in any
    /// other state (nothing to retry).
    pub async fn retry(&self, family_id: &FamilyId) -> Option<Arc<FamilyDetails>> {
        let was_parked = {
            let mut entries = self.entries.write().await;
            match entries.get(family_id) {
                Some(Entry::Failed(_)) => {
                    entries.remove(family_id);
                    true
                }
                _ => false,
            }
        };
        if !was_parked {
            return self.get(family_id).await;
        }
        self.load(family_id).await
    }

    /// Seed a ready entry directly, e.g. for a family created inline
    /// (no colourways yet, so nothing to fetch).
    pub async fn seed(&self, family_id: FamilyId, details: FamilyDetails) {
        self.entries
            .write()
            .await
            .insert(family_id, Entry::Ready(Arc::new(details)));
        self.changed.notify_waiters();
    }

    /// Splice an inline-created colourway into a ready entry so it is
    /// selectable without a reload.
    pub async fn insert_colourway(
        &self,
        family_id: &FamilyId,
        colourway: Colourway,
    ) -> Result<(), CoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(family_id) {
            Some(Entry::Ready(details)) => {
                Arc::make_mut(details).upsert_colourway(colourway);
                self.changed.notify_waiters();
                Ok(())
            }
            _ => Err(CoreError::Conflict(format!(
                "Details for family '{family_id}' are not loaded"
            ))),
        }
    }

    /// Tear the cache down. In-flight loads are abandoned and any result
    /// that arrives afterwards is discarded.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.changed.notify_waiters();
    }

    /// Run the actual load for an entry this caller just claimed.
    async fn perform_load(&self, family_id: &FamilyId) -> Option<Arc<FamilyDetails>> {
        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(%family_id, "Detail load abandoned at teardown");
                self.entries.write().await.remove(family_id);
                self.changed.notify_waiters();
                return None;
            }
            result = self.loader.load_family_details(family_id) => result,
        };

        // The loader may have resolved in the same poll as a teardown;
        // a result nobody is watching must not be applied.
        if self.cancel.is_cancelled() {
            tracing::debug!(%family_id, "Discarding detail load resolved after teardown");
            self.entries.write().await.remove(family_id);
            self.changed.notify_waiters();
            return None;
        }

        let mut entries = self.entries.write().await;
        let outcome = match result {
            Ok(details) => {
                let details = Arc::new(details);
                entries.insert(family_id.clone(), Entry::Ready(Arc::clone(&details)));
                Some(details)
            }
            Err(e) => {
                tracing::warn!(%family_id, error = %e, "Family detail load failed");
                entries.insert(family_id.clone(), Entry::Failed(e.to_string()));
                None
            }
        };
        drop(entries);
        self.changed.notify_waiters();
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use callsheet_core::catalog::COLOUR_STATUS_ACTIVE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn details_for(family_id: &str) -> FamilyDetails {
        FamilyDetails {
            colourways: vec![Colourway {
                id: format!("{family_id}-c1"),
                colour_name: "Indigo".into(),
                sku_code: None,
                status: COLOUR_STATUS_ACTIVE.into(),
                sizes: None,
                image_path: None,
            }],
            sizes: vec!["S".into(), "M".into()],
        }
    }

    /// Loader whose responses are gated per family id: a load does not
    /// resolve until the test releases its gate, so resolution order is
    /// fully controlled.
    struct GatedLoader {
        gates: std::sync::Mutex<HashMap<FamilyId, Arc<Notify>>>,
        calls: AtomicUsize,
        fail_ids: Vec<FamilyId>,
    }

    impl GatedLoader {
        fn new() -> Self {
            Self {
                gates: std::sync::Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                fail_ids: Vec::new(),
            }
        }

        fn failing_for(ids: &[&str]) -> Self {
            Self {
                fail_ids: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::new()
            }
        }

        fn gate(&self, family_id: &str) -> Arc<Notify> {
            Arc::clone(
                self.gates
                    .lock()
                    .unwrap()
                    .entry(family_id.to_string())
                    .or_default(),
            )
        }
    }

    #[async_trait]
    impl FamilyDetailsLoader for GatedLoader {
        async fn load_family_details(
            &self,
            family_id: &FamilyId,
        ) -> Result<FamilyDetails, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate(family_id);
            gate.notified().await;
            if self.fail_ids.contains(family_id) {
                return Err(CatalogError::LoadFailed {
                    family_id: family_id.clone(),
                    reason: "catalog unavailable".into(),
                });
            }
            Ok(details_for(family_id))
        }
    }

    /// Loader that resolves immediately.
    struct InstantLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FamilyDetailsLoader for InstantLoader {
        async fn load_family_details(
            &self,
            family_id: &FamilyId,
        ) -> Result<FamilyDetails, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(details_for(family_id))
        }
    }

    // -- basic load -------------------------------------------------------------

    #[tokio::test]
    async fn load_transitions_idle_to_ready() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(loader);
        let id: FamilyId = "f1".into();

        assert_matches!(cache.state(&id).await, LoadState::Idle);
        let details = cache.load(&id).await.unwrap();
        assert_eq!(details.colourways[0].id, "f1-c1");
        assert_matches!(cache.state(&id).await, LoadState::Ready(_));
    }

    #[tokio::test]
    async fn repeat_load_hits_the_cache() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f1".into();

        cache.load(&id).await.unwrap();
        cache.load(&id).await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    // -- single in-flight load per family -----------------------------------------

    #[tokio::test]
    async fn concurrent_loads_share_one_flight() {
        let loader = Arc::new(GatedLoader::new());
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f1".into();

        let a = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.load(&id).await }
        });
        let b = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.load(&id).await }
        });

        // Let both tasks reach the gate/waiter, then release.
        tokio::task::yield_now().await;
        loader.gate("f1").notify_waiters();

        assert!(a.await.unwrap().is_some());
        assert!(b.await.unwrap().is_some());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    // -- out-of-order resolution ----------------------------------------------------

    #[tokio::test]
    async fn results_land_on_their_own_entries_in_any_order() {
        let loader = Arc::new(GatedLoader::new());
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let f1: FamilyId = "f1".into();
        let f2: FamilyId = "f2".into();

        let load_f1 = tokio::spawn({
            let cache = Arc::clone(&cache);
            let f1 = f1.clone();
            async move { cache.load(&f1).await }
        });
        let load_f2 = tokio::spawn({
            let cache = Arc::clone(&cache);
            let f2 = f2.clone();
            async move { cache.load(&f2).await }
        });
        tokio::task::yield_now().await;

        // f2 resolves first even though f1 was requested first.
        loader.gate("f2").notify_waiters();
        let f2_details = load_f2.await.unwrap().unwrap();
        assert_eq!(f2_details.colourways[0].id, "f2-c1");
        assert_matches!(cache.state(&f1).await, LoadState::Loading);

        loader.gate("f1").notify_waiters();
        let f1_details = load_f1.await.unwrap().unwrap();
        assert_eq!(f1_details.colourways[0].id, "f1-c1");
    }

    // -- failure and retry -------------------------------------------------------------

    #[tokio::test]
    async fn failed_load_parks_with_reason() {
        let loader = Arc::new(GatedLoader::failing_for(&["f1"]));
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f1".into();

        let load = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.load(&id).await }
        });
        tokio::task::yield_now().await;
        loader.gate("f1").notify_waiters();

        assert!(load.await.unwrap().is_none());
        assert_matches!(
            cache.state(&id).await,
            LoadState::Failed(reason) if reason.contains("catalog unavailable")
        );

        // A plain load does not re-attempt a parked failure.
        assert!(cache.load(&id).await.is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_clears_a_parked_failure() {
        let loader = Arc::new(GatedLoader::failing_for(&["f1"]));
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f1".into();

        let load = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.load(&id).await }
        });
        tokio::task::yield_now().await;
        loader.gate("f1").notify_waiters();
        assert!(load.await.unwrap().is_none());

        // The retry issues a fresh load (which fails again here; the
        // point is that the loader is called a second time).
        let retry = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.retry(&id).await }
        });
        tokio::task::yield_now().await;
        loader.gate("f1").notify_waiters();
        assert!(retry.await.unwrap().is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    // -- teardown ------------------------------------------------------------------------

    #[tokio::test]
    async fn late_result_after_shutdown_is_discarded() {
        let loader = Arc::new(GatedLoader::new());
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f1".into();

        let load = tokio::spawn({
            let cache = Arc::clone(&cache);
            let id = id.clone();
            async move { cache.load(&id).await }
        });
        tokio::task::yield_now().await;

        cache.shutdown();
        loader.gate("f1").notify_waiters();

        assert!(load.await.unwrap().is_none());
        assert_matches!(cache.state(&id).await, LoadState::Idle);
    }

    #[tokio::test]
    async fn loads_after_shutdown_are_refused() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        cache.shutdown();
        assert!(cache.load(&"f1".into()).await.is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    // -- splice-in -------------------------------------------------------------------------

    #[tokio::test]
    async fn inline_colourway_is_spliced_into_ready_entry() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(loader);
        let id: FamilyId = "f1".into();
        cache.load(&id).await.unwrap();

        cache
            .insert_colourway(
                &id,
                Colourway {
                    id: "c-new".into(),
                    colour_name: "Saffron".into(),
                    sku_code: None,
                    status: COLOUR_STATUS_ACTIVE.into(),
                    sizes: None,
                    image_path: None,
                },
            )
            .await
            .unwrap();

        let details = cache.get(&id).await.unwrap();
        assert!(details.colourway("c-new").is_some());
    }

    #[tokio::test]
    async fn splice_into_unloaded_family_is_a_conflict() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(loader);
        let result = cache
            .insert_colourway(
                &"f1".into(),
                Colourway {
                    id: "c-new".into(),
                    colour_name: "Saffron".into(),
                    sku_code: None,
                    status: COLOUR_STATUS_ACTIVE.into(),
                    sizes: None,
                    image_path: None,
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn seeded_family_is_ready_without_a_load() {
        let loader = Arc::new(InstantLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = FamilyDetailsCache::new(Arc::clone(&loader) as Arc<dyn FamilyDetailsLoader>);
        let id: FamilyId = "f-new".into();
        cache.seed(id.clone(), FamilyDetails::default()).await;
        assert!(cache.get(&id).await.is_some());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }
}
