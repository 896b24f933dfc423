//! Explicit price history cache.
//!
//! Entries are keyed by the full [`HistoryRequest`] (asset, frequency and
//! start date) and live until invalidated.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{FeedError, HistoryRequest, PriceHistorySource};
use crate::table::PriceTable;

/// Caching wrapper around another [`PriceHistorySource`].
pub struct CachedPriceSource<S> {
    inner: S,
    cache: RwLock<HashMap<HistoryRequest, Arc<PriceTable>>>,
}

impl<S> std::fmt::Debug for CachedPriceSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedPriceSource")
            .field("cache_size", &self.cache.read().len())
            .finish_non_exhaustive()
    }
}

impl<S: PriceHistorySource> CachedPriceSource<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch through the cache, sharing the cached table.
    pub fn fetch_shared(&self, request: &HistoryRequest) -> Result<Arc<PriceTable>, FeedError> {
        if let Some(table) = self.cache.read().get(request) {
            debug!(asset = %request.asset, "Price history cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(asset = %request.asset, "Price history cache miss");
        let table = Arc::new(self.inner.fetch(request)?);
        let mut cache = self.cache.write();
        let entry = cache.entry(request.clone()).or_insert(table);
        Ok(Arc::clone(entry))
    }

    /// Drop one entry. Returns whether it was cached.
    pub fn invalidate(&self, request: &HistoryRequest) -> bool {
        self.cache.write().remove(request).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// The wrapped source.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: PriceHistorySource> PriceHistorySource for CachedPriceSource<S> {
    fn fetch(&self, request: &HistoryRequest) -> Result<PriceTable, FeedError> {
        self.fetch_shared(request).map(|table| (*table).clone())
    }
}
