//! Memoizing visa document loader.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::observability::metrics;
use crate::visa::source::VisaSource;
use crate::visa::types::{VisaDocument, VisaError, VisaType};

/// A thread-safe cache of parsed visa documents keyed by type.
///
/// Starts empty. Each key is written at most once between clears; two
/// concurrent first loads of the same type both store an equal document.
#[derive(Clone, Default)]
pub struct VisaCache {
    inner: Arc<DashMap<VisaType, Arc<VisaDocument>>>,
}

/// Snapshot of which types are resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached_types: Vec<VisaType>,
    pub cache_size: usize,
}

impl VisaCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, visa_type: VisaType) -> Option<Arc<VisaDocument>> {
        self.inner.get(&visa_type).map(|r| Arc::clone(r.value()))
    }

    pub fn insert(&self, visa_type: VisaType, document: Arc<VisaDocument>) {
        self.inner.insert(visa_type, document);
        metrics::record_cache_size(self.inner.len());
    }

    /// Drop every cached document.
    pub fn clear(&self) {
        self.inner.clear();
        metrics::record_cache_size(0);
    }

    pub fn stats(&self) -> CacheStats {
        let mut cached_types: Vec<VisaType> = self.inner.iter().map(|r| *r.key()).collect();
        cached_types.sort();
        CacheStats {
            cache_size: cached_types.len(),
            cached_types,
        }
    }
}

/// Loads visa documents on first request and serves them from the cache after.
#[derive(Clone)]
pub struct VisaLoader {
    source: Arc<dyn VisaSource>,
    cache: VisaCache,
}

impl VisaLoader {
    pub fn new(source: Arc<dyn VisaSource>) -> Self {
        Self::with_cache(source, VisaCache::new())
    }

    pub fn with_cache(source: Arc<dyn VisaSource>, cache: VisaCache) -> Self {
        Self { source, cache }
    }

    /// Return the document for `visa_type`, reading storage only on a miss.
    pub fn load(&self, visa_type: VisaType) -> Result<Arc<VisaDocument>, VisaError> {
        if let Some(document) = self.cache.get(visa_type) {
            metrics::record_cache_lookup(true);
            return Ok(document);
        }
        metrics::record_cache_lookup(false);

        let content = self.source.read(visa_type).inspect_err(|e| {
            tracing::error!(visa_type = %visa_type, error = %e, "Error loading visa data");
        })?;
        let document = Arc::new(VisaDocument::parse(visa_type, &content).inspect_err(|e| {
            tracing::error!(visa_type = %visa_type, error = %e, "Error parsing visa data");
        })?);

        self.cache.insert(visa_type, Arc::clone(&document));
        tracing::info!(
            visa_type = %visa_type,
            countries = document.countries.len(),
            "Loaded visa data"
        );
        Ok(document)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Visa data cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &VisaCache {
        &self.cache
    }
}
