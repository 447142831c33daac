//! Memoized catalog.

use std::sync::Arc;

use crate::catalog::{AssetCatalog, CatalogBuilder};
use crate::scanner::{AssetScanner, RegexScanner};

/// Owns a [`CatalogBuilder`] and the catalog it last produced.
///
/// [`get`](Self::get) scans at most once until [`invalidate`](Self::invalidate)
/// is called, and hands out the same `Arc` every time, so the shim and the
/// entry graph built during one run always agree.
#[derive(Debug)]
pub struct CatalogCache<S = RegexScanner> {
    builder: CatalogBuilder<S>,
    slot: Option<Arc<AssetCatalog>>,
    scans: usize,
}

impl<S: AssetScanner> CatalogCache<S> {
    pub fn new(builder: CatalogBuilder<S>) -> Self {
        Self {
            builder,
            slot: None,
            scans: 0,
        }
    }

    pub fn get(&mut self) -> Arc<AssetCatalog> {
        if let Some(catalog) = &self.slot {
            return Arc::clone(catalog);
        }
        self.scans += 1;
        let catalog = Arc::new(self.builder.build());
        self.slot = Some(Arc::clone(&catalog));
        catalog
    }

    /// Drop the memoized catalog; the next [`get`](Self::get) rescans.
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            tracing::debug!("asset catalog invalidated");
        }
    }

    /// Swap in a new builder (after a configuration change) and invalidate.
    pub fn replace_builder(&mut self, builder: CatalogBuilder<S>) {
        self.builder = builder;
        self.invalidate();
    }

    pub fn builder(&self) -> &CatalogBuilder<S> {
        &self.builder
    }

    pub fn is_cached(&self) -> bool {
        self.slot.is_some()
    }

    /// Number of scans performed so far.
    pub fn scan_count(&self) -> usize {
        self.scans
    }
}
