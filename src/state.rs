//! Shared server state: the current search index and how to rebuild it.

use crate::error::Result;
use crate::parser::{SourceReport, ingest};
use crate::search::SearchIndex;
use crate::sources::{SourceConfig, Skipped};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Outcome of loading and indexing every configured source.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub reports: Vec<SourceReport>,
    pub skipped: Vec<Skipped>,
    pub api_count: usize,
    pub endpoint_count: usize,
}

impl LoadSummary {
    /// True when some source could not be read or decoded.
    pub fn has_failures(&self) -> bool {
        !self.skipped.is_empty() || self.reports.iter().any(SourceReport::is_failed)
    }
}

/// Reads, parses and indexes every source. Blocking.
pub fn build_index(config: &SourceConfig) -> Result<(SearchIndex, LoadSummary)> {
    let loaded = config.load()?;
    let ingested = ingest(loaded.documents);
    let index = SearchIndex::build(ingested.catalogues);

    let summary = LoadSummary {
        reports: ingested.reports,
        skipped: loaded.skipped,
        api_count: index.api_count(),
        endpoint_count: index.document_count(),
    };
    Ok((index, summary))
}

/// Holds the index that queries run against.
///
/// Readers take an `Arc` snapshot and never observe a partially built index;
/// a rebuild constructs a fresh [`SearchIndex`] and swaps the pointer.
pub struct DocState {
    index: RwLock<Arc<SearchIndex>>,
    sources: Option<SourceConfig>,
    /// Held across build and swap so reloads publish in call order.
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for DocState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocState")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl DocState {
    /// State around an already built index, without a way to reload it.
    pub fn new(index: SearchIndex) -> Self {
        Self {
            index: RwLock::new(Arc::new(index)),
            sources: None,
            reload_lock: Mutex::new(()),
        }
    }

    /// Builds the initial index from `sources`, remembering them for reloads.
    pub async fn load(sources: SourceConfig) -> Result<(Self, LoadSummary)> {
        let config = sources.clone();
        let (index, summary) = tokio::task::spawn_blocking(move || build_index(&config)).await??;
        tracing::info!(
            "Indexed {} endpoints across {} APIs",
            summary.endpoint_count,
            summary.api_count
        );

        let state = Self {
            index: RwLock::new(Arc::new(index)),
            sources: Some(sources),
            reload_lock: Mutex::new(()),
        };
        Ok((state, summary))
    }

    /// Snapshot of the current index.
    pub async fn current(&self) -> Arc<SearchIndex> {
        self.index.read().await.clone()
    }

    /// Publishes a new index, returning the one it replaced.
    pub async fn replace(&self, index: SearchIndex) -> Arc<SearchIndex> {
        let index = Arc::new(index);
        let previous = std::mem::replace(&mut *self.index.write().await, index.clone());
        tracing::info!(
            "Search index swapped: {} → {} endpoints",
            previous.document_count(),
            index.document_count()
        );
        previous
    }

    /// Re-reads every source and swaps in the rebuilt index.
    ///
    /// Concurrent reloads run one at a time, so a later call always publishes
    /// a later read of the files. Queries are not blocked. On error the
    /// current index stays in place.
    pub async fn reload(&self) -> Result<LoadSummary> {
        let Some(sources) = self.sources.clone() else {
            anyhow::bail!("No documentation sources configured");
        };

        let _guard = self.reload_lock.lock().await;
        let (index, summary) = tokio::task::spawn_blocking(move || build_index(&sources)).await??;
        self.replace(index).await;
        Ok(summary)
    }

    pub fn sources(&self) -> Option<&SourceConfig> {
        self.sources.as_ref()
    }
}
