//! Ad-hoc search pipeline.
//!
//! A user-triggered query runs one catalog search bounded to 25 video
//! results, fetches details in a single batch (within the 50-id batch
//! ceiling), drops short-form entries and replaces the previous result
//! set atomically. Failure semantics match the feed assembler: all or
//! nothing, prior results retained.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{CatalogApi, CatalogError};
use crate::core::classifier::is_short_form;
use crate::domain::video::VideoSummary;

/// Largest result set requested from a single search call. Stays under
/// the details batch ceiling, so no chunking is needed here.
const SEARCH_PAGE_SIZE: usize = 25;

/// Errors surfaced by a search run. The previous result set is retained.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Orchestrates the query-to-results pipeline.
pub struct SearchPipeline {
    catalog: Arc<dyn CatalogApi>,
    results: RwLock<Vec<VideoSummary>>,
}

impl SearchPipeline {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            results: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the current result set.
    pub fn results(&self) -> Vec<VideoSummary> {
        self.results.read().clone()
    }

    /// Drop the current result set (sign-out obligation).
    pub fn clear(&self) {
        self.results.write().clear();
    }

    /// Run a search. Empty and whitespace-only queries are ignored:
    /// a no-op that keeps the previous results, not an error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<VideoSummary>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.results());
        }

        let ids = self.catalog.search_video_ids(query, SEARCH_PAGE_SIZE).await?;

        let mut rows = if ids.is_empty() {
            Vec::new()
        } else {
            self.catalog.fetch_video_details(&ids).await?
        };

        rows.retain(|video| !is_short_form(&video.title, video.duration.as_deref()));
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        info!(results = rows.len(), "search completed");
        *self.results.write() = rows.clone();
        Ok(rows)
    }
}
