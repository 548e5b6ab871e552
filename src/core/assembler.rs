//! Feed assembly pipeline.
//!
//! One assembly run walks the signed-in user's subscriptions, collects
//! each channel's most recent uploads, deduplicates ids across channels,
//! fetches details in batches, drops short-form entries and commits the
//! sorted remainder as the new feed, all or nothing. A failed run
//! leaves the previously committed feed untouched.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::adapters::{CatalogApi, CatalogError, DETAILS_BATCH_LIMIT};
use crate::core::classifier::is_short_form;
use crate::domain::feed::FeedState;
use crate::domain::video::{VideoId, VideoSummary};

/// How many recent uploads are pulled per subscribed channel.
const UPLOADS_PER_CHANNEL: usize = 10;

/// How many per-channel upload fetches run at once.
const CHANNEL_FETCH_CONCURRENCY: usize = 4;

/// Errors surfaced by an assembly run.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Any catalog failure aborts the whole run; the previous feed is
    /// retained. Per-channel failures are not isolated.
    #[error("feed assembly failed: {0}")]
    Catalog(#[from] CatalogError),

    /// This run was superseded by a newer one before it could commit;
    /// its result was discarded.
    #[error("assembly run was superseded by a newer run")]
    Superseded,
}

/// Orchestrates the subscription-to-feed pipeline.
pub struct FeedAssembler {
    catalog: Arc<dyn CatalogApi>,
    feed: RwLock<FeedState>,
    /// Monotonically increasing run generation. A run only commits when
    /// it is still the latest; stale in-flight runs discard their result.
    generation: AtomicU64,
}

impl FeedAssembler {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            feed: RwLock::new(FeedState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the committed feed.
    pub fn feed(&self) -> Vec<VideoSummary> {
        self.feed.read().videos().to_vec()
    }

    /// Drop the committed feed (sign-out obligation).
    pub fn clear(&self) {
        self.feed.write().clear();
    }

    /// Run the full assembly pipeline and commit the result.
    ///
    /// Triggered whenever the session transitions to signed-in; safe to
    /// call repeatedly; with unchanged remote state, repeat runs commit
    /// identical content in identical order.
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn assemble(&self) -> Result<Vec<VideoSummary>, FeedError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Step 1: subscriptions. No subscriptions is an empty feed, not
        // an error.
        let channels = self.catalog.list_my_subscriptions().await?;
        info!(channels = channels.len(), "assembly run started");
        if channels.is_empty() {
            return self.commit(generation, Vec::new());
        }

        // Step 2: recent uploads per channel, fanned out with bounded
        // concurrency. `buffered` yields in channel order regardless of
        // completion order, so deduplication and the final sort stay
        // deterministic; any channel failure aborts the whole run.
        let per_channel: Vec<Vec<VideoId>> = stream::iter(channels.into_iter())
            .map(|channel| {
                let catalog = Arc::clone(&self.catalog);
                async move { catalog.list_recent_video_ids(&channel, UPLOADS_PER_CHANNEL).await }
            })
            .buffered(CHANNEL_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mut seen: HashSet<VideoId> = HashSet::new();
        let mut ids: Vec<VideoId> = Vec::new();
        for recent in per_channel {
            for id in recent {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        // Steps 3–4: detail batches, classify, drop short-form.
        let mut collected = Vec::with_capacity(ids.len());
        for batch in ids.chunks(DETAILS_BATCH_LIMIT) {
            let details = self.catalog.fetch_video_details(batch).await?;
            for video in details {
                if is_short_form(&video.title, video.duration.as_deref()) {
                    continue;
                }
                collected.push(video);
            }
        }

        // Step 5: newest first; the sort is stable, so equal timestamps
        // keep their discovery order.
        collected.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        // Step 6: atomic replacement.
        self.commit(generation, collected)
    }

    /// Commit a run's result unless a newer run has started since.
    fn commit(
        &self,
        generation: u64,
        videos: Vec<VideoSummary>,
    ) -> Result<Vec<VideoSummary>, FeedError> {
        if self.generation.load(Ordering::SeqCst) != generation {
            info!(generation, "discarding superseded assembly run");
            return Err(FeedError::Superseded);
        }

        info!(videos = videos.len(), "assembly run committed");
        self.feed.write().replace(videos.clone());
        Ok(videos)
    }
}
