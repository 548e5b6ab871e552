//! Application wiring.
//!
//! `App` connects the session lifecycle to the pipelines: a transition
//! to signed-in triggers a feed assembly run, a transition to signed-out
//! clears the feed, the search results and the playback selection. The
//! same transition handler backs both the long-running reactive loop and
//! the one-shot CLI commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::adapters::{CatalogApi, IdentityProvider};
use crate::core::assembler::{FeedAssembler, FeedError};
use crate::core::search::SearchPipeline;
use crate::core::session::SessionManager;
use crate::domain::feed::PlaybackSelection;
use crate::domain::session::SessionState;

/// Wires the session manager to the feed and search pipelines.
pub struct App {
    pub session: SessionManager,
    pub assembler: FeedAssembler,
    pub search: SearchPipeline,
    pub playback: Mutex<PlaybackSelection>,
    /// User-facing message from the last failed assembly run, cleared
    /// by the next successful one.
    feed_error: Mutex<Option<String>>,
    /// True while an assembly run is in flight.
    busy: AtomicBool,
}

impl App {
    pub fn new(provider: Arc<dyn IdentityProvider>, catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            session: SessionManager::new(provider),
            assembler: FeedAssembler::new(Arc::clone(&catalog)),
            search: SearchPipeline::new(catalog),
            playback: Mutex::new(PlaybackSelection::default()),
            feed_error: Mutex::new(None),
            busy: AtomicBool::new(false),
        }
    }

    /// The user-facing error from the last assembly run, if it failed.
    pub fn feed_error(&self) -> Option<String> {
        self.feed_error.lock().clone()
    }

    /// Whether an assembly run is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// React to one session transition.
    ///
    /// Signed-in starts an assembly run; its failure is surfaced as a
    /// feed-level message while the previous feed stays committed.
    /// Signed-out clears everything derived from the old identity.
    pub async fn handle_transition(&self, state: &SessionState) {
        match state {
            SessionState::SignedIn => {
                self.busy.store(true, Ordering::SeqCst);
                let outcome = self.assembler.assemble().await;
                self.busy.store(false, Ordering::SeqCst);

                match outcome {
                    Ok(feed) => {
                        *self.feed_error.lock() = None;
                        info!(videos = feed.len(), "feed refreshed");
                    }
                    // A superseded run was discarded on purpose; the
                    // newer run's outcome is the one that counts.
                    Err(FeedError::Superseded) => {}
                    Err(e) => {
                        error!(error = %e, "feed assembly failed");
                        *self.feed_error.lock() = Some(e.to_string());
                    }
                }
            }
            SessionState::SignedOut => {
                self.assembler.clear();
                self.search.clear();
                self.playback.lock().clear();
                *self.feed_error.lock() = None;
            }
            _ => {}
        }
    }

    /// Consume session transitions for the life of the app. Handles the
    /// state current at subscription time first, so transitions that
    /// fired before the loop started are not lost. For embedders; the
    /// CLI drives [`App::handle_transition`] directly after each
    /// session call.
    pub async fn run(&self) {
        let mut rx = self.session.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            self.handle_transition(&state).await;
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
