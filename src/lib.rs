//! subfeed - subscriptions-first video feed client
//!
//! Reconstructs a "home feed" from the signed-in user's subscriptions
//! on a remote video platform, drops short-form clips, and never
//! surfaces view counts or comments.
//!
//! # Architecture
//!
//! The system is built around one reactive pipeline:
//! - The session manager owns the authenticated-identity lifecycle and
//!   broadcasts every state transition
//! - A transition to signed-in triggers a feed assembly run: per-channel
//!   recent uploads are aggregated, deduplicated, classified and sorted
//! - A failed run keeps the previously committed feed; results are
//!   replaced wholesale, never patched
//!
//! # Modules
//!
//! - `adapters`: External service boundaries (catalog API, identity provider)
//! - `core`: Orchestration logic (SessionManager, FeedAssembler, SearchPipeline)
//! - `domain`: Data structures (VideoSummary, SessionState, FeedState)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Sign in and print the personalized feed
//! subfeed feed
//!
//! # Search the catalog (short-form clips excluded)
//! subfeed search "rust async"
//!
//! # Print the embed URL for a video
//! subfeed play dQw4w9WgXcQ
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{CatalogApi, CatalogError, IdentityError, IdentityProvider};
pub use core::{App, FeedAssembler, FeedError, SearchPipeline, SessionManager};
pub use domain::{ChannelId, FeedState, SessionState, VideoId, VideoSummary};
