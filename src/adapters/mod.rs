//! Adapter interfaces for the remote platform services.
//!
//! Two external boundaries exist: the read-only video catalog API and
//! the OAuth2-capable identity provider. Both are thin request/response
//! wrappers; the orchestration logic in `core` only ever talks to the
//! traits defined here.

pub mod identity;
pub mod youtube;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::video::{ChannelId, VideoId, VideoSummary};

// Re-export the concrete adapters
pub use identity::{GoogleIdentity, TokenStore, CATALOG_SCOPE};
pub use youtube::YouTubeCatalog;

/// Largest id batch the video-details endpoint accepts in one call.
/// Chunking a larger collection is the caller's responsibility.
pub const DETAILS_BATCH_LIMIT: usize = 50;

/// Errors surfaced by catalog operations.
///
/// The gateway never retries; a failure is handed to the caller, which
/// decides what it means for the run in progress.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Authorization failed (missing, expired or insufficient credentials)
    #[error("catalog request unauthorized: {0}")]
    Unauthorized(String),

    /// The remote quota for this project is exhausted
    #[error("catalog quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Any other error response from the catalog service
    #[error("catalog returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// The request never produced a usable response
    #[error("catalog transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("catalog response malformed: {0}")]
    Decode(String),

    /// Caller passed more ids than one details call accepts
    #[error("details batch of {0} ids exceeds the 50-id limit")]
    BatchTooLarge(usize),
}

/// Read-only view of the remote video catalog.
///
/// All operations are stateless request/response calls; pagination and
/// id batching policy live with the callers.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// List the signed-in user's subscribed channels.
    ///
    /// Returns a single page of at most 50 mapped channel ids. Following
    /// continuation cursors beyond the first page is a known gap, left
    /// as an extension point.
    async fn list_my_subscriptions(&self) -> Result<Vec<ChannelId>, CatalogError>;

    /// Most recent uploads of one channel, newest first, bounded by
    /// `limit`. Only items of kind "video" are returned; playlists and
    /// channels are excluded at the source.
    async fn list_recent_video_ids(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<VideoId>, CatalogError>;

    /// Free-text video search, relevance-ordered, bounded by `limit`.
    /// Same kind restriction as `list_recent_video_ids`.
    async fn search_video_ids(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VideoId>, CatalogError>;

    /// Normalized detail records for up to [`DETAILS_BATCH_LIMIT`] ids.
    ///
    /// # Errors
    /// - `CatalogError::BatchTooLarge` when handed an oversized batch
    /// - `CatalogError::Unauthorized` / `QuotaExceeded` propagated from
    ///   the service, never silently mapped to an empty result
    async fn fetch_video_details(
        &self,
        ids: &[VideoId],
    ) -> Result<Vec<VideoSummary>, CatalogError>;
}

/// Errors surfaced by the identity provider boundary.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Configuration was rejected before any network call
    #[error("identity configuration rejected: {0}")]
    Config(String),

    /// Provider initialization failed (bad client id, network failure)
    #[error("identity provider init failed: {0}")]
    Init(String),

    /// Interactive sign-in failed or was cancelled by the user
    #[error("sign-in failed: {0}")]
    SignIn(String),

    /// Sign-out (token revocation) failed
    #[error("sign-out failed: {0}")]
    SignOut(String),

    /// The request never produced a usable response
    #[error("identity transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Interactive identity provider (OAuth2-capable).
///
/// The `SessionManager` is the only caller; it translates the results of
/// these operations into `SessionState` transitions and broadcasts them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate configuration and restore any persisted session.
    ///
    /// Returns whether a previous session is still signed in. This
    /// client persists nothing across processes, so the shipped provider
    /// always restores to signed-out; the return value exists for
    /// providers that do persist.
    async fn initialize(&self) -> Result<bool, IdentityError>;

    /// Run the interactive sign-in flow to completion.
    async fn sign_in(&self) -> Result<(), IdentityError>;

    /// End the current session with the provider.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}
