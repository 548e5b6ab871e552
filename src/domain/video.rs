//! Video catalog domain types.
//!
//! A `VideoSummary` is the normalized form of a catalog video record.
//! It is immutable once constructed and carries no engagement metrics:
//! view counts and comment data are never requested from the catalog.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a subscribed channel.
///
/// One value per subscribed channel; its lifecycle is tied to a single
/// subscription-list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque identifier of a video, unique per video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A normalized video record as surfaced in the feed and in search
/// results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Unique video identifier
    pub id: VideoId,

    /// Video title
    pub title: String,

    /// Title of the channel that published the video
    pub channel_title: String,

    /// Publish timestamp, the feed's sole ordering key
    pub published_at: DateTime<Utc>,

    /// Preferred thumbnail URL, when the catalog provided one
    pub thumbnail_url: Option<String>,

    /// Machine-readable duration encoding as returned by the catalog
    /// (ISO-8601 subset, e.g. "PT4M13S"); absent for some live or
    /// upcoming items
    pub duration: Option<String>,
}
