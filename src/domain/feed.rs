//! Feed, search-result and playback state holders.
//!
//! `FeedState` is replace-only: a successful assembly run swaps the whole
//! collection in one step, a failed run leaves it untouched. Observers
//! never see a partially updated feed.

use super::video::{VideoId, VideoSummary};

/// Ordered collection of feed entries, newest publish time first.
///
/// An empty collection is a valid terminal state (no subscriptions, or
/// everything was classified short-form).
#[derive(Debug, Default)]
pub struct FeedState {
    videos: Vec<VideoSummary>,
}

impl FeedState {
    /// Replace the whole collection with the result of an assembly run.
    pub fn replace(&mut self, videos: Vec<VideoSummary>) {
        self.videos = videos;
    }

    /// Drop all entries (sign-out obligation).
    pub fn clear(&mut self) {
        self.videos.clear();
    }

    pub fn videos(&self) -> &[VideoSummary] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// The video currently loaded in the embedded player, if any.
#[derive(Debug, Default)]
pub struct PlaybackSelection {
    active: Option<VideoId>,
}

impl PlaybackSelection {
    pub fn select(&mut self, id: VideoId) {
        self.active = Some(id);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&VideoId> {
        self.active.as_ref()
    }
}

/// Embed player URL for a video, with related videos, branding chrome
/// and annotations suppressed. No comment or view-count surface exists
/// on the embed page.
pub fn embed_url(id: &VideoId) -> String {
    format!(
        "https://www.youtube.com/embed/{}?modestbranding=1&rel=0&iv_load_policy=3",
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(id: &str) -> VideoSummary {
        VideoSummary {
            id: VideoId::from(id),
            title: format!("video {}", id),
            channel_title: "channel".to_string(),
            published_at: Utc::now(),
            thumbnail_url: None,
            duration: None,
        }
    }

    #[test]
    fn test_feed_replace_is_wholesale() {
        let mut feed = FeedState::default();
        feed.replace(vec![video("a"), video("b")]);
        assert_eq!(feed.len(), 2);

        feed.replace(vec![video("c")]);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.videos()[0].id.as_str(), "c");
    }

    #[test]
    fn test_feed_clear() {
        let mut feed = FeedState::default();
        feed.replace(vec![video("a")]);
        feed.clear();
        assert!(feed.is_empty());
    }

    #[test]
    fn test_playback_selection() {
        let mut playback = PlaybackSelection::default();
        assert!(playback.active().is_none());

        playback.select(VideoId::from("v1"));
        assert_eq!(playback.active().unwrap().as_str(), "v1");

        playback.clear();
        assert!(playback.active().is_none());
    }

    #[test]
    fn test_embed_url_suppresses_chrome() {
        let url = embed_url(&VideoId::from("dQw4w9WgXcQ"));
        assert!(url.starts_with("https://www.youtube.com/embed/dQw4w9WgXcQ?"));
        assert!(url.contains("modestbranding=1"));
        assert!(url.contains("rel=0"));
    }
}
