//! YouTube Data API v3 catalog gateway.
//!
//! Stateless request/response wrapper over three read endpoints:
//! subscription listing, video search (free-text or channel-scoped) and
//! video details. Snippet fields only; statistics (view counts) and
//! comment threads are never requested.
//!
//! Failures propagate as typed [`CatalogError`]s; authorization and
//! quota problems are never silently mapped to empty results, and the
//! gateway performs no retries of its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::identity::TokenStore;
use super::{CatalogApi, CatalogError, DETAILS_BATCH_LIMIT};
use crate::domain::video::{ChannelId, VideoId, VideoSummary};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// One page worth of subscriptions, the documented listing cap.
const SUBSCRIPTIONS_PAGE_SIZE: usize = 50;

/// Catalog gateway backed by the public YouTube Data API.
pub struct YouTubeCatalog {
    client: reqwest::Client,
    api_key: String,
    tokens: TokenStore,
}

impl YouTubeCatalog {
    /// Create a gateway using `api_key` for every call and attaching a
    /// bearer token from `tokens` when one is available.
    pub fn new(api_key: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            tokens,
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", API_BASE, resource)
    }

    /// Issue a GET against a catalog resource and decode the page type.
    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let mut request = self
            .client
            .get(self.endpoint(resource))
            .query(query)
            .query(&[("key", self.api_key.as_str())]);

        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Map a non-success catalog response to a typed error.
///
/// The service reports quota exhaustion as 403 with a reason code; both
/// 401 and the remaining 403s are authorization failures.
fn map_error_response(status: u16, body: &str) -> CatalogError {
    let parsed: Option<ApiErrorEnvelope> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let reasons: Vec<&str> = parsed
        .as_ref()
        .map(|e| e.error.errors.iter().map(|i| i.reason.as_str()).collect())
        .unwrap_or_default();

    let quota = reasons
        .iter()
        .any(|r| matches!(*r, "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded"));

    match status {
        403 if quota => CatalogError::QuotaExceeded(message),
        401 | 403 => CatalogError::Unauthorized(message),
        _ => CatalogError::Api { status, message },
    }
}

#[async_trait]
impl CatalogApi for YouTubeCatalog {
    async fn list_my_subscriptions(&self) -> Result<Vec<ChannelId>, CatalogError> {
        if self.tokens.get().is_none() {
            return Err(CatalogError::Unauthorized(
                "subscription listing requires a signed-in session".to_string(),
            ));
        }

        let page_size = SUBSCRIPTIONS_PAGE_SIZE.to_string();
        let page: SubscriptionPage = self
            .get_page(
                "subscriptions",
                &[
                    ("part", "snippet"),
                    ("mine", "true"),
                    ("maxResults", &page_size),
                    ("order", "relevance"),
                ],
            )
            .await?;

        Ok(page
            .items
            .into_iter()
            .map(|item| ChannelId(item.snippet.resource_id.channel_id))
            .collect())
    }

    async fn list_recent_video_ids(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<VideoId>, CatalogError> {
        let page_size = limit.to_string();
        let page: SearchPage = self
            .get_page(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", channel.as_str()),
                    ("maxResults", &page_size),
                    ("order", "date"),
                    ("type", "video"),
                    ("safeSearch", "none"),
                ],
            )
            .await?;

        Ok(collect_video_ids(page))
    }

    async fn search_video_ids(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VideoId>, CatalogError> {
        let page_size = limit.to_string();
        let page: SearchPage = self
            .get_page(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("maxResults", &page_size),
                    ("type", "video"),
                    ("safeSearch", "none"),
                ],
            )
            .await?;

        Ok(collect_video_ids(page))
    }

    async fn fetch_video_details(
        &self,
        ids: &[VideoId],
    ) -> Result<Vec<VideoSummary>, CatalogError> {
        if ids.len() > DETAILS_BATCH_LIMIT {
            return Err(CatalogError::BatchTooLarge(ids.len()));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(VideoId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let page: VideoPage = self
            .get_page(
                "videos",
                &[("part", "snippet,contentDetails"), ("id", &joined)],
            )
            .await?;

        Ok(page.items.into_iter().map(VideoItem::into_summary).collect())
    }
}

/// Keep only results that identify an actual video.
fn collect_video_ids(page: SearchPage) -> Vec<VideoId> {
    page.items
        .into_iter()
        .filter_map(|item| item.id.video_id)
        .map(VideoId)
        .collect()
}

// Wire format ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubscriptionPage {
    #[serde(default)]
    items: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet {
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

/// Search results carry a compound id; only video-kind items have a
/// `videoId`, so playlists and channels drop out during extraction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoPage {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    content_details: Option<ContentDetails>,
}

impl VideoItem {
    /// Normalize a raw detail record, preferring the medium thumbnail
    /// and falling back to the default size.
    fn into_summary(self) -> VideoSummary {
        let thumbnail_url = self
            .snippet
            .thumbnails
            .and_then(|t| t.medium.or(t.default).map(|t| t.url));

        VideoSummary {
            id: VideoId(self.id),
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            thumbnail_url,
            duration: self.content_details.and_then(|d| d.duration),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
    published_at: DateTime<Utc>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_page_parsing() {
        let json = r#"{
            "items": [
                {"snippet": {"resourceId": {"kind": "youtube#channel", "channelId": "UC1"}}},
                {"snippet": {"resourceId": {"kind": "youtube#channel", "channelId": "UC2"}}}
            ]
        }"#;

        let page: SubscriptionPage = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = page
            .items
            .into_iter()
            .map(|i| i.snippet.resource_id.channel_id)
            .collect();
        assert_eq!(ids, vec!["UC1", "UC2"]);
    }

    #[test]
    fn test_search_page_drops_non_video_items() {
        let json = r#"{
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"}},
                {"id": {"kind": "youtube#playlist", "playlistId": "p1"}},
                {"id": {"kind": "youtube#video", "videoId": "v2"}}
            ]
        }"#;

        let page: SearchPage = serde_json::from_str(json).unwrap();
        let ids = collect_video_ids(page);
        assert_eq!(ids, vec![VideoId::from("v1"), VideoId::from("v2")]);
    }

    #[test]
    fn test_video_item_normalization_prefers_medium_thumbnail() {
        let json = r#"{
            "id": "v1",
            "snippet": {
                "title": "A title",
                "channelTitle": "A channel",
                "publishedAt": "2024-05-01T12:00:00Z",
                "thumbnails": {
                    "default": {"url": "https://i/default.jpg"},
                    "medium": {"url": "https://i/medium.jpg"}
                }
            },
            "contentDetails": {"duration": "PT4M13S"}
        }"#;

        let item: VideoItem = serde_json::from_str(json).unwrap();
        let summary = item.into_summary();
        assert_eq!(summary.thumbnail_url.as_deref(), Some("https://i/medium.jpg"));
        assert_eq!(summary.duration.as_deref(), Some("PT4M13S"));
        assert_eq!(summary.channel_title, "A channel");
    }

    #[test]
    fn test_video_item_normalization_falls_back_to_default_thumbnail() {
        let json = r#"{
            "id": "v1",
            "snippet": {
                "title": "A title",
                "channelTitle": "A channel",
                "publishedAt": "2024-05-01T12:00:00Z",
                "thumbnails": {"default": {"url": "https://i/default.jpg"}}
            }
        }"#;

        let item: VideoItem = serde_json::from_str(json).unwrap();
        let summary = item.into_summary();
        assert_eq!(summary.thumbnail_url.as_deref(), Some("https://i/default.jpg"));
        assert!(summary.duration.is_none());
    }

    #[test]
    fn test_error_mapping_quota() {
        let body = r#"{
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"reason": "quotaExceeded", "domain": "youtube.quota"}]
            }
        }"#;

        match map_error_response(403, body) {
            CatalogError::QuotaExceeded(msg) => assert!(msg.contains("quota")),
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_error_mapping_unauthorized() {
        let body = r#"{
            "error": {
                "code": 401,
                "message": "Invalid Credentials",
                "errors": [{"reason": "authError"}]
            }
        }"#;

        match map_error_response(401, body) {
            CatalogError::Unauthorized(msg) => assert_eq!(msg, "Invalid Credentials"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_error_mapping_other_status() {
        match map_error_response(500, "backend blew up") {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend blew up");
            }
            other => panic!("expected Api, got {:?}", other),
        }
    }
}
