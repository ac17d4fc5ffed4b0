use async_trait::async_trait;
use eyre::{Result, bail};
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{MetadataProvider, VideoMetadata};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: Comment,
}

#[derive(Debug, Deserialize)]
struct Comment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay", default)]
    text_display: String,
}

/// Metadata provider backed by the YouTube Data API v3
#[derive(Debug, Clone)]
pub struct DataApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DataApiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point requests at another Data API root (no trailing slash)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MetadataProvider for DataApiClient {
    async fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        debug!("Fetching video snippet for {video_id}");

        let resp = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "snippet"), ("id", video_id), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("YouTube Data API returned {status}: {body}");
        }

        let list: VideoListResponse = resp.json().await?;
        Ok(first_video(list))
    }

    async fn top_comments(&self, video_id: &str, max_results: u32) -> Result<Vec<String>> {
        debug!("Fetching up to {max_results} comment threads for {video_id}");

        let max_results = max_results.to_string();
        let resp = self
            .client
            .get(format!("{}/commentThreads", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if comments_unavailable(status, &body) {
                warn!("Comments unavailable for {video_id} ({status})");
                return Ok(Vec::new());
            }
            bail!("YouTube Data API returned {status}: {body}");
        }

        let list: CommentThreadListResponse = resp.json().await?;
        Ok(comment_texts(list))
    }
}

fn first_video(list: VideoListResponse) -> Option<VideoMetadata> {
    let snippet = list.items.into_iter().next()?.snippet;
    let thumbnails = snippet.thumbnails;
    let thumbnail_url = thumbnails
        .medium
        .or(thumbnails.high)
        .or(thumbnails.default)
        .map(|t| t.url)
        .unwrap_or_default();

    Some(VideoMetadata {
        title: snippet.title,
        author: snippet.channel_title,
        description: snippet.description,
        thumbnail_url,
    })
}

fn comment_texts(list: CommentThreadListResponse) -> Vec<String> {
    list.items
        .into_iter()
        .map(|t| t.snippet.top_level_comment.snippet.text_display)
        .collect()
}

/// Disabled comments and unknown videos mean "no comments", not a failure
fn comments_unavailable(status: StatusCode, body: &str) -> bool {
    match status {
        StatusCode::FORBIDDEN => body.contains("commentsDisabled"),
        StatusCode::NOT_FOUND => body.contains("videoNotFound"),
        _ => false,
    }
}
