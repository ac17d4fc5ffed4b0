use std::fmt;
use std::sync::Arc;

use eyre::Result;
use log::{debug, info};
use serde::Serialize;

use crate::summarize::summarize_large_text;
use crate::{MetadataProvider, Summarizer, TranscriptProvider, VideoMetadata, extract_video_id};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_DEPTH: usize = 3;
pub const DEFAULT_COMMENT_COUNT: u32 = 10;

pub const NO_TRANSCRIPT: &str = "Transcript not available for this video.";
pub const NO_DESCRIPTION: &str = "No description available for this video.";
pub const NO_COMMENTS: &str = "No comments available for this video.";

/// Caller input that cannot be turned into a summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput(pub String);

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidInput {}

/// Transcript chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    chunk_size: usize,
    depth: usize,
}

impl SummaryOptions {
    pub fn new(chunk_size: usize, depth: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(InvalidInput("summaryLength must be greater than zero".to_string()).into());
        }
        Ok(Self { chunk_size, depth })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            depth: DEFAULT_DEPTH,
        }
    }
}

/// JSON body returned by `/generate_summary`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    pub title: String,
    pub author: String,
    pub description_summary: String,
    pub transcript_summary: String,
    #[serde(rename = "thumbnailurl")]
    pub thumbnail_url: String,
    pub video_id: String,
    pub top_comments_summary: String,
}

/// Runs the fetch-and-summarize pipeline for one video
pub struct Orchestrator {
    metadata: Arc<dyn MetadataProvider>,
    transcripts: Arc<dyn TranscriptProvider>,
    summarizer: Arc<dyn Summarizer>,
    comment_count: u32,
}

impl Orchestrator {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        transcripts: Arc<dyn TranscriptProvider>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            metadata,
            transcripts,
            summarizer,
            comment_count: DEFAULT_COMMENT_COUNT,
        }
    }

    pub fn with_comment_count(mut self, comment_count: u32) -> Self {
        self.comment_count = comment_count;
        self
    }

    /// Extract the video ID from `url` and summarize that video
    pub async fn summarize_url(&self, url: &str, options: SummaryOptions) -> Result<SummaryPayload> {
        let Some(video_id) = extract_video_id(url) else {
            return Err(InvalidInput(format!("could not extract video ID from: {url}")).into());
        };
        self.summarize_video(&video_id, options).await
    }

    pub async fn summarize_video(&self, video_id: &str, options: SummaryOptions) -> Result<SummaryPayload> {
        info!(
            "Summarizing {video_id} (chunk_size={}, depth={})",
            options.chunk_size, options.depth
        );

        let metadata = match self.metadata.video_metadata(video_id).await? {
            Some(m) => m,
            None => {
                debug!("No metadata for {video_id}, using placeholder");
                VideoMetadata::not_found()
            }
        };

        let description_summary = if metadata.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            self.summarizer.summarize_text(&metadata.description).await?
        };

        let transcript_summary = match self.transcripts.fetch_transcript(video_id).await? {
            Some(transcript) => {
                debug!(
                    "Transcript for {video_id}: {} segments ({})",
                    transcript.segments.len(),
                    transcript.language
                );
                summarize_large_text(
                    self.summarizer.as_ref(),
                    &transcript.text(),
                    options.chunk_size,
                    options.depth,
                )
                .await?
            }
            None => NO_TRANSCRIPT.to_string(),
        };

        let comments = self.metadata.top_comments(video_id, self.comment_count).await?;
        debug!("Fetched {} comments for {video_id}", comments.len());

        let top_comments_summary = if comments.is_empty() {
            NO_COMMENTS.to_string()
        } else {
            self.summarizer.summarize_text(&comments.join("\n")).await?
        };

        Ok(SummaryPayload {
            title: metadata.title,
            author: metadata.author,
            description_summary,
            transcript_summary,
            thumbnail_url: metadata.thumbnail_url,
            video_id: video_id.to_string(),
            top_comments_summary,
        })
    }
}

/// True when `err` was caused by bad caller input rather than a provider failure
pub fn is_invalid_input(err: &eyre::Report) -> bool {
    err.downcast_ref::<InvalidInput>().is_some()
}
