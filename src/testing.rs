//! Mock providers for tests.
//!
//! Each mock records the calls it receives and returns configurable data, so
//! the orchestrator and HTTP layer can be exercised without network access.
//!
//! ```rust,ignore
//! use ytsum::testing::{MockMetadataProvider, MockSummarizer, MockTranscriptProvider};
//!
//! let metadata = MockMetadataProvider::new();
//! metadata.set_comments(vec!["great video".into()]);
//!
//! let transcripts = MockTranscriptProvider::without_transcript();
//! let summarizer = MockSummarizer::new();
//! ```

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use eyre::{Result, eyre};

use crate::{MetadataProvider, Summarizer, Transcript, TranscriptProvider, VideoMetadata};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Test fixtures.
pub mod fixtures {
    use crate::{Segment, Transcript, VideoMetadata};

    /// Metadata with a medium thumbnail URL derived from `video_id`.
    pub fn metadata(video_id: &str, title: &str) -> VideoMetadata {
        VideoMetadata {
            title: title.to_string(),
            author: "Test Channel".to_string(),
            description: format!("Description of {title}"),
            thumbnail_url: format!("https://i.ytimg.com/vi/{video_id}/mqdefault.jpg"),
        }
    }

    /// Transcript with one segment per word of `text`.
    pub fn transcript(video_id: &str, text: &str) -> Transcript {
        Transcript {
            video_id: video_id.to_string(),
            language: "en".to_string(),
            segments: text
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| Segment {
                    text: word.to_string(),
                    start: i as f64,
                    duration: 1.0,
                })
                .collect(),
        }
    }
}

/// Mock metadata provider.
#[derive(Debug, Default)]
pub struct MockMetadataProvider {
    metadata: Mutex<Option<VideoMetadata>>,
    comments: Mutex<Vec<String>>,
    comments_error: Mutex<Option<String>>,
    metadata_calls: Mutex<Vec<String>>,
    comment_calls: Mutex<Vec<(String, u32)>>,
}

impl MockMetadataProvider {
    /// A provider that knows no videos and has no comments.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: VideoMetadata) -> Self {
        let provider = Self::new();
        provider.set_metadata(Some(metadata));
        provider
    }

    pub fn set_metadata(&self, metadata: Option<VideoMetadata>) {
        *lock(&self.metadata) = metadata;
    }

    pub fn set_comments(&self, comments: Vec<String>) {
        *lock(&self.comments) = comments;
    }

    /// Make every subsequent comment lookup fail with `message`.
    pub fn fail_comments(&self, message: &str) {
        *lock(&self.comments_error) = Some(message.to_string());
    }

    /// Video IDs passed to `video_metadata`, in call order.
    pub fn metadata_calls(&self) -> Vec<String> {
        lock(&self.metadata_calls).clone()
    }

    /// `(video_id, max_results)` passed to `top_comments`, in call order.
    pub fn comment_calls(&self) -> Vec<(String, u32)> {
        lock(&self.comment_calls).clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        lock(&self.metadata_calls).push(video_id.to_string());
        Ok(lock(&self.metadata).clone())
    }

    async fn top_comments(&self, video_id: &str, max_results: u32) -> Result<Vec<String>> {
        lock(&self.comment_calls).push((video_id.to_string(), max_results));
        if let Some(message) = lock(&self.comments_error).clone() {
            return Err(eyre!(message));
        }
        Ok(lock(&self.comments)
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

/// Mock transcript provider.
#[derive(Debug, Default)]
pub struct MockTranscriptProvider {
    text: Mutex<Option<String>>,
    error: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockTranscriptProvider {
    /// A provider that returns `text` as a word-per-segment transcript.
    pub fn with_text(text: &str) -> Self {
        let provider = Self::default();
        *lock(&provider.text) = Some(text.to_string());
        provider
    }

    /// A provider that reports no captions for every video.
    pub fn without_transcript() -> Self {
        Self::default()
    }

    /// Make every subsequent lookup fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *lock(&self.error) = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl TranscriptProvider for MockTranscriptProvider {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        lock(&self.calls).push(video_id.to_string());
        if let Some(message) = lock(&self.error).clone() {
            return Err(eyre!(message));
        }
        Ok(lock(&self.text).as_deref().map(|text| fixtures::transcript(video_id, text)))
    }
}

/// Mock summarizer that answers `summary(<input>)` for every request.
#[derive(Debug, Default)]
pub struct MockSummarizer {
    requests: Mutex<Vec<String>>,
    error: Mutex<Option<String>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent request fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *lock(&self.error) = Some(message.to_string());
    }

    /// Texts sent for summarization, in call order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize_text(&self, text: &str) -> Result<String> {
        lock(&self.requests).push(text.to_string());
        if let Some(message) = lock(&self.error).clone() {
            return Err(eyre!(message));
        }
        Ok(format!("summary({text})"))
    }
}
