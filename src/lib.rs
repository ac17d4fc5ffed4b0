pub mod config;
pub mod metadata;
pub mod orchestrator;
pub mod server;
pub mod summarize;
pub mod testing;
pub mod youtube;

use std::sync::LazyLock;

use async_trait::async_trait;
use eyre::Result;
use regex::Regex;

/// A single captioned segment
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Transcript for a video, built from one caption track
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// All segment texts joined by single spaces, in track order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Snippet data for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub thumbnail_url: String,
}

impl VideoMetadata {
    /// Placeholder used when the provider has no item for the requested ID
    pub fn not_found() -> Self {
        Self {
            title: "Video not found".to_string(),
            author: String::new(),
            description: String::new(),
            thumbnail_url: String::new(),
        }
    }
}

/// Video snippet and comment lookups
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch snippet data; `None` when no video matches the ID
    async fn video_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>>;

    /// Fetch up to `max_results` top-level comment bodies as plain text
    async fn top_comments(&self, video_id: &str, max_results: u32) -> Result<Vec<String>>;
}

/// Caption lookups
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the preferred transcript; `None` when the video has no captions
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<Transcript>>;
}

/// Text summarization backend
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize_text(&self, text: &str) -> Result<String>;
}

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("bare video ID regex"));

static URL_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:(?:shorts|live|embed|e|v)/|[^/\n\s]+/\S+/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video URL regex")
});

/// Extract video ID from various YouTube URL formats
///
/// Only URL shapes match; a bare ID is not a URL and yields `None`.
pub fn extract_video_id(input: &str) -> Option<String> {
    URL_ID_RE.captures(input.trim()).map(|caps| caps[1].to_string())
}

/// True when `input` is exactly an 11-character video ID
pub fn is_video_id(input: &str) -> bool {
    BARE_ID_RE.is_match(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id_is_not_a_url() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("hello_world"), None);
        assert_eq!(extract_video_id("not-a-valid"), None);
    }

    #[test]
    fn test_is_video_id() {
        assert!(is_video_id("dQw4w9WgXcQ"));
        assert!(is_video_id("  hello_world "));
        assert!(!is_video_id("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_video_id("short"));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=ABCDEFGHIJK"),
            Some("ABCDEFGHIJK".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_v_not_first() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url_with_timestamp() {
        assert_eq!(
            extract_video_id("https://youtu.be/ABCDEFGHIJK?t=30"),
            Some("ABCDEFGHIJK".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_v_url() {
        assert_eq!(
            extract_video_id("http://youtube.com/v/dQw4w9WgXcQ?version=3"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_scheme_less_url() {
        assert_eq!(
            extract_video_id("youtube.com/watch?v=a-b_c1234_Z"),
            Some("a-b_c1234_Z".to_string())
        );
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-valid-id"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(
            extract_video_id("  https://youtu.be/dQw4w9WgXcQ  "),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_transcript_text_joins_with_spaces() {
        let t = Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "en".to_string(),
            segments: vec![
                Segment {
                    text: "Hello world".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                Segment {
                    text: "again".to_string(),
                    start: 1.5,
                    duration: 2.0,
                },
            ],
        };
        assert_eq!(t.text(), "Hello world again");
    }

    #[test]
    fn test_not_found_metadata() {
        let m = VideoMetadata::not_found();
        assert_eq!(m.title, "Video not found");
        assert!(m.author.is_empty());
        assert!(m.description.is_empty());
        assert!(m.thumbnail_url.is_empty());
    }
}
