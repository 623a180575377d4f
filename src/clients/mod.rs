use async_trait::async_trait;
use serde::Deserialize;

pub mod apify;
pub mod openai;

use crate::Result;

/// A raw reel record as returned by the discovery service.
///
/// Only the fields the pipeline consumes are modeled; the scraper returns
/// many more.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPostRecord {
    /// Short code identifying the post; absent for some non-reel items.
    pub code: Option<String>,

    /// Play/view count. Absent for posts the platform does not expose it on.
    pub play_count: Option<u64>,

    pub comment_count: Option<u64>,

    pub like_count: Option<u64>,
}

/// A single downloadable media location from the media resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaEntry {
    pub url: String,
}

/// Trait for discovering a creator's posts and resolving their media
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostDiscovery: Send + Sync {
    /// List a creator's recent reel records, newest first.
    async fn list_posts(&self, handle: &str, limit: u32) -> Result<Vec<RawPostRecord>>;

    /// Resolve the downloadable media entries for a single post URL.
    ///
    /// The resolver returns entries in its own documented order; it carries
    /// no type tag distinguishing video from audio.
    async fn resolve_media(&self, post_url: &str) -> Result<Vec<MediaEntry>>;
}

/// Trait for speech-to-text transcription of a whole audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechTranscription: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;
}

/// Trait for free-text description of a single still frame
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionDescription: Send + Sync {
    async fn describe_frame(&self, image: &[u8]) -> Result<String>;
}

/// Trait for general text generation under a system directive
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}
