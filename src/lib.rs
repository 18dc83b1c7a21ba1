pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod service;
pub mod summarize;
pub mod youtube;

use serde::{Deserialize, Serialize};
use url::Url;

pub use error::{ErrorKind, ServiceError, ValidationError};
pub use service::{TranscriptService, TranscriptSummary};
pub use summarize::{LlmSummarizer, Summarizer};
pub use youtube::{CaptionClient, TranscriptFetcher};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Complete transcript for a video
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Caption text joined with single spaces, in caption order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract the video ID from a youtube.com watch URL or a youtu.be short link
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;

    match url.host_str()? {
        "www.youtube.com" | "youtube.com" => url
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned()),
        "youtu.be" => url
            .path_segments()?
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
