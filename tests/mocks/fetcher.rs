use std::sync::{Arc, Mutex};
use ytsum::error::TranscriptError;
use ytsum::{Segment, Transcript, TranscriptFetcher};

#[derive(Clone)]
pub struct MockFetcher {
    pub segments: Vec<Segment>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub unavailable: Option<String>,
}

impl MockFetcher {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            calls: Arc::new(Mutex::new(Vec::new())),
            unavailable: None,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            segments: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            unavailable: Some(reason.to_string()),
        }
    }
}

impl TranscriptFetcher for MockFetcher {
    async fn fetch(&self, video_id: &str) -> Result<Transcript, TranscriptError> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref reason) = self.unavailable {
            return Err(TranscriptError::Unavailable {
                video_id: video_id.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(Transcript {
            video_id: video_id.to_string(),
            title: "Mock Video".to_string(),
            language: "en".to_string(),
            segments: self.segments.clone(),
        })
    }
}
