use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{ServiceError, SummarizeError, TranscriptError, ValidationError};
use crate::retry::RetryPolicy;
use crate::summarize::Summarizer;
use crate::youtube::TranscriptFetcher;
use crate::{Segment, extract_video_id};

/// Successful response body for a transcript request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub transcript: Vec<Segment>,
    pub summary: String,
}

/// Resolve → fetch → summarize, with collaborators injected at startup
pub struct TranscriptService<F, S> {
    fetcher: F,
    summarizer: S,
    retry: RetryPolicy,
}

impl<F: TranscriptFetcher, S: Summarizer> TranscriptService<F, S> {
    pub fn new(fetcher: F, summarizer: S) -> Self {
        Self {
            fetcher,
            summarizer,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn run(&self, url: Option<&str>) -> Result<TranscriptSummary, ServiceError> {
        let url = url.filter(|u| !u.is_empty()).ok_or(ValidationError::MissingUrl)?;

        let video_id = extract_video_id(url).ok_or(ValidationError::InvalidUrl)?;
        debug!("Resolved {url} to video id {video_id}");

        let transcript = self
            .retry
            .run(TranscriptError::is_transient, || self.fetcher.fetch(&video_id))
            .await
            .inspect_err(|e| warn!("Transcript fetch failed for {video_id}: {e}"))?;

        info!(
            "Fetched {} caption entries for {video_id} ({}, lang={})",
            transcript.segments.len(),
            transcript.title,
            transcript.language
        );

        let transcript_text = transcript.text();
        let summary = self
            .retry
            .run(SummarizeError::is_transient, || self.summarizer.summarize(&transcript_text))
            .await
            .inspect_err(|e| warn!("Summarization failed for {video_id}: {e}"))?;

        Ok(TranscriptSummary {
            transcript: transcript.segments,
            summary,
        })
    }
}
