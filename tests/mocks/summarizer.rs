use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use ytsum::Summarizer;
use ytsum::error::SummarizeError;

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    /// HTTP status returned while `failures_left` is non-zero
    pub fail_status: u16,
    pub failures_left: Arc<AtomicU32>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_status: 0,
            failures_left: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fails `times` times with `status`, then succeeds
    pub fn flaky(summary: &str, status: u16, times: u32) -> Self {
        Self {
            fail_status: status,
            failures_left: Arc::new(AtomicU32::new(times)),
            ..Self::new(summary)
        }
    }

    pub fn failing(status: u16) -> Self {
        Self::flaky("", status, u32::MAX)
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, transcript_text: &str) -> Result<String, SummarizeError> {
        self.calls.lock().unwrap().push(transcript_text.to_string());
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SummarizeError::Api {
                provider: "Mock",
                status: self.fail_status,
                body: "mock failure".to_string(),
            });
        }
        Ok(self.summary.clone())
    }
}
