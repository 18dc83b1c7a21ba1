use thiserror::Error;

/// Rejections raised before any upstream call is made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("Invalid YouTube URL")]
    InvalidUrl,
}

/// Failures while retrieving captions from YouTube
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("request to YouTube failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("video {video_id} is unavailable: {reason}")]
    Unavailable { video_id: String, reason: String },

    #[error("no captions available for video {0}")]
    NoCaptions(String),

    #[error("could not extract InnerTube API key from watch page")]
    ApiKeyNotFound,

    #[error("error parsing caption XML: {0}")]
    Xml(String),
}

/// Failures while asking the language model for a summary
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("{0} environment variable not set (required for summarization)")]
    MissingApiKey(&'static str),

    #[error("request to summarization API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {0} API response format")]
    UnexpectedResponse(&'static str),
}

/// Machine-readable classification of a [`ServiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UpstreamTranscript,
    UpstreamSummarization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::UpstreamTranscript => "upstream_transcript",
            ErrorKind::UpstreamSummarization => "upstream_summarization",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can end a transcript request early
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Summarization(#[from] SummarizeError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Transcript(_) => ErrorKind::UpstreamTranscript,
            ServiceError::Summarization(_) => ErrorKind::UpstreamSummarization,
        }
    }
}

/// Timeouts, connection failures, 429 and 5xx are worth another attempt
fn is_transient_http(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.status().is_some_and(is_transient_status)
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl TranscriptError {
    pub fn is_transient(&self) -> bool {
        match self {
            TranscriptError::Http(e) => is_transient_http(e),
            _ => false,
        }
    }
}

impl SummarizeError {
    pub fn is_transient(&self) -> bool {
        match self {
            SummarizeError::Http(e) => is_transient_http(e),
            SummarizeError::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(is_transient_status)
                .unwrap_or(false),
            _ => false,
        }
    }
}
