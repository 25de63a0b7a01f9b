//! Remote source error types.
//!
//! These stay inside the remote tier: the pipeline turns any of them into a
//! skip and moves on to the next tier.

use thiserror::Error;

/// Errors that can occur while scraping a remote past-paper site.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    /// The request did not finish within its timeout.
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// No link on the index page names the subject.
    #[error("could not locate a page for subject '{0}'")]
    SubjectNotFound(String),

    /// A linked attachment is not a document we can read.
    #[error("not a document response for {url} (content-type {content_type})")]
    NotADocument { url: String, content_type: String },

    /// Text extraction from a document failed.
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// Crawling finished without finding a single question.
    #[error("no questions found for {subject} / {term}")]
    NoContent { subject: String, term: String },

    /// A configured or scraped URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    /// Map a reqwest failure for `url`, distinguishing timeouts.
    pub fn from_reqwest(url: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            SourceError::Timeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SourceError::Network(err.to_string())
        }
    }
}
