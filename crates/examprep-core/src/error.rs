//! Session engine error types.
//!
//! Acquisition failures never appear here: the paper pipeline absorbs them
//! and degrades to a lower tier instead.

use thiserror::Error;

/// Errors surfaced by the exam session engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required start parameter was empty or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No session exists with this id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The id is already bound to a session with different parameters.
    #[error("session {session_id} already exists with different mode/term/subject")]
    SessionConflict { session_id: String },

    /// `ask` was called before any papers were loaded.
    #[error("papers not loaded for session {0}; fetch papers first")]
    PapersNotLoaded(String),

    /// The question id is neither the last served question nor in the paper set.
    #[error("question {question_id} not found in session {session_id}")]
    QuestionNotFound {
        session_id: String,
        question_id: String,
    },
}

impl EngineError {
    /// Returns `true` if the caller is at fault. Every engine error is a
    /// client error and none of them should be retried unchanged.
    pub fn is_client_error(&self) -> bool {
        true
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidArgument(_) => "invalid_argument",
            EngineError::SessionNotFound(_) => "session_not_found",
            EngineError::SessionConflict { .. } => "session_conflict",
            EngineError::PapersNotLoaded(_) => "papers_not_loaded",
            EngineError::QuestionNotFound { .. } => "question_not_found",
        }
    }
}
