//! Exam session engine.
//!
//! The logical surface consumed by an HTTP layer or the CLI: start a
//! session, fetch papers, ask, evaluate, and read progress.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::EngineError;
use crate::model::{normalize_term, subject_key, PaperSet, Question};
use crate::registry::SessionRegistry;
use crate::session::{Evaluation, Progress, ProgressSnapshot};
use crate::traits::{PaperAcquirer, PaperOrigin};

/// Configuration for the exam engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Sessions idle for longer than this are purged; `None` keeps them forever.
    pub session_idle_ttl: Option<Duration>,
}

/// Parameters for starting a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSession {
    pub mode: String,
    pub term: String,
    pub subject: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Summary of a paper fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSummary {
    pub session_id: String,
    /// year -> question count
    pub papers: BTreeMap<i32, usize>,
    pub total_questions: usize,
    pub origin: PaperOrigin,
}

/// A served question (answer stripped) with the current progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskedQuestion {
    pub session_id: String,
    pub question: Question,
    pub progress: Progress,
}

/// The central exam engine.
pub struct ExamEngine {
    registry: SessionRegistry,
    acquirer: Arc<dyn PaperAcquirer>,
}

impl ExamEngine {
    pub fn new(acquirer: Arc<dyn PaperAcquirer>, config: EngineConfig) -> Self {
        Self {
            registry: SessionRegistry::new().with_idle_ttl(config.session_idle_ttl),
            acquirer,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Start (or re-affirm) a session and return its id.
    pub async fn start_session(&self, request: StartSession) -> Result<String, EngineError> {
        self.registry.purge_idle().await;
        self.registry
            .create(
                request.session_id.as_deref(),
                &request.mode,
                &request.term,
                &request.subject,
            )
            .await
    }

    /// Run the acquisition pipeline for the session's subject and term and
    /// install the result.
    ///
    /// `subject` and `term` are optional; when given they must name the
    /// session's own subject and term.
    #[instrument(skip(self))]
    pub async fn fetch_papers(
        &self,
        session_id: &str,
        subject: Option<&str>,
        term: Option<&str>,
    ) -> Result<FetchSummary, EngineError> {
        let handle = self.registry.get(session_id).await?;
        let mut session = handle.lock().await;

        if let Some(subject) = subject.filter(|s| !s.trim().is_empty()) {
            if subject_key(subject) != subject_key(session.subject()) {
                return Err(EngineError::InvalidArgument(format!(
                    "subject '{subject}' does not match session subject '{}'",
                    session.subject()
                )));
            }
        }
        if let Some(term) = term.filter(|t| !t.trim().is_empty()) {
            if !normalize_term(term).eq_ignore_ascii_case(&normalize_term(session.term())) {
                return Err(EngineError::InvalidArgument(format!(
                    "term '{term}' does not match session term '{}'",
                    session.term()
                )));
            }
        }

        let acquisition = self
            .acquirer
            .acquire(session.subject(), session.term())
            .await;
        tracing::info!(
            session = %session_id,
            origin = %acquisition.origin,
            total = acquisition.papers.total(),
            "papers loaded"
        );

        let summary = summarize(session_id, &acquisition.papers, acquisition.origin);
        session.load_papers(acquisition.papers);
        Ok(summary)
    }

    /// Install a paper set obtained outside the pipeline (e.g. an uploaded
    /// document). Same reset semantics as [`fetch_papers`](Self::fetch_papers).
    pub async fn load_papers(
        &self,
        session_id: &str,
        papers: PaperSet,
    ) -> Result<FetchSummary, EngineError> {
        if papers.is_empty() {
            return Err(EngineError::InvalidArgument(
                "document contained no questions".into(),
            ));
        }
        let handle = self.registry.get(session_id).await?;
        let mut session = handle.lock().await;
        let summary = summarize(session_id, &papers, PaperOrigin::Document);
        session.load_papers(papers);
        tracing::info!(session = %session_id, total = summary.total_questions, "document papers loaded");
        Ok(summary)
    }

    /// Serve the next question with its answer stripped.
    pub async fn ask_question(&self, session_id: &str) -> Result<AskedQuestion, EngineError> {
        let handle = self.registry.get(session_id).await?;
        let mut session = handle.lock().await;
        let question = session.next_question()?;
        Ok(AskedQuestion {
            session_id: session_id.to_string(),
            question: question.redacted(),
            progress: session.progress(),
        })
    }

    /// Grade an answer.
    pub async fn evaluate(
        &self,
        session_id: &str,
        question_id: &str,
        user_answer: &str,
    ) -> Result<Evaluation, EngineError> {
        let handle = self.registry.get(session_id).await?;
        let mut session = handle.lock().await;
        session.evaluate(question_id, user_answer)
    }

    /// Read-only progress snapshot.
    pub async fn progress(&self, session_id: &str) -> Result<ProgressSnapshot, EngineError> {
        let handle = self.registry.get(session_id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }
}

fn summarize(session_id: &str, papers: &PaperSet, origin: PaperOrigin) -> FetchSummary {
    FetchSummary {
        session_id: session_id.to_string(),
        papers: papers.counts(),
        total_questions: papers.total(),
        origin,
    }
}
