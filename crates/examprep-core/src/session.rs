//! Per-session state machine.
//!
//! A session moves `Created → PapersLoaded → (Asking ⇄ Evaluated)`. It owns
//! its paper set, remembers which questions were already served in the
//! current cycle, and applies the scoring, streak, badge and readiness rules
//! on every evaluation. All mutation goes through `&mut self`; the registry
//! wraps each session in its own mutex.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::EngineError;
use crate::matcher;
use crate::model::{normalize_term, subject_key, Mode, PaperSet, Question};
use crate::remediation::{badge_name, teaching_steps, TeachingStep};

/// Points for any correct answer before the streak bonus.
pub const BASE_POINTS: u32 = 10;
/// Cap on the streak bonus (`streak * 2`).
pub const MAX_STREAK_BONUS: u32 = 10;
/// Consecutive correct answers needed for a mastery badge.
pub const BADGE_STREAK: u32 = 3;
/// Readiness gained per correct answer.
pub const READINESS_STEP: u8 = 2;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Created,
    PapersLoaded,
    Asking,
    Evaluated,
}

/// Gamified progress within one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub points: u32,
    pub streak: u32,
    /// Held badges, sorted.
    pub badges: Vec<String>,
    pub readiness_percent: u8,
}

/// Progress plus identity and freshness, as returned by a snapshot read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub session_id: String,
    #[serde(flatten)]
    pub progress: Progress,
    pub last_updated: DateTime<Utc>,
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub question_id: String,
    pub correct: bool,
    /// 0 when incorrect, otherwise in `[10, 20]`.
    pub points_awarded: u32,
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_earned: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teaching_steps: Option<Vec<TeachingStep>>,
    /// A same-type follow-up is queued for the next ask.
    pub next_question_ready: bool,
    pub progress: Progress,
}

/// The fixed parameters a session was started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub mode: Mode,
    pub term: String,
    pub subject: String,
}

impl SessionParams {
    /// `true` if both name the same session: mode exact, term and subject
    /// after normalization.
    pub fn matches(&self, other: &SessionParams) -> bool {
        self.mode == other.mode
            && normalize_term(&self.term).eq_ignore_ascii_case(&normalize_term(&other.term))
            && subject_key(&self.subject) == subject_key(&other.subject)
    }
}

/// One student's exam-practice session.
#[derive(Debug)]
pub struct ExamSession {
    id: String,
    mode: Mode,
    term: String,
    subject: String,
    papers: PaperSet,
    used: HashSet<String>,
    points: u32,
    streak: u32,
    badges: BTreeSet<String>,
    /// Badges already announced during the current unbroken streak.
    announced: HashSet<String>,
    readiness: u8,
    last_question: Option<Question>,
    follow_up: Option<String>,
    phase: SessionPhase,
    last_updated: DateTime<Utc>,
    last_touched: Instant,
    rng: StdRng,
}

impl ExamSession {
    /// Create a session. Mode, term and subject must be non-empty.
    pub fn new(id: impl Into<String>, mode: &str, term: &str, subject: &str) -> Result<Self, EngineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::InvalidArgument("session id must not be empty".into()));
        }
        for (name, value) in [("mode", mode), ("term", term), ("subject", subject)] {
            if value.trim().is_empty() {
                return Err(EngineError::InvalidArgument(format!("{name} is required")));
            }
        }
        let mode = mode.parse::<Mode>().map_err(EngineError::InvalidArgument)?;

        Ok(Self {
            id,
            mode,
            term: term.trim().to_string(),
            subject: subject.trim().to_string(),
            papers: PaperSet::new(),
            used: HashSet::new(),
            points: 0,
            streak: 0,
            badges: BTreeSet::new(),
            announced: HashSet::new(),
            readiness: 0,
            last_question: None,
            follow_up: None,
            phase: SessionPhase::Created,
            last_updated: Utc::now(),
            last_touched: Instant::now(),
            rng: StdRng::from_os_rng(),
        })
    }

    /// Use a fixed RNG seed so question selection is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn papers(&self) -> &PaperSet {
        &self.papers
    }

    pub fn used_question_ids(&self) -> &HashSet<String> {
        &self.used
    }

    pub fn last_question(&self) -> Option<&Question> {
        self.last_question.as_ref()
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Monotonic time of the last operation, used for idle expiry.
    pub fn last_touched(&self) -> Instant {
        self.last_touched
    }

    pub fn params(&self) -> SessionParams {
        SessionParams {
            mode: self.mode,
            term: self.term.clone(),
            subject: self.subject.clone(),
        }
    }

    /// Replace the paper set and restart the question cycle.
    pub fn load_papers(&mut self, papers: PaperSet) {
        self.papers = papers;
        self.used.clear();
        self.last_question = None;
        self.follow_up = None;
        self.phase = SessionPhase::PapersLoaded;
        self.touch();
    }

    /// Serve the next question.
    ///
    /// A queued follow-up wins. Otherwise a year is drawn uniformly among
    /// years that still hold an unused question, then a question uniformly
    /// within that year. When every question was used, the cycle restarts.
    pub fn next_question(&mut self) -> Result<Question, EngineError> {
        if self.papers.is_empty() {
            return Err(EngineError::PapersNotLoaded(self.id.clone()));
        }

        let queued = self
            .follow_up
            .take()
            .and_then(|id| self.papers.find(&id).cloned());

        let question = match queued {
            Some(q) => q,
            None => {
                let mut drawn = self.draw_unused();
                if drawn.is_none() {
                    tracing::debug!(session = %self.id, "question pool exhausted, starting a new cycle");
                    self.used.clear();
                    drawn = self.draw_unused();
                }
                drawn.ok_or_else(|| EngineError::PapersNotLoaded(self.id.clone()))?
            }
        };

        self.used.insert(question.id.clone());
        self.last_question = Some(question.clone());
        self.phase = SessionPhase::Asking;
        self.touch();
        Ok(question)
    }

    fn draw_unused(&mut self) -> Option<Question> {
        let used = &self.used;
        let buckets: Vec<Vec<&Question>> = self
            .papers
            .iter()
            .map(|(_, qs)| qs.iter().filter(|q| !used.contains(&q.id)).collect::<Vec<_>>())
            .filter(|qs| !qs.is_empty())
            .collect();
        let bucket = buckets.choose(&mut self.rng)?;
        bucket.choose(&mut self.rng).map(|q| (*q).clone())
    }

    /// Grade an answer and apply the scoring rules.
    pub fn evaluate(&mut self, question_id: &str, user_answer: &str) -> Result<Evaluation, EngineError> {
        let reference = match &self.last_question {
            Some(q) if q.id == question_id => q.clone(),
            _ => self
                .papers
                .find(question_id)
                .cloned()
                .ok_or_else(|| EngineError::QuestionNotFound {
                    session_id: self.id.clone(),
                    question_id: question_id.to_string(),
                })?,
        };
        self.last_question = Some(reference.clone());
        if self.follow_up.as_deref() == Some(question_id) {
            self.follow_up = None;
        }

        let correct = matcher::matches(user_answer, reference.answer.as_deref());
        let kind = reference.kind_or_general().to_string();

        let mut points_awarded = 0;
        let mut badge_earned = None;
        let mut explanation = None;
        let mut steps = None;

        if correct {
            self.streak += 1;
            points_awarded = BASE_POINTS + (self.streak * 2).min(MAX_STREAK_BONUS);
            self.points += points_awarded;
            self.readiness = (self.readiness + READINESS_STEP).min(100);

            if self.streak >= BADGE_STREAK {
                let badge = badge_name(&kind);
                if self.announced.insert(badge.clone()) {
                    self.badges.insert(badge.clone());
                    badge_earned = Some(badge);
                }
            }
        } else {
            self.streak = 0;
            self.announced.clear();
            explanation = Some(match &reference.answer {
                Some(answer) => format!("Incorrect. The correct answer is {answer}."),
                None => "Incorrect. No reference answer is available for this question.".to_string(),
            });
            steps = Some(teaching_steps(&kind));
            self.queue_follow_up(&kind);
        }

        self.phase = SessionPhase::Evaluated;
        self.touch();

        tracing::debug!(
            session = %self.id,
            question = %reference.id,
            correct,
            points_awarded,
            streak = self.streak,
            "answer evaluated"
        );

        Ok(Evaluation {
            question_id: reference.id,
            correct,
            points_awarded,
            streak: self.streak,
            badge_earned,
            explanation,
            teaching_steps: steps,
            next_question_ready: self.follow_up.is_some(),
            progress: self.progress(),
        })
    }

    /// Pick an unused question of the same type and make it the next one served.
    fn queue_follow_up(&mut self, kind: &str) {
        let used = &self.used;
        let candidates: Vec<&Question> = self
            .papers
            .questions()
            .filter(|q| q.kind_or_general() == kind && !used.contains(&q.id))
            .collect();
        let next = candidates.choose(&mut self.rng).map(|q| (*q).clone());

        if let Some(next) = next {
            self.used.insert(next.id.clone());
            self.follow_up = Some(next.id.clone());
            self.last_question = Some(next);
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            points: self.points,
            streak: self.streak,
            badges: self.badges.iter().cloned().collect(),
            readiness_percent: self.readiness,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            session_id: self.id.clone(),
            progress: self.progress(),
            last_updated: self.last_updated,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
        self.last_touched = Instant::now();
    }
}
