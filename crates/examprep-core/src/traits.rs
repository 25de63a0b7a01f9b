//! Trait seams for paper acquisition.
//!
//! A [`PaperSource`] is one tier of the acquisition chain. It either yields a
//! paper set or tells the chain to move on; it never returns an error. A
//! [`PaperAcquirer`] is the whole chain as the session engine sees it, and it
//! always produces a non-empty paper set.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::PaperSet;

/// Which tier produced a paper set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperOrigin {
    Cache,
    Remote,
    Synthetic,
    Document,
}

impl fmt::Display for PaperOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperOrigin::Cache => write!(f, "cache"),
            PaperOrigin::Remote => write!(f, "remote"),
            PaperOrigin::Synthetic => write!(f, "synthetic"),
            PaperOrigin::Document => write!(f, "document"),
        }
    }
}

/// Result of asking one tier for papers.
#[derive(Debug, Clone)]
pub enum TierOutcome {
    /// The tier produced a usable, non-empty set.
    Acquired(PaperSet),
    /// The tier had nothing; continue with the next one.
    Skipped { reason: String },
}

impl TierOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        TierOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// Collapse an acquired-but-empty set into a skip.
    pub fn non_empty(self) -> Self {
        match self {
            TierOutcome::Acquired(set) if set.is_empty() => {
                TierOutcome::skipped("tier returned an empty paper set")
            }
            other => other,
        }
    }
}

/// One tier of the acquisition chain.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Human-readable tier name (e.g. "pastpapers").
    fn name(&self) -> &str;

    /// Which origin to report when this tier succeeds.
    fn origin(&self) -> PaperOrigin;

    /// Try to acquire papers for a subject and term.
    async fn acquire(&self, subject: &str, term: &str) -> TierOutcome;
}

/// A paper set together with the tier that produced it.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub papers: PaperSet,
    pub origin: PaperOrigin,
}

/// The full acquisition chain. Implementations must never return an empty set.
#[async_trait]
pub trait PaperAcquirer: Send + Sync {
    async fn acquire(&self, subject: &str, term: &str) -> Acquisition;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_acquisition_becomes_skip() {
        let outcome = TierOutcome::Acquired(PaperSet::new()).non_empty();
        assert!(matches!(outcome, TierOutcome::Skipped { .. }));
    }

    #[test]
    fn origin_display() {
        assert_eq!(PaperOrigin::Synthetic.to_string(), "synthetic");
        assert_eq!(
            serde_json::to_string(&PaperOrigin::Remote).unwrap(),
            "\"remote\""
        );
    }
}
