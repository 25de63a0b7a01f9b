//! Mock paper source for testing.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use examprep_core::model::PaperSet;
use examprep_core::traits::{PaperOrigin, PaperSource, TierOutcome};

/// A tier that returns a fixed outcome and records how it was called.
pub struct MockSource {
    name: String,
    origin: PaperOrigin,
    outcome: TierOutcome,
    call_count: AtomicU32,
    last_request: Mutex<Option<(String, String)>>,
}

impl MockSource {
    /// A remote-like tier that always yields `papers`.
    pub fn acquiring(papers: PaperSet) -> Self {
        Self::with_outcome(TierOutcome::Acquired(papers))
    }

    /// A tier that always skips with `reason`.
    pub fn skipping(reason: &str) -> Self {
        Self::with_outcome(TierOutcome::skipped(reason))
    }

    fn with_outcome(outcome: TierOutcome) -> Self {
        Self {
            name: "mock".to_string(),
            origin: PaperOrigin::Remote,
            outcome,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Number of calls made to this tier.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Subject and term of the last call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl PaperSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> PaperOrigin {
        self.origin
    }

    async fn acquire(&self, subject: &str, term: &str) -> TierOutcome {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock() = Some((subject.to_string(), term.to_string()));
        self.outcome.clone()
    }
}
