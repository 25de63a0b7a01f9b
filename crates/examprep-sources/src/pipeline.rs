//! Tiered paper acquisition.
//!
//! A fetch probes the cache, then asks each configured tier in order, and
//! finally falls back to the synthetic generator, which cannot fail. The
//! first non-empty set wins and is cached with the TTL of the tier that
//! produced it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use examprep_core::traits::{Acquisition, PaperAcquirer, PaperOrigin, PaperSource, TierOutcome};

use crate::cache::{cache_key, PaperCache};
use crate::synthetic::SyntheticSource;

struct Tier {
    source: Arc<dyn PaperSource>,
    ttl: Duration,
}

/// Cache → tiers → synthetic fallback.
pub struct AcquisitionPipeline {
    cache: Arc<PaperCache>,
    tiers: Vec<Tier>,
    fallback: SyntheticSource,
    fallback_ttl: Duration,
}

impl AcquisitionPipeline {
    /// A pipeline with no tiers besides the synthetic fallback, whose
    /// results are cached for `fallback_ttl`.
    pub fn new(cache: Arc<PaperCache>, fallback_ttl: Duration) -> Self {
        Self {
            cache,
            tiers: Vec::new(),
            fallback: SyntheticSource::new(),
            fallback_ttl,
        }
    }

    /// Append a tier; its results are cached for `ttl`.
    pub fn with_tier(mut self, source: Arc<dyn PaperSource>, ttl: Duration) -> Self {
        self.tiers.push(Tier { source, ttl });
        self
    }

    pub fn cache(&self) -> &Arc<PaperCache> {
        &self.cache
    }

    /// Names of the configured tiers, in order (the fallback is not listed).
    pub fn tier_names(&self) -> Vec<String> {
        self.tiers.iter().map(|t| t.source.name().to_string()).collect()
    }
}

#[async_trait]
impl PaperAcquirer for AcquisitionPipeline {
    #[instrument(skip(self))]
    async fn acquire(&self, subject: &str, term: &str) -> Acquisition {
        let key = cache_key(subject, term);
        if let Some(papers) = self.cache.get(&key).filter(|p| !p.is_empty()) {
            info!(key = %key, "paper cache hit");
            return Acquisition {
                papers,
                origin: PaperOrigin::Cache,
            };
        }

        for tier in &self.tiers {
            match tier.source.acquire(subject, term).await.non_empty() {
                TierOutcome::Acquired(papers) => {
                    info!(
                        tier = tier.source.name(),
                        total = papers.total(),
                        "papers acquired"
                    );
                    self.cache.insert(key, papers.clone(), tier.ttl);
                    return Acquisition {
                        papers,
                        origin: tier.source.origin(),
                    };
                }
                TierOutcome::Skipped { reason } => {
                    info!(tier = tier.source.name(), %reason, "tier skipped");
                }
            }
        }

        let papers = self.fallback.generate(subject, term);
        info!(total = papers.total(), "using synthetic papers");
        self.cache.insert(key, papers.clone(), self.fallback_ttl);
        Acquisition {
            papers,
            origin: PaperOrigin::Synthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use examprep_core::model::{PaperSet, Question};

    const REMOTE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
    const SYNTHETIC_TTL: Duration = Duration::from_secs(30 * 60);

    fn scraped() -> PaperSet {
        vec![Question {
            id: "2021-1".into(),
            year: 2021,
            subject: "Maths".into(),
            term: "First term".into(),
            text: "Solve 2x + 4 = 10 for the value of x.".into(),
            kind: "general".into(),
            choices: None,
            answer: None,
        }]
        .into_iter()
        .collect()
    }

    fn pipeline(tier: Arc<MockSource>) -> AcquisitionPipeline {
        AcquisitionPipeline::new(Arc::new(PaperCache::new()), SYNTHETIC_TTL).with_tier(tier, REMOTE_TTL)
    }

    #[tokio::test(start_paused = true)]
    async fn remote_result_is_cached_for_remote_ttl() {
        let remote = Arc::new(MockSource::acquiring(scraped()));
        let pipeline = pipeline(Arc::clone(&remote));

        let first = pipeline.acquire("Maths", "First term").await;
        assert_eq!(first.origin, PaperOrigin::Remote);
        assert_eq!(first.papers, scraped());

        tokio::time::advance(Duration::from_secs(5 * 60 * 60)).await;
        let second = pipeline.acquire("mathematics", "first").await;
        assert_eq!(second.origin, PaperOrigin::Cache);
        assert_eq!(second.papers, scraped());
        assert_eq!(remote.call_count(), 1);

        tokio::time::advance(Duration::from_secs(2 * 60 * 60)).await;
        let third = pipeline.acquire("Maths", "First term").await;
        assert_eq!(third.origin, PaperOrigin::Remote);
        assert_eq!(remote.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn skipped_tier_falls_back_to_synthetic() {
        let remote = Arc::new(MockSource::skipping("site unreachable"));
        let pipeline = pipeline(Arc::clone(&remote));

        let first = pipeline.acquire("Maths", "First term").await;
        assert_eq!(first.origin, PaperOrigin::Synthetic);
        assert_eq!(first.papers.total(), 12);

        let again = pipeline.acquire("Maths", "First term").await;
        assert_eq!(again.origin, PaperOrigin::Cache);
        assert_eq!(remote.call_count(), 1);

        // synthetic sets expire sooner so a recovered site gets another chance
        tokio::time::advance(SYNTHETIC_TTL + Duration::from_secs(1)).await;
        let later = pipeline.acquire("Maths", "First term").await;
        assert_eq!(later.origin, PaperOrigin::Synthetic);
        assert_eq!(remote.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_tier_result_counts_as_skip() {
        let remote = Arc::new(MockSource::acquiring(PaperSet::new()));
        let pipeline = pipeline(Arc::clone(&remote));
        let acquisition = pipeline.acquire("Science", "Second term").await;
        assert_eq!(acquisition.origin, PaperOrigin::Synthetic);
        assert_eq!(acquisition.papers.total(), 9);
    }

    #[tokio::test]
    async fn tiers_are_tried_in_order() {
        let down = Arc::new(MockSource::skipping("down").named("primary"));
        let mirror = Arc::new(MockSource::acquiring(scraped()).named("mirror"));
        let pipeline = AcquisitionPipeline::new(Arc::new(PaperCache::new()), SYNTHETIC_TTL)
            .with_tier(down.clone(), REMOTE_TTL)
            .with_tier(mirror.clone(), REMOTE_TTL);
        assert_eq!(pipeline.tier_names(), vec!["primary", "mirror"]);

        let acquisition = pipeline.acquire("Maths", "First term").await;
        assert_eq!(acquisition.origin, PaperOrigin::Remote);
        assert_eq!(down.call_count(), 1);
        assert_eq!(mirror.call_count(), 1);
        assert_eq!(
            mirror.last_request(),
            Some(("Maths".to_string(), "First term".to_string()))
        );
    }

    #[tokio::test]
    async fn no_tiers_always_produces_papers() {
        let pipeline = AcquisitionPipeline::new(Arc::new(PaperCache::new()), SYNTHETIC_TTL);
        let acquisition = pipeline.acquire("Geography", "Third term").await;
        assert_eq!(acquisition.origin, PaperOrigin::Synthetic);
        assert!(!acquisition.papers.is_empty());
        assert_eq!(pipeline.cache().len(), 1);
    }
}
