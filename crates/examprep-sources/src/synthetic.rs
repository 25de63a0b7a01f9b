//! Synthetic paper generator, the tier of last resort.
//!
//! Produces simple arithmetic questions tagged with the subject's topics so
//! practice never stalls when no real papers can be found. Output is
//! deterministic for a given subject, term and year.


use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use examprep_core::model::{normalize_term, subject_key, PaperSet, Question};
use examprep_core::traits::{PaperOrigin, PaperSource, TierOutcome};

/// Years the generator pretends to have papers for.
pub const SYNTHETIC_YEARS: [i32; 3] = [2019, 2020, 2023];

/// Topic tags used for a subject's synthetic questions.
pub fn topics_for(subject: &str) -> &'static [&'static str] {
    match subject_key(subject).as_str() {
        "maths" => &["algebra", "geometry", "number_theory", "probability"],
        "science" => &["physics", "chemistry", "biology"],
        "english" => &["grammar", "comprehension", "essay"],
        _ => &["general"],
    }
}

/// Generates arithmetic practice questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }

    /// Build a paper set with one question per topic per year.
    ///
    /// Even-indexed topics get a multiple-choice addition question, odd ones
    /// a free-answer multiplication. Ids run `{year}-{n}` with `n` counting
    /// up across the whole set.
    pub fn generate(&self, subject: &str, term: &str) -> PaperSet {
        let term = normalize_term(term);
        let subject = subject.trim();
        let topics = topics_for(subject);
        let mut set = PaperSet::new();
        let mut qid = 1;

        for year in SYNTHETIC_YEARS {
            let mut rng = seeded_rng(subject, &term, year);
            let questions: Vec<Question> = topics
                .iter()
                .enumerate()
                .map(|(idx, topic)| {
                    let (text, choices, answer) = if idx % 2 == 0 {
                        addition(&mut rng, topic)
                    } else {
                        multiplication(&mut rng, topic)
                    };
                    let q = Question {
                        id: format!("{year}-{qid}"),
                        year,
                        subject: subject.to_string(),
                        term: term.clone(),
                        text,
                        kind: (*topic).to_string(),
                        choices,
                        answer: Some(answer),
                    };
                    qid += 1;
                    q
                })
                .collect();
            set.extend_year(year, questions);
        }
        set
    }
}

fn addition(rng: &mut StdRng, topic: &str) -> (String, Option<Vec<String>>, String) {
    let a: i32 = rng.random_range(1..=9);
    let b: i32 = rng.random_range(1..=9);
    let sum = a + b;
    let mut options: Vec<String> = [sum, sum + 1, sum - 1, sum + 2]
        .iter()
        .map(ToString::to_string)
        .collect();
    options.shuffle(rng);
    (
        format!("[{}] What is {a} + {b}?", topic.to_uppercase()),
        Some(options),
        sum.to_string(),
    )
}

fn multiplication(rng: &mut StdRng, topic: &str) -> (String, Option<Vec<String>>, String) {
    let a: i32 = rng.random_range(2..=12);
    let b: i32 = rng.random_range(2..=12);
    (
        format!("[{}] Compute {a} x {b}", topic.to_uppercase()),
        None,
        (a * b).to_string(),
    )
}

fn seeded_rng(subject: &str, term: &str, year: i32) -> StdRng {
    let key = format!("{}|{}|{year}", subject_key(subject), term.to_lowercase());
    StdRng::seed_from_u64(fnv1a(key.as_bytes()))
}

/// 64-bit FNV-1a. Fixed across toolchains, unlike the std hasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

#[async_trait]
impl PaperSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn origin(&self) -> PaperOrigin {
        PaperOrigin::Synthetic
    }

    async fn acquire(&self, subject: &str, term: &str) -> TierOutcome {
        TierOutcome::Acquired(self.generate(subject, term))
    }
}
