//! Core data model types for examprep.
//!
//! Questions are grouped into a [`PaperSet`] keyed by exam year. A session
//! owns exactly one paper set at a time and replaces it wholesale on fetch.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single past-paper question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within a paper set; embeds the year (e.g. "2020-4").
    pub id: String,
    /// Exam year, or 0 when the year could not be determined.
    pub year: i32,
    pub subject: String,
    pub term: String,
    /// Question text as presented to the student.
    pub text: String,
    /// Topic/type tag (e.g. "algebra", "general").
    #[serde(rename = "type")]
    pub kind: String,
    /// Ordered options for multiple-choice questions.
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    /// Gold answer. Absent for scraped free text that cannot be graded.
    #[serde(default)]
    pub answer: Option<String>,
}

impl Question {
    /// A copy with the gold answer removed, safe to hand to a client.
    pub fn redacted(&self) -> Question {
        Question {
            answer: None,
            ..self.clone()
        }
    }

    /// The question type, with an empty tag treated as "general".
    pub fn kind_or_general(&self) -> &str {
        if self.kind.trim().is_empty() {
            "general"
        } else {
            &self.kind
        }
    }
}

/// Questions grouped by exam year, in ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperSet(BTreeMap<i32, Vec<Question>>);

impl PaperSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append questions under a year, creating the bucket if needed.
    pub fn extend_year(&mut self, year: i32, questions: impl IntoIterator<Item = Question>) {
        self.0.entry(year).or_default().extend(questions);
    }

    /// Drop year buckets that ended up empty.
    pub fn prune_empty(&mut self) {
        self.0.retain(|_, qs| !qs.is_empty());
    }

    /// `true` if there is no question at all.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Total number of questions across all years.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Number of questions per year.
    pub fn counts(&self) -> BTreeMap<i32, usize> {
        self.0.iter().map(|(y, qs)| (*y, qs.len())).collect()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    /// Iterate every question, year by year.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.0.values().flatten()
    }

    /// Iterate `(year, questions)` buckets.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Question])> {
        self.0.iter().map(|(y, qs)| (*y, qs.as_slice()))
    }

    /// Linear scan for a question id.
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Distinct question types present, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .questions()
            .map(|q| q.kind_or_general().to_string())
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

impl FromIterator<Question> for PaperSet {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        let mut set = PaperSet::new();
        for q in iter {
            set.0.entry(q.year).or_default().push(q);
        }
        set
    }
}

/// Whether the student is sitting a real exam soon or just practicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Real,
    Practice,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Real => write!(f, "real"),
            Mode::Practice => write!(f, "practice"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "real" | "exam" => Ok(Mode::Real),
            "practice" | "practise" => Ok(Mode::Practice),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Canonical term label ("First term", "Second term", "Third term").
///
/// Accepts "first", "1", "1st", "term 1" and similar. Anything that does not
/// name one of the three terms is returned trimmed but otherwise unchanged.
pub fn normalize_term(term: &str) -> String {
    let t = term.trim().to_lowercase();
    let compact: String = t.chars().filter(|c| c.is_alphanumeric()).collect();
    let is = |word: &str, ordinal: &str, digit: &str| {
        t.starts_with(word)
            || compact == digit
            || compact.starts_with(ordinal)
            || compact == format!("term{digit}")
    };
    if is("first", "1st", "1") {
        "First term".to_string()
    } else if is("second", "2nd", "2") {
        "Second term".to_string()
    } else if is("third", "3rd", "3") {
        "Third term".to_string()
    } else {
        term.trim().to_string()
    }
}

/// Lowercase spellings under which a subject may appear.
pub fn subject_aliases(subject: &str) -> Vec<String> {
    let s = subject.trim().to_lowercase();
    match s.as_str() {
        "maths" | "math" | "mathematics" => {
            vec!["maths".into(), "math".into(), "mathematics".into()]
        }
        "" => Vec::new(),
        _ => vec![s],
    }
}

/// Canonical subject key: aliases of the same subject collapse together.
pub fn subject_key(subject: &str) -> String {
    subject_aliases(subject)
        .into_iter()
        .next()
        .unwrap_or_default()
}
