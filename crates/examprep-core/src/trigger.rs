//! Detection of chat messages that should switch a tutor into exam mode.

use serde::Serialize;

/// Phrases that switch exam mode on. Matched case-insensitively as substrings.
pub const TRIGGER_PHRASES: &[&str] = &[
    "prepare me for my exam",
    "prepare me for my third exam",
    "enable exam mode",
    "turn on exam mode",
    "i want to practice for my exam",
    "practice for my exam",
    "start exam mode",
];

/// Questions asked, in order, before a session can be started.
pub const SETUP_QUESTIONS: &[&str] = &[
    "Are you preparing for a real exam or just practicing for one?",
    "Which term test are you getting ready for? (First term, Second term, Third term)",
    "Which subject are you planning to study? (Maths, Science, English, etc.)",
];

/// Outcome of [`detect_exam_trigger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResult {
    pub triggered: bool,
    /// The setup questions, present only when triggered.
    pub setup_questions: Option<Vec<String>>,
}

/// Check whether a user message asks for exam mode.
pub fn detect_exam_trigger(user_text: &str) -> TriggerResult {
    let text = user_text.trim().to_lowercase();
    if !text.is_empty() && TRIGGER_PHRASES.iter().any(|p| text.contains(p)) {
        TriggerResult {
            triggered: true,
            setup_questions: Some(setup_questions()),
        }
    } else {
        TriggerResult {
            triggered: false,
            setup_questions: None,
        }
    }
}

pub fn setup_questions() -> Vec<String> {
    SETUP_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_phrase_anywhere_in_message() {
        let result = detect_exam_trigger("Hey, can you PREPARE ME FOR MY EXAM tomorrow?");
        assert!(result.triggered);
        assert_eq!(result.setup_questions.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn ordinary_chat_does_not_trigger() {
        let result = detect_exam_trigger("what is photosynthesis?");
        assert!(!result.triggered);
        assert!(result.setup_questions.is_none());
        assert!(!detect_exam_trigger("   ").triggered);
    }

    #[test]
    fn setup_questions_keep_order() {
        let qs = setup_questions();
        assert!(qs[0].contains("real exam"));
        assert!(qs[1].contains("term"));
        assert!(qs[2].contains("subject"));
    }
}
