//! Remediation advice: teaching steps and mastery badges per question type.

use serde::{Deserialize, Serialize};

/// One step of a remediation curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingStep {
    pub title: String,
    pub content: String,
}

impl TeachingStep {
    fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

/// Ordered teaching steps for a question type.
///
/// `algebra` and `geometry` have dedicated curricula; every other type gets
/// the generic understand → plan → execute → review sequence.
pub fn teaching_steps(question_type: &str) -> Vec<TeachingStep> {
    match question_type.trim().to_lowercase().as_str() {
        "algebra" => vec![
            TeachingStep::new(
                "Identify variables",
                "Recognize knowns and unknowns in the expression.",
            ),
            TeachingStep::new(
                "Isolate target",
                "Use inverse operations to isolate the variable.",
            ),
            TeachingStep::new(
                "Check solution",
                "Substitute back to verify the equality holds.",
            ),
        ],
        "geometry" => vec![
            TeachingStep::new("Draw a diagram", "Sketch and label the given information."),
            TeachingStep::new(
                "Apply theorems",
                "Use angle and triangle properties appropriately.",
            ),
            TeachingStep::new("Compute", "Plug in values and solve for the unknown."),
        ],
        _ => vec![
            TeachingStep::new(
                "Understand the problem",
                "Restate what is being asked in your own words.",
            ),
            TeachingStep::new(
                "Plan",
                "Choose a strategy: formula, pattern, or logical steps.",
            ),
            TeachingStep::new(
                "Execute",
                "Carry out the steps carefully and show working.",
            ),
            TeachingStep::new(
                "Review",
                "Verify the result makes sense and units/format are correct.",
            ),
        ],
    }
}

/// Badge awarded for mastering a question type, e.g. "Number Theory Master".
pub fn badge_name(question_type: &str) -> String {
    let spaced = question_type.trim().replace('_', " ");
    let spaced = if spaced.is_empty() {
        "general".to_string()
    } else {
        spaced
    };
    format!("{} Master", title_case(&spaced))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
