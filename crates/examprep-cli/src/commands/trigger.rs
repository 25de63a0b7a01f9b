//! The `examprep trigger` command.

use anyhow::Result;

use examprep_core::trigger::detect_exam_trigger;

pub fn execute(text: String) -> Result<()> {
    let result = detect_exam_trigger(&text);
    match result.setup_questions {
        Some(questions) if result.triggered => {
            println!("Exam mode triggered.");
            for (i, q) in questions.iter().enumerate() {
                println!("  {}. {q}", i + 1);
            }
        }
        _ => println!("No exam trigger detected."),
    }
    Ok(())
}
