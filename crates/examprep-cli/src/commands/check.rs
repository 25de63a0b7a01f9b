//! The `examprep check` command.

use anyhow::Result;

use examprep_core::matcher;

pub fn execute(expected: String, answer: String) -> Result<()> {
    if matcher::matches(&answer, Some(&expected)) {
        println!("correct");
    } else {
        println!("incorrect");
    }
    Ok(())
}
