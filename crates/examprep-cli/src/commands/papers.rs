//! The `examprep papers` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use examprep_core::model::normalize_term;
use examprep_core::traits::{PaperAcquirer, PaperOrigin};
use examprep_sources::create_pipeline;

/// Machine-readable output of `papers --json`.
#[derive(Serialize)]
struct PapersReport<'a> {
    subject: &'a str,
    term: String,
    origin: PaperOrigin,
    total_questions: usize,
    /// year -> question count
    papers: BTreeMap<i32, usize>,
}

pub async fn execute(
    subject: String,
    term: String,
    offline: bool,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(!subject.trim().is_empty(), "subject must not be empty");
    anyhow::ensure!(!term.trim().is_empty(), "term must not be empty");

    let config = super::load_config(config_path, offline)?;
    let pipeline = create_pipeline(&config)?;
    let acquisition = pipeline.acquire(&subject, &term).await;

    if json {
        let report = PapersReport {
            subject: subject.trim(),
            term: normalize_term(&term),
            origin: acquisition.origin,
            total_questions: acquisition.papers.total(),
            papers: acquisition.papers.counts(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} / {}", subject.trim(), normalize_term(&term));

    let mut table = Table::new();
    table.set_header(vec!["Year", "Questions", "Types"]);
    for (year, questions) in acquisition.papers.iter() {
        let mut kinds: Vec<&str> = questions.iter().map(|q| q.kind_or_general()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        table.add_row(vec![
            Cell::new(if year == 0 {
                "unknown".to_string()
            } else {
                year.to_string()
            }),
            Cell::new(questions.len()),
            Cell::new(kinds.join(", ")),
        ]);
    }
    println!("{table}");
    println!(
        "Total: {} questions (origin: {})",
        acquisition.papers.total(),
        acquisition.origin
    );

    Ok(())
}
