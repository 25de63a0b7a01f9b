//! The `examprep practice` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use examprep_core::engine::StartSession;
use examprep_core::session::{Evaluation, ProgressSnapshot};
use examprep_core::{ExamEngine, Question};
use examprep_sources::{create_pipeline, paper_set_from_document, read_document, PdfTextExtractor};

pub struct PracticeArgs {
    pub subject: String,
    pub term: String,
    pub mode: String,
    pub questions: usize,
    pub document: Option<PathBuf>,
    pub offline: bool,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: PracticeArgs) -> Result<()> {
    anyhow::ensure!(args.questions >= 1, "questions must be at least 1");

    let config = super::load_config(args.config, args.offline)?;
    let pipeline = create_pipeline(&config)?;
    let engine = ExamEngine::new(Arc::new(pipeline), config.engine_config());

    let session_id = engine
        .start_session(StartSession {
            mode: args.mode,
            term: args.term.clone(),
            subject: args.subject.clone(),
            session_id: None,
        })
        .await?;
    tracing::debug!(session = %session_id, "practice session started");

    match &args.document {
        Some(path) => {
            let text = read_document(path, &PdfTextExtractor, config.remote.max_document_pages)?;
            let hint = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let papers = paper_set_from_document(&text, &args.subject, &args.term, &hint);
            let summary = engine.load_papers(&session_id, papers).await?;
            println!(
                "Loaded {} questions from {}",
                summary.total_questions,
                path.display()
            );
        }
        None => {
            let summary = engine.fetch_papers(&session_id, None, None).await?;
            println!(
                "Loaded {} questions across {} years ({})",
                summary.total_questions,
                summary.papers.len(),
                summary.origin
            );
        }
    }
    println!("Type your answer and press enter. Type `quit` to stop.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    for n in 1..=args.questions {
        let asked = engine.ask_question(&session_id).await?;
        print_question(n, &asked.question);
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("quit") || answer.eq_ignore_ascii_case("exit") {
            break;
        }

        let answer = resolve_choice(answer, asked.question.choices.as_deref());
        let evaluation = engine
            .evaluate(&session_id, &asked.question.id, &answer)
            .await?;
        print_evaluation(&evaluation);
    }

    let snapshot = engine.progress(&session_id).await?;
    print_summary(&snapshot);
    Ok(())
}

/// A single choice letter ("b") stands for the text of that choice.
fn resolve_choice(answer: &str, choices: Option<&[String]>) -> String {
    let mut chars = answer.chars();
    if let (Some(c), None, Some(choices)) = (chars.next(), chars.next(), choices) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            let idx = (c as u8 - b'a') as usize;
            if let Some(choice) = choices.get(idx) {
                return choice.clone();
            }
        }
    }
    answer.to_string()
}

fn print_question(n: usize, question: &Question) {
    let year = if question.year == 0 {
        "unknown year".to_string()
    } else {
        question.year.to_string()
    };
    println!("Question {n} ({year}, {}):", question.kind_or_general());
    println!("  {}", question.text);
    if let Some(choices) = &question.choices {
        for (i, choice) in choices.iter().enumerate() {
            let label = char::from(b'a' + (i % 26) as u8);
            println!("    {label}) {choice}");
        }
    }
}

fn print_evaluation(evaluation: &Evaluation) {
    if evaluation.correct {
        println!(
            "Correct! +{} points (streak {})",
            evaluation.points_awarded, evaluation.streak
        );
    } else if let Some(explanation) = &evaluation.explanation {
        println!("{explanation}");
    }
    if let Some(badge) = &evaluation.badge_earned {
        println!("Badge earned: {badge}");
    }
    if let Some(steps) = &evaluation.teaching_steps {
        println!("Let's review:");
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {}: {}", i + 1, step.title, step.content);
        }
    }
    if evaluation.next_question_ready {
        println!("A similar question is up next.");
    }
    println!();
}

fn print_summary(snapshot: &ProgressSnapshot) {
    let progress = &snapshot.progress;
    let badges = if progress.badges.is_empty() {
        "-".to_string()
    } else {
        progress.badges.join(", ")
    };

    let mut table = Table::new();
    table.set_header(vec!["Points", "Streak", "Readiness", "Badges"]);
    table.add_row(vec![
        Cell::new(progress.points),
        Cell::new(progress.streak),
        Cell::new(format!("{}%", progress.readiness_percent)),
        Cell::new(badges),
    ]);

    println!("Session summary");
    println!("{table}");
}
