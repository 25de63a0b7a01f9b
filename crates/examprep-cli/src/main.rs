//! examprep CLI — practice past exam papers from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examprep", version, about = "Exam-preparation practice sessions over past papers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch papers for a subject and term and show what was found
    Papers {
        /// Subject name (e.g. "Maths")
        #[arg(long)]
        subject: String,

        /// Term (e.g. "First term", "second", "3")
        #[arg(long)]
        term: String,

        /// Skip the remote scraper
        #[arg(long)]
        offline: bool,

        /// Print a JSON summary instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run an interactive practice session on stdin
    Practice {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        term: String,

        /// Session mode: practice or real
        #[arg(long, default_value = "practice")]
        mode: String,

        /// Stop after this many questions
        #[arg(long, default_value = "10")]
        questions: usize,

        /// Practice from a local document (PDF or text) instead of fetching
        #[arg(long)]
        document: Option<PathBuf>,

        /// Skip the remote scraper
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check an answer against a reference answer
    Check {
        /// Reference answer
        #[arg(long)]
        expected: String,

        /// Answer to grade
        #[arg(long)]
        answer: String,
    },

    /// Check whether a message asks for exam mode
    Trigger {
        /// Message text
        text: String,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examprep=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Papers {
            subject,
            term,
            offline,
            json,
            config,
        } => commands::papers::execute(subject, term, offline, json, config).await,
        Commands::Practice {
            subject,
            term,
            mode,
            questions,
            document,
            offline,
            config,
        } => {
            commands::practice::execute(commands::practice::PracticeArgs {
                subject,
                term,
                mode,
                questions,
                document,
                offline,
                config,
            })
            .await
        }
        Commands::Check { expected, answer } => commands::check::execute(expected, answer),
        Commands::Trigger { text } => commands::trigger::execute(text),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
