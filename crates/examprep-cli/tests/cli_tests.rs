//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, run from an empty directory with an empty HOME so no stray
/// config file is picked up.
fn examprep(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("examprep").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("EXAMPREP_OFFLINE")
        .env_remove("EXAMPREP_REMOTE_BASE_URL");
    cmd
}

#[test]
fn check_accepts_numeric_equivalents() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["check", "--expected", "12", "--answer", " 12.0 "])
        .assert()
        .success()
        .stdout(predicate::str::diff("correct\n"));
}

#[test]
fn check_rejects_wrong_answer() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["check", "--expected", "Paris", "--answer", "London"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incorrect"));
}

#[test]
fn trigger_detects_phrase() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["trigger", "Please ENABLE exam mode for me"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam mode triggered."))
        .stdout(predicate::str::contains("1. Are you preparing for a real exam"))
        .stdout(predicate::str::contains("3. Which subject"));
}

#[test]
fn trigger_ignores_small_talk() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["trigger", "what's the weather like?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exam trigger detected."));
}

#[test]
fn init_creates_config_once() {
    let dir = TempDir::new().unwrap();

    examprep(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examprep.toml"));
    assert!(dir.path().join("examprep.toml").exists());

    examprep(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}

#[test]
fn papers_offline_uses_synthetic_set() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["papers", "--subject", "Maths", "--term", "first", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maths / First term"))
        .stdout(predicate::str::contains("2019"))
        .stdout(predicate::str::contains("2023"))
        .stdout(predicate::str::contains("Total: 12 questions (origin: synthetic)"));
}

#[test]
fn papers_json_output() {
    let dir = TempDir::new().unwrap();
    let output = examprep(&dir)
        .args(["papers", "--subject", "English", "--term", "Third term", "--offline", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["origin"], "synthetic");
    assert_eq!(report["total_questions"], 9);
    assert_eq!(report["papers"]["2020"], 3);
}

#[test]
fn offline_env_var_disables_remote() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .env("EXAMPREP_OFFLINE", "1")
        .args(["papers", "--subject", "Science", "--term", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("origin: synthetic"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args([
            "papers",
            "--subject",
            "Maths",
            "--term",
            "first",
            "--config",
            "nope.toml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn practice_quit_prints_summary() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["practice", "--subject", "Maths", "--term", "First term", "--offline"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 12 questions across 3 years (synthetic)"))
        .stdout(predicate::str::contains("Question 1"))
        .stdout(predicate::str::contains("Session summary"));
}

#[test]
fn practice_wrong_answer_gets_remediation() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args([
            "practice",
            "--subject",
            "Maths",
            "--term",
            "First term",
            "--offline",
            "--questions",
            "1",
        ])
        .write_stdin("not a number\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect. The correct answer is"))
        .stdout(predicate::str::contains("Let's review:"))
        .stdout(predicate::str::contains("A similar question is up next."));
}

#[test]
fn practice_ends_on_eof() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args(["practice", "--subject", "English", "--term", "second", "--offline"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session summary"));
}

#[test]
fn practice_from_document() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("science_2021.txt");
    std::fs::write(
        &doc,
        "Science revision\n\
         1. Name the gas that plants absorb from the air.\n\
         2. What is the boiling point of water in Celsius?\n",
    )
    .unwrap();

    examprep(&dir)
        .args(["practice", "--subject", "Science", "--term", "First term", "--document"])
        .arg(&doc)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 questions from"))
        .stdout(predicate::str::contains("Question 1 (2021, general)"));
}

#[test]
fn practice_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    examprep(&dir)
        .args([
            "practice",
            "--subject",
            "Maths",
            "--term",
            "first",
            "--mode",
            "casual",
            "--offline",
        ])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}
