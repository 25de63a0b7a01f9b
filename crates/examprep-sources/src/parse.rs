//! Turning extracted document text into question strings.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::dedupe;

/// Scraped questions shorter than this are treated as noise.
pub const MIN_SCRAPED_LEN: usize = 20;
/// Scraped questions longer than this are cut at a word boundary.
pub const MAX_QUESTION_LEN: usize = 900;
/// Uploaded questions shorter than this are dropped.
pub const MIN_UPLOAD_LEN: usize = 15;

static QUESTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\n)\s*(?:Q\s*\d+|Question\s*\d+|\d{1,2}\s*[\).]|\d{1,2}\s*\.)\s+")
        .expect("question marker pattern")
});
static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,3})\s*[\).\-]\s*(.+?)\s*$").expect("numbered line pattern"));
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)((?:20|19)\d{2})(?:\D|$)").expect("year pattern"));

/// Split free-running document text at question markers ("1.", "2)", "Q3",
/// "Question 4").
///
/// Text before the first marker is preamble and discarded. Each candidate
/// has its whitespace collapsed, is dropped if shorter than
/// [`MIN_SCRAPED_LEN`], and is truncated to [`MAX_QUESTION_LEN`]. Duplicates
/// keep their first occurrence.
pub fn split_questions(text: &str) -> Vec<String> {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let candidates = QUESTION_MARKER
        .split(&joined)
        .skip(1)
        .map(collapse_whitespace)
        .filter(|c| c.chars().count() >= MIN_SCRAPED_LEN)
        .map(|c| truncate(&c, MAX_QUESTION_LEN))
        .collect();
    dedupe(candidates)
}

/// Parse an uploaded document where each question starts on a numbered line
/// (`1.`, `2)`, `3 -`). Unnumbered lines continue the current question.
///
/// Questions shorter than [`MIN_UPLOAD_LEN`] are dropped, and two questions
/// whose first 200 characters match case-insensitively count as duplicates.
pub fn numbered_questions(text: &str) -> Vec<String> {
    let mut questions = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = NUMBERED_LINE.captures(line) {
            questions.extend(current.take());
            current = Some(caps[2].to_string());
        } else if let Some(q) = current.as_mut() {
            q.push(' ');
            q.push_str(line);
        }
    }
    questions.extend(current);

    let mut seen = HashSet::new();
    questions
        .into_iter()
        .map(|q| collapse_whitespace(&q))
        .filter(|q| q.chars().count() >= MIN_UPLOAD_LEN)
        .filter(|q| {
            let key: String = q.to_lowercase().chars().take(200).collect();
            seen.insert(key)
        })
        .collect()
}

/// First plausible exam year (1900-2099) appearing in `text`.
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `s` to at most `max` characters, backing off to the last space and
/// appending an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    format!("{}…", cut.trim_end())
}
