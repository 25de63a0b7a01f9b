//! Answer matching with numeric equivalence.
//!
//! Both sides are trimmed and lowercased. If both still parse as numbers
//! once everything but digits, `.` and `-` is stripped, they are compared
//! numerically, so "42", " 42 " and "= 42" all match "42". Otherwise the
//! normalized strings must be equal.

/// Decide whether `user_answer` matches the gold answer.
///
/// An absent gold answer means the question is ungradeable and never matches.
pub fn matches(user_answer: &str, gold_answer: Option<&str>) -> bool {
    let Some(gold) = gold_answer else {
        return false;
    };

    let user = normalize(user_answer);
    let gold = normalize(gold);

    match (parse_numeric(&user), parse_numeric(&gold)) {
        (Some(a), Some(b)) => a == b,
        _ => user == gold,
    }
}

/// Trimmed, lowercased form of an answer.
pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Parse the numeric content of an answer, ignoring every character that is
/// not a digit, `.` or `-`.
fn parse_numeric(answer: &str) -> Option<f64> {
    let digits: String = answer
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<f64>().ok()
}
