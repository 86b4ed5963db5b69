//! Answer checking.
//!
//! Single pass: empty check, normalised string equality, then a numeric
//! comparison within [`NUMERIC_TOLERANCE`]. No partial credit and no semantic
//! equivalence, so `"1/2"` and `"0.5"` are different answers.

use serde::{Deserialize, Serialize};

use crate::practice_engine::models::Question;

/// Absolute tolerance for the numeric fallback.
pub const NUMERIC_TOLERANCE: f64 = 0.01;

// Absorbs binary rounding so that a difference of exactly 0.01 passes.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_correct: bool,
    pub feedback: String,
    /// Present on a wrong answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl ValidationResult {
    fn correct() -> Self {
        ValidationResult { is_correct: true, feedback: "Correct!".to_string(), correct_answer: None }
    }

    fn empty() -> Self {
        ValidationResult {
            is_correct: false,
            feedback: "Please provide an answer".to_string(),
            correct_answer: None,
        }
    }

    fn incorrect(canonical: &str) -> Self {
        ValidationResult {
            is_correct: false,
            feedback: format!("Not quite. The correct answer is {canonical}"),
            correct_answer: Some(canonical.to_string()),
        }
    }
}

/// Trim, lowercase, collapse whitespace runs to one space and drop spaces
/// around commas (so `"3, 4"` matches `"3,4"`).
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(" ,", ",")
        .replace(", ", ",")
}

/// Leading decimal number of `s`, so a typed unit (`"120 minutes"`,
/// `"2.5kg"`) still compares numerically. The number must be followed by the
/// end of input, whitespace or a letter: `"1/2"` is not read as `1`.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    let unit_follows = s[end..].chars().next().map_or(true, |c| c.is_whitespace() || c.is_alphabetic() || c == '°');
    if !unit_follows {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn within_tolerance(a: &str, b: &str) -> bool {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => (x - y).abs() <= NUMERIC_TOLERANCE + EPSILON,
        _ => false,
    }
}

/// Compare a submission to a canonical answer string.
pub fn validate_answer(canonical: &str, submitted: &str) -> ValidationResult {
    if submitted.trim().is_empty() {
        return ValidationResult::empty();
    }

    let expected = normalize(canonical);
    let given = normalize(submitted);
    if expected == given {
        return ValidationResult::correct();
    }

    // Numeric fallback, part by part for comma-joined answers.
    let expected_parts: Vec<&str> = expected.split(',').collect();
    let given_parts: Vec<&str> = given.split(',').collect();
    let numeric_match = expected_parts.len() == given_parts.len()
        && expected_parts
            .iter()
            .zip(&given_parts)
            .all(|(e, g)| e == g || within_tolerance(e, g));

    if numeric_match {
        ValidationResult::correct()
    } else {
        ValidationResult::incorrect(canonical)
    }
}

/// Check a learner's answer to a generated question.
pub fn validate(question: &Question, submitted: &str) -> ValidationResult {
    validate_answer(&question.answer, submitted)
}

/// Check a multi-box answer; the parts are graded as their comma-joined form.
pub fn validate_parts<S: AsRef<str>>(question: &Question, parts: &[S]) -> ValidationResult {
    let joined = parts.iter().map(|p| p.as_ref().trim()).collect::<Vec<_>>().join(",");
    validate_answer(&question.answer, &joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_submission_prompts() {
        let r = validate_answer("5", "   ");
        assert!(!r.is_correct);
        assert_eq!(r.feedback, "Please provide an answer");
        assert_eq!(r.correct_answer, None);
    }

    #[test]
    fn normalisation_ignores_case_and_spacing() {
        assert!(validate_answer("Yes", "  yes ").is_correct);
        assert!(validate_answer("3 tens and 4 ones", "3  tens and\t4 ones").is_correct);
        assert!(validate_answer("3,4", "3 , 4").is_correct);
        assert_eq!(normalize("  A  b "), "a b");
    }

    #[test]
    fn numeric_tolerance_boundary() {
        assert!(validate_answer("3.140", "3.14").is_correct);
        assert!(validate_answer("2.5", "2.51").is_correct);
        assert!(!validate_answer("2.5", "2.52").is_correct);
        assert!(validate_answer("2500", "2500.004").is_correct);
    }

    #[test]
    fn no_semantic_equivalence() {
        assert!(!validate_answer("0.5", "1/2").is_correct);
        assert!(!validate_answer("5", "five").is_correct);
        assert!(!validate_answer("5", "inf").is_correct);
    }

    #[test]
    fn wrong_answer_surfaces_canonical() {
        let r = validate_answer("42", "41");
        assert_eq!(
            r,
            ValidationResult {
                is_correct: false,
                feedback: "Not quite. The correct answer is 42".to_string(),
                correct_answer: Some("42".to_string()),
            }
        );
    }

    #[test]
    fn trailing_units_are_ignored() {
        assert!(validate_answer("120", "120 minutes").is_correct);
        assert!(validate_answer("2.5", "2.5kg").is_correct);
        assert!(validate_answer("-4", "-4°C").is_correct);
        assert!(!validate_answer("120", "12 minutes").is_correct);
        assert!(!validate_answer("1/2", "1/3").is_correct);
        assert!(!validate_answer("1", "1/2").is_correct);
        assert!(!validate_answer("5", "kg5").is_correct);
    }

    #[test]
    fn multi_part_numeric_fallback() {
        assert!(validate_answer("3,4", "3.0, 4").is_correct);
        assert!(!validate_answer("3,4", "3").is_correct);
    }
}
