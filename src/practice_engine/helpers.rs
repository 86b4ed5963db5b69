//! Shared builder functions used by every topic generator.
//!
//! Topic files only decide *what* to ask. Picking an operation from the
//! parameter set, formatting numbers, filling word-problem templates and
//! assembling shuffled multiple-choice options all happen here.
//!
//! ## Number formatting
//!
//! Answers are graded by string equality first, so every decimal answer goes
//! through [`format_number`]: round to the module's maximum decimal places,
//! then strip trailing zeros (`2.500` → `"2.5"`, `2500.0` → `"2500"`).

use std::fmt::Debug;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::practice_engine::{models::QuestionKind, params::ParameterSet};

// ---------------------------------------------------------------------------
// Operation selection
// ---------------------------------------------------------------------------

/// A topic's closed set of operation kinds.
///
/// Variants deserialize from the curriculum `operations` tags. `FALLBACK` is
/// the always-satisfiable variant used when nothing usable is enabled.
pub trait Operation: Copy + Debug + Serialize + DeserializeOwned {
    const FALLBACK: Self;

    /// The curriculum tag for this variant.
    fn tag(self) -> String {
        match serde_json::to_value(self) {
            Ok(Value::String(s)) => s,
            _ => format!("{self:?}"),
        }
    }
}

/// Parse the enabled operation tags. Unknown tags are dropped with a warning.
pub fn enabled_operations<O: Operation>(params: &ParameterSet) -> Vec<O> {
    params
        .operations()
        .into_iter()
        .filter_map(|tag| match serde_json::from_value::<O>(Value::String(tag.to_string())) {
            Ok(op) => Some(op),
            Err(_) => {
                warn!("ignoring unknown operation tag {tag:?}");
                None
            }
        })
        .collect()
}

/// Uniform choice among enabled operations, or `O::FALLBACK`.
pub fn pick_operation<O: Operation, R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet) -> O {
    let enabled = enabled_operations::<O>(params);
    match enabled.choose(rng) {
        Some(&op) => op,
        None => {
            warn!("no usable operations enabled, falling back to {:?}", O::FALLBACK);
            O::FALLBACK
        }
    }
}

// ---------------------------------------------------------------------------
// Question drafts
// ---------------------------------------------------------------------------

/// A generated question before the engine stamps id, module and level.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBody {
    pub operation: String,
    pub text: String,
    pub kind: QuestionKind,
    pub answer: String,
    pub options: Vec<String>,
    pub answers: Option<Vec<String>>,
    pub hint: Option<String>,
}

impl QuestionBody {
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach the structured parts of a multi-part answer. `answer` becomes
    /// the comma-joined parts so both representations agree.
    pub fn with_parts(mut self, parts: Vec<String>) -> Self {
        self.answer = parts.join(",");
        self.answers = Some(parts);
        self
    }
}

/// Free-text question.
pub fn text_input(op: impl Operation, text: impl Into<String>, answer: impl Into<String>) -> QuestionBody {
    QuestionBody {
        operation: op.tag(),
        text: text.into(),
        kind: QuestionKind::TextInput,
        answer: answer.into(),
        options: Vec::new(),
        answers: None,
        hint: None,
    }
}

/// Multiple-choice question; the answer is always among the options.
pub fn multiple_choice<R: Rng + ?Sized>(
    rng: &mut R,
    op: impl Operation,
    text: impl Into<String>,
    answer: impl Into<String>,
    distractors: Vec<String>,
) -> QuestionBody {
    let answer = answer.into();
    let options = assemble_options(rng, &answer, distractors);
    QuestionBody {
        operation: op.tag(),
        text: text.into(),
        kind: QuestionKind::MultipleChoice,
        answer,
        options,
        answers: None,
        hint: None,
    }
}

/// Up to three distinct distractors (never equal to the answer) shuffled
/// together with the answer.
pub fn assemble_options<R: Rng + ?Sized>(rng: &mut R, answer: &str, distractors: Vec<String>) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(4);
    for d in distractors {
        if d != answer && !options.contains(&d) {
            options.push(d);
        }
        if options.len() == 3 {
            break;
        }
    }
    options.push(answer.to_string());
    options.shuffle(rng);
    options
}

/// Near-miss integer distractors: the given candidates first, then the
/// nearest neighbours of `answer` until three are available. Negative values
/// are only offered when `allow_negative` is set.
pub fn numeric_distractors(answer: i64, candidates: &[i64], allow_negative: bool) -> Vec<String> {
    let mut out: Vec<i64> = Vec::with_capacity(3);
    let ok = |v: i64, out: &Vec<i64>| v != answer && (allow_negative || v >= 0) && !out.contains(&v);
    for &c in candidates {
        if out.len() == 3 {
            break;
        }
        if ok(c, &out) {
            out.push(c);
        }
    }
    let mut step = 1;
    while out.len() < 3 {
        for v in [answer + step, answer - step] {
            if out.len() < 3 && ok(v, &out) {
                out.push(v);
            }
        }
        step += 1;
    }
    out.into_iter().map(|v| v.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Round to at most `max_dp` places and strip trailing zeros.
pub fn format_number(value: f64, max_dp: usize) -> String {
    let mut s = format!("{:.*}", max_dp, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Integer with thousands separators, e.g. `12,345`.
pub fn with_commas(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Substitute `{name}` placeholders in a word-problem template.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    vars.iter()
        .fold(template.to_string(), |acc, (key, value)| acc.replace(&format!("{{{key}}}"), value))
}

/// Uniform pick from a non-empty template list.
pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

const NAMES: &[&str] = &[
    "Amara", "Ben", "Chloe", "Dev", "Ella", "Finn", "Grace", "Hassan", "Isla", "Jack", "Kai", "Lily",
    "Mohammed", "Nia", "Oscar", "Priya", "Ruby", "Sam", "Tom", "Zara",
];

/// A random first name for word problems.
pub fn name<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, NAMES).to_string()
}
