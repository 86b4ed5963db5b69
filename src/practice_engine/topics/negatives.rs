//! Negative numbers in context: temperatures, counting through zero,
//! comparing and ordering.
//!
//! Parameters: `range` (`[min, max]`, should straddle zero), `steps` (jump
//! sizes for counting), `terms` (how many numbers to order).
//!
//! Question text writes negatives with a true minus sign (`−4`); typed
//! answers use the ASCII hyphen (`-4`) so learners can enter them.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{multiple_choice, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{sample, uniform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativesOp {
    TemperatureDifference,
    CountThroughZero,
    CompareNegatives,
    OrderNegatives,
}

impl Operation for NegativesOp {
    const FALLBACK: Self = NegativesOp::CountThroughZero;
}

/// Display form with a typographic minus.
pub fn signed(n: i64) -> String {
    if n < 0 {
        format!("−{}", n.unsigned_abs())
    } else {
        n.to_string()
    }
}

struct Setup {
    range: (i64, i64),
    steps: Vec<i64>,
    terms: usize,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let (lo, hi) = params.int_range("range").unwrap_or(match level {
        Level::Beginning  => (-10, 10),
        Level::Developing => (-20, 20),
        Level::Meeting    => (-50, 50),
        Level::Exceeding  => (-100, 100),
    });
    let mut steps = params.ints("steps");
    steps.retain(|&s| s > 0);
    if steps.is_empty() {
        steps = vec![1, 2, 5];
    }
    Setup {
        // Keep zero inside the range.
        range: (lo.min(-1), hi.max(1)),
        steps,
        terms: params.int("terms").unwrap_or(4).clamp(3, 6) as usize,
    }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<NegativesOp, _>(rng, params) {
        NegativesOp::TemperatureDifference => temperature_difference(rng, &s),
        NegativesOp::CountThroughZero      => count_through_zero(rng, &s),
        NegativesOp::CompareNegatives      => compare_negatives(rng, &s),
        NegativesOp::OrderNegatives        => order_negatives(rng, &s),
    }
}

fn temperature_difference<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let cold = uniform(rng, s.range.0, -1);
    let warm = uniform(rng, 0, s.range.1);
    let (first, second, when) = if rng.gen_bool(0.5) {
        (cold, warm, ("In the morning", "At midday"))
    } else {
        (warm, cold, ("In the afternoon", "At night"))
    };
    text_input(
        NegativesOp::TemperatureDifference,
        format!(
            "{} the temperature was {}°C. {} it was {}°C. What is the difference in temperature?",
            when.0,
            signed(first),
            when.1,
            signed(second),
        ),
        (warm - cold).to_string(),
    )
    .with_hint(format!("Count from {} up to 0, then on to {}.", signed(cold), signed(warm)))
}

fn count_through_zero<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let step = s.steps.choose(rng).copied().unwrap_or(1);
    // Start just above zero and jump far enough to cross it.
    let start = uniform(rng, 1, (step * 3).min(s.range.1).max(1));
    let min_jumps = start / step + 1;
    let jumps = uniform(rng, min_jumps, min_jumps + 3);
    let end = start - step * jumps;

    let text = if step == 1 {
        format!("Start at {start} and count back {jumps}. What number do you land on?")
    } else {
        format!("Start at {start} and count back in {step}s, {jumps} times. What number do you land on?")
    };
    text_input(NegativesOp::CountThroughZero, text, end.to_string())
        .with_hint("Counting back past zero takes you into negative numbers.")
}

fn compare_negatives<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let (a, b) = sample(
        rng,
        |rng| (uniform(rng, s.range.0, -1), uniform(rng, s.range.0, s.range.1)),
        |&(a, b)| a != b,
    )
    .into_value();
    let ask_smaller = rng.gen_bool(0.5);
    let answer = if ask_smaller { a.min(b) } else { a.max(b) };
    let word = if ask_smaller { "smaller" } else { "greater" };

    multiple_choice(
        rng,
        NegativesOp::CompareNegatives,
        format!("Which number is {word}: {} or {}?", signed(a), signed(b)),
        signed(answer),
        vec![signed(a), signed(b)],
    )
    .with_hint("On a number line, numbers further left are smaller.")
}

fn order_negatives<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let values = sample(
        rng,
        |rng| {
            let mut v: Vec<i64> = (0..s.terms).map(|_| uniform(rng, s.range.0, s.range.1)).collect();
            // At least one negative.
            if let Some(first) = v.first_mut() {
                *first = -first.abs().max(1);
            }
            v
        },
        |v| {
            let mut sorted = v.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.len() == v.len()
        },
    )
    .into_value();

    let shown: Vec<String> = values.iter().map(|&v| signed(v)).collect();
    let mut ordered = values.clone();
    ordered.sort_unstable();

    text_input(
        NegativesOp::OrderNegatives,
        format!("Put these numbers in order, smallest first:\n{}", shown.join(", ")),
        "",
    )
    .with_parts(ordered.iter().map(i64::to_string).collect())
    .with_hint("Negative numbers further from zero are smaller.")
}
