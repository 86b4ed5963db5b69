//! Rounding and estimation.
//!
//! Parameters: `rounding_to` (powers of ten to round to), `range` (`[min, max]`
//! for whole numbers), `decimal_range` and `decimal_places` for
//! `round_decimal`.
//!
//! Rounding is half-up on integers (decimals are scaled to integers first), so
//! `2.45` to one place is `2.5` regardless of binary representation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{format_number, pick_operation, text_input, with_commas, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{sample_int, uniform, Constraint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingOp {
    RoundToNearest,
    EstimateSum,
    EstimateDifference,
    RoundDecimal,
}

impl Operation for RoundingOp {
    const FALLBACK: Self = RoundingOp::RoundToNearest;
}

/// Round a non-negative integer half-up to a multiple of `to`.
pub fn round_to(n: i64, to: i64) -> i64 {
    if to <= 1 {
        return n;
    }
    (n + to / 2).div_euclid(to) * to
}

fn place_word(to: i64) -> String {
    match to {
        10    => "ten".to_string(),
        100   => "hundred".to_string(),
        1_000 => "thousand".to_string(),
        other => with_commas(other),
    }
}

struct Setup {
    targets: Vec<i64>,
    range: (i64, i64),
    decimal_range: (f64, f64),
    decimal_places: Vec<u32>,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let mut targets = params.ints("rounding_to");
    targets.retain(|&t| t >= 10);
    if targets.is_empty() {
        targets = match level {
            Level::Beginning  => vec![10],
            Level::Developing => vec![10, 100],
            _                 => vec![10, 100, 1_000],
        };
    }
    let range = params.int_range("range").unwrap_or(match level {
        Level::Beginning  => (11, 99),
        Level::Developing => (101, 999),
        Level::Meeting    => (1_001, 9_999),
        Level::Exceeding  => (10_001, 99_999),
    });
    let mut decimal_places: Vec<u32> = params.ints("decimal_places").into_iter().map(|d| d.clamp(0, 2) as u32).collect();
    if decimal_places.is_empty() {
        decimal_places = vec![0, 1];
    }
    Setup {
        targets,
        range: (range.0.max(1), range.1.max(range.0.max(1))),
        decimal_range: params.float_range("decimal_range").unwrap_or((1.0, 20.0)),
        decimal_places,
    }
}

impl Setup {
    /// A rounding target that is not wildly larger than the numbers in play.
    fn target<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let fitting: Vec<i64> = self.targets.iter().copied().filter(|&t| t <= self.range.1).collect();
        fitting.choose(rng).or_else(|| self.targets.first()).copied().unwrap_or(10)
    }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<RoundingOp, _>(rng, params) {
        RoundingOp::RoundToNearest     => round_to_nearest(rng, &s),
        RoundingOp::EstimateSum        => estimate(rng, &s, true),
        RoundingOp::EstimateDifference => estimate(rng, &s, false),
        RoundingOp::RoundDecimal       => round_decimal(rng, &s),
    }
}

fn round_to_nearest<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let to = s.target(rng);
    let n = sample_int(rng, s.range, &[Constraint::NotMultipleOf(to)]).into_value();
    text_input(
        RoundingOp::RoundToNearest,
        format!("Round {} to the nearest {}.", with_commas(n), place_word(to)),
        round_to(n, to).to_string(),
    )
    .with_hint(format!("Look at the digit to the right of the {}s. 5 or more rounds up.", place_word(to)))
}

fn estimate<R: Rng + ?Sized>(rng: &mut R, s: &Setup, sum: bool) -> QuestionBody {
    let to = s.target(rng);
    let x = uniform(rng, s.range.0, s.range.1);
    let y = uniform(rng, s.range.0, s.range.1);
    let (a, b) = if sum { (x, y) } else { (x.max(y), x.min(y)) };
    let (ra, rb) = (round_to(a, to), round_to(b, to));

    let (op, sign, answer) = if sum {
        (RoundingOp::EstimateSum, '+', ra + rb)
    } else {
        (RoundingOp::EstimateDifference, '−', ra - rb)
    };
    text_input(
        op,
        format!(
            "Estimate {} {sign} {} by rounding each number to the nearest {}.",
            with_commas(a),
            with_commas(b),
            place_word(to),
        ),
        answer.to_string(),
    )
    .with_hint(format!(
        "Round {} to {} and {} to {}.",
        with_commas(a),
        with_commas(ra),
        with_commas(b),
        with_commas(rb),
    ))
}

fn round_decimal<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let target_dp = s.decimal_places.choose(rng).copied().unwrap_or(0);
    let source_dp = target_dp + 1 + u32::from(rng.gen_bool(0.3));
    let scale = 10i64.pow(source_dp);
    let step = 10i64.pow(source_dp - target_dp);

    let lo = (s.decimal_range.0 * scale as f64).round() as i64;
    let hi = (s.decimal_range.1 * scale as f64).round() as i64;
    // A non-zero last digit so the number really has `source_dp` places.
    let scaled = sample_int(rng, (lo, hi.max(lo)), &[Constraint::NotMultipleOf(10)]).into_value();
    let rounded = round_to(scaled, step) / step;

    let places = match target_dp {
        0 => "the nearest whole number".to_string(),
        1 => "1 decimal place".to_string(),
        n => format!("{n} decimal places"),
    };
    text_input(
        RoundingOp::RoundDecimal,
        format!("Round {} to {places}.", format_number(scaled as f64 / scale as f64, source_dp as usize)),
        format_number(rounded as f64 / 10f64.powi(target_dp as i32), target_dp as usize),
    )
    .with_hint("Look at the next digit along. 5 or more rounds up.")
}
