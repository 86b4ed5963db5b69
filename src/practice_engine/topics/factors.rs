//! Factors, multiples and primes.
//!
//! Parameters: `range` (`[min, max]` for the number under study),
//! `min_pairs` (factor pairs required for the factor-pair questions),
//! `multiples_of` (divisors used by `is_multiple`).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{multiple_choice, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{factor_pairs, factors, is_prime, sample, sample_int, uniform, Constraint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorsOp {
    CompleteFactorPair,
    CountFactorPairs,
    IdentifyFactorPair,
    IsMultiple,
    IsPrime,
}

impl Operation for FactorsOp {
    const FALLBACK: Self = FactorsOp::CompleteFactorPair;
}

const YES: &str = "Yes";
const NO: &str = "No";

struct Setup {
    range: (i64, i64),
    min_pairs: usize,
    divisors: Vec<i64>,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let (lo, hi) = params.int_range("range").unwrap_or(match level {
        Level::Beginning  => (6, 30),
        Level::Developing => (10, 50),
        Level::Meeting    => (12, 100),
        Level::Exceeding  => (24, 144),
    });
    let mut divisors = params.ints("multiples_of");
    divisors.retain(|&d| d >= 2);
    if divisors.is_empty() {
        divisors = (2..=10).collect();
    }
    Setup {
        range: (lo.max(2), hi.max(lo.max(2))),
        min_pairs: params.int("min_pairs").unwrap_or(2).clamp(1, 6) as usize,
        divisors,
    }
}

/// A number in range with at least `s.min_pairs` factor pairs.
fn composite<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> i64 {
    sample_int(rng, s.range, &[Constraint::MinFactorPairs(s.min_pairs)]).into_value()
}

fn pair_text((a, b): (i64, i64)) -> String {
    format!("{a} × {b}")
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<FactorsOp, _>(rng, params) {
        FactorsOp::CompleteFactorPair => complete_factor_pair(rng, &s),
        FactorsOp::CountFactorPairs   => count_factor_pairs(rng, &s),
        FactorsOp::IdentifyFactorPair => identify_factor_pair(rng, &s),
        FactorsOp::IsMultiple         => is_multiple(rng, &s),
        FactorsOp::IsPrime            => prime(rng, &s),
    }
}

fn complete_factor_pair<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let n = composite(rng, s);
    let pairs = factor_pairs(n);
    // Skip the trivial 1 × n pair when there is another.
    let (a, b) = pairs.iter().skip(1).copied().collect::<Vec<_>>().choose(rng).copied().unwrap_or((1, n));
    let (shown, missing) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
    text_input(
        FactorsOp::CompleteFactorPair,
        format!("Complete the factor pair: {shown} × ___ = {n}"),
        missing.to_string(),
    )
    .with_hint(format!("What do you multiply {shown} by to make {n}?"))
}

fn count_factor_pairs<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let n = composite(rng, s);
    let count = factor_pairs(n).len();
    text_input(
        FactorsOp::CountFactorPairs,
        format!("How many factor pairs does {n} have?"),
        count.to_string(),
    )
    .with_hint("Start with 1 × the number, then try 2, 3, 4 and so on.")
}

fn identify_factor_pair<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let n = composite(rng, s);
    let pairs = factor_pairs(n);
    let pair = pairs.choose(rng).copied().unwrap_or((1, n));

    // Near misses whose product is not n.
    let near: Vec<String> = [
        (pair.0, pair.1 + 1),
        (pair.0 + 1, pair.1),
        (pair.0, pair.1 - 1),
        (pair.0 + 1, pair.1 - 1),
        (pair.0 + 2, pair.1),
    ]
    .into_iter()
    .filter(|&(a, b)| a > 0 && b > 0 && a * b != n)
    .map(pair_text)
    .collect();

    multiple_choice(
        rng,
        FactorsOp::IdentifyFactorPair,
        format!("Which of these is a factor pair of {n}?"),
        pair_text(pair),
        near,
    )
}

fn is_multiple<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let d = s.divisors.choose(rng).copied().unwrap_or(2);
    let want = rng.gen_bool(0.5);
    let rule = if want { Constraint::MultipleOf(d) } else { Constraint::NotMultipleOf(d) };
    let n = sample_int(rng, s.range, &[rule]).into_value();
    let answer = if n % d == 0 { YES } else { NO };

    multiple_choice(
        rng,
        FactorsOp::IsMultiple,
        format!("Is {n} a multiple of {d}?"),
        answer,
        vec![YES.to_string(), NO.to_string()],
    )
    .with_hint(format!("Does {d} divide into {n} with no remainder?"))
}

fn prime<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let want = rng.gen_bool(0.5);
    let n = sample(rng, |rng| uniform(rng, s.range.0, s.range.1), |&n| is_prime(n) == want).into_value();
    let answer = if is_prime(n) { YES } else { NO };
    let hint = if is_prime(n) {
        format!("{n} only has the factors 1 and {n}.")
    } else {
        let f = factors(n);
        let shown: Vec<String> = f.iter().map(i64::to_string).collect();
        format!("The factors of {n} are {}.", shown.join(", "))
    };

    multiple_choice(
        rng,
        FactorsOp::IsPrime,
        format!("Is {n} a prime number?"),
        answer,
        vec![YES.to_string(), NO.to_string()],
    )
    .with_hint(hint)
}
