//! Fractions: of an amount, equivalence, simplifying, comparing and adding
//! with a common denominator.
//!
//! Parameters: `denominators`, `unit_only` (numerator always 1),
//! `max_amount` (largest whole for "fraction of"), `max_multiplier`
//! (scale factor for equivalent fractions).

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, multiple_choice, name, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{gcd, sample, uniform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionsOp {
    FractionOfAmount,
    EquivalentFraction,
    Simplify,
    CompareFractions,
    AddSameDenominator,
}

impl Operation for FractionsOp {
    const FALLBACK: Self = FractionsOp::FractionOfAmount;
}

struct Setup {
    denominators: Vec<i64>,
    unit_only: bool,
    max_amount: i64,
    max_multiplier: i64,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let mut denominators = params.ints("denominators");
    denominators.retain(|&d| d >= 2);
    if denominators.is_empty() {
        denominators = match level {
            Level::Beginning  => vec![2, 4],
            Level::Developing => vec![2, 3, 4],
            Level::Meeting    => vec![2, 3, 4, 5, 8, 10],
            Level::Exceeding  => vec![3, 4, 5, 6, 8, 10, 12],
        };
    }
    Setup {
        denominators,
        unit_only: params.flag("unit_only"),
        max_amount: params.int("max_amount").unwrap_or(60).max(2),
        max_multiplier: params.int("max_multiplier").unwrap_or(5).max(2),
    }
}

fn frac(n: i64, d: i64) -> String {
    format!("{n}/{d}")
}

fn pick_denominator<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> i64 {
    s.denominators.choose(rng).copied().unwrap_or(2)
}

/// Numerator in 1..d, coprime with d so the fraction is in lowest terms.
fn proper_numerator<R: Rng + ?Sized>(rng: &mut R, d: i64, unit_only: bool) -> i64 {
    if unit_only {
        return 1;
    }
    sample(rng, |rng| uniform(rng, 1, d - 1), |&n| gcd(n, d) == 1).into_value()
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<FractionsOp, _>(rng, params) {
        FractionsOp::FractionOfAmount   => fraction_of_amount(rng, &s),
        FractionsOp::EquivalentFraction => equivalent_fraction(rng, &s),
        FractionsOp::Simplify           => simplify(rng, &s),
        FractionsOp::CompareFractions   => compare_fractions(rng, &s),
        FractionsOp::AddSameDenominator => add_same_denominator(rng, &s),
    }
}

fn fraction_of_amount<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let d = pick_denominator(rng, s);
    let n = proper_numerator(rng, d, s.unit_only);
    // The amount is a multiple of d so the answer is whole.
    let k = uniform(rng, 1, (s.max_amount / d).max(1));
    let amount = d * k;
    let answer = n * k;

    let text = if rng.gen_bool(0.5) {
        format!("What is {} of {amount}?", frac(n, d))
    } else {
        let template = pick(
            rng,
            &[
                "{name} has {amount} sweets and eats {f} of them. How many sweets does {name} eat?",
                "A class of {amount} children. {f} of them walk to school. How many walk?",
            ],
        );
        fill(template, &[("name", name(rng)), ("amount", amount.to_string()), ("f", frac(n, d))])
    };
    text_input(FractionsOp::FractionOfAmount, text, answer.to_string())
        .with_hint(format!("Divide {amount} by {d}, then multiply by {n}."))
}

fn equivalent_fraction<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let d = pick_denominator(rng, s);
    let n = proper_numerator(rng, d, s.unit_only);
    let m = uniform(rng, 2, s.max_multiplier);
    text_input(
        FractionsOp::EquivalentFraction,
        format!("Complete the equivalent fraction: {} = ___/{}", frac(n, d), d * m),
        (n * m).to_string(),
    )
    .with_hint(format!("The denominator was multiplied by {m}."))
}

fn simplify<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let d = pick_denominator(rng, s);
    let n = proper_numerator(rng, d, false);
    let m = uniform(rng, 2, s.max_multiplier);
    text_input(
        FractionsOp::Simplify,
        format!("Write {} in its simplest form.", frac(n * m, d * m)),
        frac(n, d),
    )
    .with_hint(format!("Divide the top and bottom by {m}."))
}

fn compare_fractions<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let ((n1, d1), (n2, d2)) = sample(
        rng,
        |rng| {
            let d1 = pick_denominator(rng, s);
            let d2 = pick_denominator(rng, s);
            (
                (uniform(rng, 1, d1 - 1), d1),
                (uniform(rng, 1, d2 - 1), d2),
            )
        },
        |&((n1, d1), (n2, d2))| n1 * d2 != n2 * d1,
    )
    .into_value();

    let (first, second) = (frac(n1, d1), frac(n2, d2));
    let (larger, smaller) = match (n1 * d2).cmp(&(n2 * d1)) {
        Ordering::Less => (second.clone(), first.clone()),
        _              => (first.clone(), second.clone()),
    };
    // Exhausted draws can leave equal fractions; then "They are equal" is right.
    let answer = if n1 * d2 == n2 * d1 { "They are equal".to_string() } else { larger };
    let distractors = vec![smaller, "They are equal".to_string(), first, second];

    multiple_choice(
        rng,
        FractionsOp::CompareFractions,
        format!("Which is larger: {} or {}?", frac(n1, d1), frac(n2, d2)),
        answer,
        distractors,
    )
    .with_hint("Change them to the same denominator first.")
}

fn add_same_denominator<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let d = pick_denominator(rng, s).max(3);
    let a = uniform(rng, 1, d - 2);
    let b = uniform(rng, 1, d - 1 - a);
    text_input(
        FractionsOp::AddSameDenominator,
        format!("{} + {} = ___ (do not simplify)", frac(a, d), frac(b, d)),
        frac(a + b, d),
    )
    .with_hint("Add the numerators; the denominator stays the same.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op], "denominators": [3, 4, 5, 8] }))
    }

    fn parse_frac(s: &str) -> (i64, i64) {
        let (n, d) = s.split_once('/').unwrap();
        (n.trim().parse().unwrap(), d.trim().parse().unwrap())
    }

    #[test]
    fn simplified_answers_are_lowest_terms() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("simplify"), Level::Meeting);
            let (n, d) = parse_frac(&q.answer);
            assert_eq!(gcd(n, d), 1, "seed={seed} {}", q.answer);
        }
    }

    #[test]
    fn fraction_of_amount_is_whole() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("fraction_of_amount"), Level::Developing);
            assert!(q.answer.parse::<i64>().is_ok(), "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn sums_stay_proper() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("add_same_denominator"), Level::Developing);
            let (n, d) = parse_frac(&q.answer);
            assert!(n < d, "seed={seed} {}", q.answer);
        }
    }

    #[test]
    fn comparison_picks_the_larger() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("compare_fractions"), Level::Meeting);
            assert!(q.options.contains(&q.answer));
            let (n, d) = parse_frac(&q.answer);
            for opt in q.options.iter().filter(|o| o.contains('/')) {
                let (on, od) = parse_frac(opt);
                assert!(n * od >= on * d, "seed={seed} {} vs {opt}", q.answer);
            }
        }
    }
}
