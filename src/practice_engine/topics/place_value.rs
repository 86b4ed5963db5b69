//! Place value: reading digits, their values, partitioning and composing
//! numbers, and comparing with `<` / `>`.
//!
//! Parameters: `digits` (`[min, max]` digit count of the numbers used).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{multiple_choice, pick_operation, text_input, with_commas, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{digit_at, digit_count, sample, sample_int, uniform, Constraint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceValueOp {
    IdentifyDigit,
    DigitValue,
    Partition,
    Compose,
    CompareDigits,
}

impl Operation for PlaceValueOp {
    const FALLBACK: Self = PlaceValueOp::IdentifyDigit;
}

const PLACE_NAMES: [&str; 7] = [
    "ones",
    "tens",
    "hundreds",
    "thousands",
    "ten thousands",
    "hundred thousands",
    "millions",
];

fn place_name(place: u32) -> &'static str {
    PLACE_NAMES.get(place as usize).copied().unwrap_or("ones")
}

fn digit_range(params: &ParameterSet, level: Level) -> (u32, u32) {
    let (lo, hi) = params.int_range("digits").unwrap_or(match level {
        Level::Beginning  => (2, 2),
        Level::Developing => (2, 3),
        Level::Meeting    => (3, 4),
        Level::Exceeding  => (4, 6),
    });
    (lo.clamp(1, 7) as u32, hi.clamp(1, 7) as u32)
}

/// Number with between `lo` and `hi` digits.
fn number_with_digits<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (u32, u32)) -> i64 {
    let digits = uniform(rng, lo as i64, hi as i64) as u32;
    let min = if digits == 1 { 0 } else { 10i64.pow(digits - 1) };
    uniform(rng, min, 10i64.pow(digits) - 1)
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let digits = digit_range(params, level);
    match pick_operation::<PlaceValueOp, _>(rng, params) {
        PlaceValueOp::IdentifyDigit => identify_digit(rng, digits),
        PlaceValueOp::DigitValue    => digit_value(rng, digits),
        PlaceValueOp::Partition     => partition(rng, digits),
        PlaceValueOp::Compose       => compose(rng, digits),
        PlaceValueOp::CompareDigits => compare_digits(rng, digits),
    }
}

fn identify_digit<R: Rng + ?Sized>(rng: &mut R, digits: (u32, u32)) -> QuestionBody {
    let n = number_with_digits(rng, digits);
    let place = uniform(rng, 0, digit_count(n) as i64 - 1) as u32;
    text_input(
        PlaceValueOp::IdentifyDigit,
        format!("What is the {} digit in {}?", place_name(place), with_commas(n)),
        digit_at(n, place).to_string(),
    )
}

fn digit_value<R: Rng + ?Sized>(rng: &mut R, digits: (u32, u32)) -> QuestionBody {
    // Need at least two digits so the asked digit has a place worth naming.
    let digits = (digits.0.max(2), digits.1.max(2));
    let draw = sample(
        rng,
        |rng| {
            let n = number_with_digits(rng, digits);
            let place = uniform(rng, 0, digit_count(n) as i64 - 1) as u32;
            (n, place)
        },
        |&(n, place)| {
            // Non-zero, and not repeated elsewhere so "the digit d" is unambiguous.
            let d = digit_at(n, place);
            Constraint::NonZeroDigitAt(place).holds(n)
                && (0..digit_count(n)).filter(|&p| digit_at(n, p) == d).count() == 1
        },
    );
    let (n, place) = draw.into_value();
    let d = digit_at(n, place);
    let value = d * 10i64.pow(place);

    // Face value, neighbouring columns, and the number read up to that digit.
    let mut near = vec![d];
    if place > 0 {
        near.push(value / 10);
    }
    near.extend([value * 10, n / 10i64.pow(place), value * 100]);
    let near: Vec<String> = near.into_iter().map(|v| v.to_string()).collect();
    multiple_choice(
        rng,
        PlaceValueOp::DigitValue,
        format!("What is the value of the digit {d} in {}?", with_commas(n)),
        value.to_string(),
        near,
    )
    .with_hint(format!("The {d} is in the {} column.", place_name(place)))
}

fn partition<R: Rng + ?Sized>(rng: &mut R, digits: (u32, u32)) -> QuestionBody {
    let n = number_with_digits(rng, (digits.0.max(2), digits.1.max(2)));
    let count = digit_count(n);
    let places: Vec<u32> = (0..count).rev().collect();

    let blanks: Vec<String> = places.iter().map(|&p| format!("___ {}", place_name(p))).collect();
    let parts: Vec<String> = places.iter().map(|&p| digit_at(n, p).to_string()).collect();

    text_input(
        PlaceValueOp::Partition,
        format!("Partition {}:\n{}", with_commas(n), blanks.join(", ")),
        "",
    )
    .with_parts(parts)
    .with_hint("Write the digit for each column, separated by commas.")
}

fn compose<R: Rng + ?Sized>(rng: &mut R, digits: (u32, u32)) -> QuestionBody {
    let n = number_with_digits(rng, (digits.0.max(2), digits.1.max(2)));
    let pieces: Vec<String> = (0..digit_count(n))
        .rev()
        .map(|p| format!("{} {}", digit_at(n, p), place_name(p)))
        .collect();
    let (last, rest) = pieces.split_last().map_or((String::new(), &[][..]), |(l, r)| (l.clone(), r));
    text_input(
        PlaceValueOp::Compose,
        format!("What number is {} and {last}?", rest.join(", ")),
        n.to_string(),
    )
}

fn compare_digits<R: Rng + ?Sized>(rng: &mut R, digits: (u32, u32)) -> QuestionBody {
    let a = number_with_digits(rng, digits);
    // Often share the leading digits so the comparison needs more than a glance.
    let range = if rng.gen_bool(0.5) {
        let spread = 10i64.pow(digit_count(a).saturating_sub(1));
        (a - spread, a + spread)
    } else {
        let lo = 10i64.pow(digits.0.saturating_sub(1));
        (lo, 10i64.pow(digits.1) - 1)
    };
    let b = sample_int(rng, (range.0.max(0), range.1), &[Constraint::NotEqual(a)]).into_value();
    let answer = if a < b { "<" } else if a > b { ">" } else { "=" };

    multiple_choice(
        rng,
        PlaceValueOp::CompareDigits,
        format!("Which sign makes this true?\n{} ___ {}", with_commas(a), with_commas(b)),
        answer,
        vec!["<".to_string(), ">".to_string(), "=".to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str, digits: [i64; 2]) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op], "digits": digits }))
    }

    fn number_in(text: &str) -> i64 {
        let token = text
            .split(|c: char| !(c.is_ascii_digit() || c == ','))
            .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
            .max_by_key(|t| t.len())
            .unwrap();
        token.replace(',', "").parse().unwrap()
    }

    #[test]
    fn digit_value_is_nonzero_and_matches() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("digit_value", [3, 4]), Level::Meeting);
            let value: i64 = q.answer.parse().unwrap();
            assert!(value > 0, "seed={seed} {}", q.text);
            let n = number_in(&q.text);
            let place = (0..digit_count(n)).find(|&p| digit_at(n, p) * 10i64.pow(p) == value);
            assert!(place.is_some(), "seed={seed} {} -> {}", q.text, q.answer);
        }
    }

    #[test]
    fn partition_parts_recompose() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("partition", [3, 5]), Level::Exceeding);
            let parts = q.answers.clone().unwrap();
            let n: i64 = parts.iter().fold(0, |acc, d| acc * 10 + d.parse::<i64>().unwrap());
            assert_eq!(n, number_in(&q.text), "seed={seed}");
        }
    }

    #[test]
    fn compose_reads_back_the_number() {
        let mut rng = StdRng::seed_from_u64(8);
        let q = generate(&mut rng, &only("compose", [3, 3]), Level::Developing);
        assert!(q.text.contains("hundreds"));
        assert_eq!(q.answer.len(), 3);
    }

    #[test]
    fn comparison_sign_is_correct() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("compare_digits", [2, 4]), Level::Meeting);
            let line = q.text.lines().nth(1).unwrap().replace(',', "");
            let (a, b) = line.split_once(" ___ ").unwrap();
            let (a, b): (i64, i64) = (a.parse().unwrap(), b.parse().unwrap());
            let expected = if a < b { "<" } else { ">" };
            assert_eq!(q.answer, expected, "seed={seed} {line}");
        }
    }
}
