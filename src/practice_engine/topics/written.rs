//! Written (columnar) addition and subtraction.
//!
//! Parameters: `digits` (operand digit count, `[min, max]`), `columnar`
//! (lay the sum out in columns instead of on one line).
//!
//! Carry checks propagate the carry between columns. Borrow checks compare
//! digits column by column without propagating, so a zero in the minuend
//! (e.g. `400 − 123`) counts as one borrow per short column.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{pick_operation, text_input, with_commas, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{digit_at, digit_count, sample, sample_int, uniform, Constraint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrittenOp {
    AdditionNoCarry,
    AdditionWithCarry,
    SubtractionNoBorrow,
    SubtractionWithBorrow,
    #[serde(rename = "crossing_1000")]
    Crossing1000,
    MissingDigit,
}

impl Operation for WrittenOp {
    const FALLBACK: Self = WrittenOp::AdditionNoCarry;
}

struct Setup {
    range: (i64, i64),
    columnar: bool,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let (lo, hi) = params.int_range("digits").unwrap_or(match level {
        Level::Beginning  => (2, 2),
        Level::Developing => (2, 3),
        Level::Meeting    => (3, 3),
        Level::Exceeding  => (3, 4),
    });
    let (lo, hi) = (lo.clamp(1, 6) as u32, hi.clamp(1, 6) as u32);
    Setup {
        range: (10i64.pow(lo - 1).max(1), 10i64.pow(hi) - 1),
        columnar: params.flag("columnar"),
    }
}

/// Right-aligned column layout, e.g.
///
/// ```text
///   345
/// + 127
/// ─────
/// ```
pub fn columnar(a: i64, b: i64, op: char) -> String {
    let (a, b) = (with_commas(a), with_commas(b));
    let width = a.chars().count().max(b.chars().count());
    let line = "─".repeat(width + 2);
    format!("<pre class=\"columnar-calc\">  {a:>width$}\n{op} {b:>width$}\n{line}</pre>")
}

fn layout(s: &Setup, a: i64, b: i64, op: char) -> String {
    if s.columnar {
        format!("Work out:\n{}", columnar(a, b, op))
    } else {
        format!("{} {op} {} = ___", with_commas(a), with_commas(b))
    }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<WrittenOp, _>(rng, params) {
        WrittenOp::AdditionNoCarry       => addition(rng, &s, false),
        WrittenOp::AdditionWithCarry     => addition(rng, &s, true),
        WrittenOp::SubtractionNoBorrow   => subtraction(rng, &s, false),
        WrittenOp::SubtractionWithBorrow => subtraction(rng, &s, true),
        WrittenOp::Crossing1000          => crossing_1000(rng, &s),
        WrittenOp::MissingDigit          => missing_digit(rng, &s),
    }
}

fn addition<R: Rng + ?Sized>(rng: &mut R, s: &Setup, carry: bool) -> QuestionBody {
    // Draw both operands together: some tops (e.g. 950) admit no carry-free partner.
    let (a, b) = sample(
        rng,
        |rng| (uniform(rng, s.range.0, s.range.1), uniform(rng, s.range.0, s.range.1)),
        |&(a, b)| {
            let rule = if carry { Constraint::CarryWith(a) } else { Constraint::NoCarryWith(a) };
            rule.holds(b)
        },
    )
    .into_value();
    let op = if carry { WrittenOp::AdditionWithCarry } else { WrittenOp::AdditionNoCarry };

    let q = text_input(op, layout(s, a, b, '+'), (a + b).to_string());
    if carry {
        q.with_hint("When a column adds up to 10 or more, carry the ten into the next column.")
    } else {
        q.with_hint("Add the ones first, then the tens, then the hundreds.")
    }
}

fn subtraction<R: Rng + ?Sized>(rng: &mut R, s: &Setup, borrow: bool) -> QuestionBody {
    let (a, b) = sample(
        rng,
        |rng| {
            let x = uniform(rng, s.range.0, s.range.1);
            let y = uniform(rng, s.range.0, s.range.1);
            (x.max(y), x.min(y))
        },
        |&(a, b)| {
            let rule = if borrow { Constraint::BorrowFrom(a) } else { Constraint::NoBorrowFrom(a) };
            a > b && rule.holds(b)
        },
    )
    .into_value();
    let op = if borrow { WrittenOp::SubtractionWithBorrow } else { WrittenOp::SubtractionNoBorrow };

    let q = text_input(op, layout(s, a, b, '−'), (a - b).to_string());
    if borrow {
        q.with_hint("If the bottom digit is bigger, exchange one from the next column.")
    } else {
        q
    }
}

fn crossing_1000<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let a = uniform(rng, 500, 999);
    let b = sample_int(rng, (100, 999), &[Constraint::SumExceeds { other: a, boundary: 1_000 }]).into_value();
    text_input(WrittenOp::Crossing1000, layout(s, a, b, '+'), (a + b).to_string())
        .with_hint("The answer will be more than 1,000.")
}

fn missing_digit<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let (lo, hi) = (s.range.0.max(10), s.range.1.max(99));
    let (a, b) = sample(
        rng,
        |rng| (uniform(rng, lo, hi), uniform(rng, lo, hi)),
        |&(a, b)| !Constraint::CarryWith(b).holds(a),
    )
    .into_value();
    let place = uniform(rng, 0, digit_count(a) as i64 - 1) as u32;

    let hidden: String = a
        .to_string()
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| if i as u32 == place { '_' } else { c })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    text_input(
        WrittenOp::MissingDigit,
        format!("Find the missing digit:\n{hidden} + {b} = {}", a + b),
        digit_at(a, place).to_string(),
    )
    .with_hint("Work backwards: subtract the known number from the total.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice_engine::sampler::{has_borrow, has_carry};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op], "digits": [3, 3] }))
    }

    fn operands(text: &str) -> (i64, i64) {
        let nums: Vec<i64> = text
            .replace(',', "")
            .split(|c: char| !c.is_ascii_digit())
            .filter_map(|t| t.parse().ok())
            .collect();
        (nums[0], nums[1])
    }

    #[test]
    fn carry_variants_respect_carry() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("addition_with_carry"), Level::Meeting);
            let (a, b) = operands(&q.text);
            assert!(has_carry(a, b), "seed={seed} {}", q.text);
            assert_eq!(q.answer, (a + b).to_string());

            let q = generate(&mut rng, &only("addition_no_carry"), Level::Meeting);
            let (a, b) = operands(&q.text);
            assert!(!has_carry(a, b), "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn borrow_variants_respect_borrow() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("subtraction_with_borrow"), Level::Meeting);
            let (a, b) = operands(&q.text);
            assert!(a > b && has_borrow(a, b), "seed={seed} {}", q.text);
            assert_eq!(q.answer, (a - b).to_string());
        }
    }

    #[test]
    fn crossing_1000_exceeds_boundary() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("crossing_1000"), Level::Exceeding);
            assert!(q.answer.parse::<i64>().unwrap() > 1000);
        }
    }

    #[test]
    fn missing_digit_restores_the_sum() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("missing_digit"), Level::Meeting);
            let line = q.text.lines().nth(1).unwrap();
            let restored = line.replacen('_', &q.answer, 1);
            let nums: Vec<i64> = restored.split(|c: char| !c.is_ascii_digit()).filter_map(|t| t.parse().ok()).collect();
            assert_eq!(nums[0] + nums[1], nums[2], "seed={seed} {line}");
        }
    }

    #[test]
    fn columnar_layout_right_aligns() {
        let text = columnar(1234, 56, '+');
        assert_eq!(text, "<pre class=\"columnar-calc\">  1,234\n+    56\n───────</pre>");
    }
}
