//! Number bonds: pairs that make a target total, the related subtraction
//! facts, and fact families.
//!
//! Parameters: `totals` (target totals, e.g. `[10]` or `[10, 20, 100]`),
//! `multiples_of` (restrict the first part to multiples, for bonds to 100).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, multiple_choice, name, numeric_distractors, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{sample, uniform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondsOp {
    MissingAddend,
    SubtractionFact,
    BondChoice,
    FactFamily,
    WordProblem,
}

impl Operation for BondsOp {
    const FALLBACK: Self = BondsOp::MissingAddend;
}

/// A bond `part + other = total`.
#[derive(Debug, Clone, Copy)]
struct Bond {
    total: i64,
    part: i64,
    other: i64,
}

fn default_totals(level: Level) -> Vec<i64> {
    match level {
        Level::Beginning  => vec![10],
        Level::Developing => vec![10, 20],
        Level::Meeting    => vec![20, 100],
        Level::Exceeding  => vec![100, 1_000],
    }
}

fn draw_bond<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level, distinct: bool) -> Bond {
    let mut totals = params.ints("totals");
    totals.retain(|&t| t >= 2);
    if totals.is_empty() {
        totals = default_totals(level);
    }
    let total = totals.choose(rng).copied().unwrap_or(10);
    let step = params.int("multiples_of").filter(|&m| m > 0 && m < total).unwrap_or(1);

    let part = sample(
        rng,
        |rng| uniform(rng, 1, (total - 1) / step) * step,
        // Fact families need two different parts.
        |&p| !distinct || p * 2 != total,
    )
    .into_value();
    Bond { total, part, other: total - part }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let op = pick_operation::<BondsOp, _>(rng, params);
    let bond = draw_bond(rng, params, level, op == BondsOp::FactFamily);
    match op {
        BondsOp::MissingAddend   => missing_addend(rng, bond),
        BondsOp::SubtractionFact => subtraction_fact(rng, bond),
        BondsOp::BondChoice      => bond_choice(rng, bond),
        BondsOp::FactFamily      => fact_family(bond),
        BondsOp::WordProblem     => word_problem(rng, bond),
    }
}

fn missing_addend<R: Rng + ?Sized>(rng: &mut R, b: Bond) -> QuestionBody {
    let text = if rng.gen_bool(0.5) {
        format!("{} + ___ = {}", b.part, b.total)
    } else {
        format!("___ + {} = {}", b.part, b.total)
    };
    text_input(BondsOp::MissingAddend, text, b.other.to_string())
        .with_hint(format!("What do you add to {} to make {}?", b.part, b.total))
}

fn subtraction_fact<R: Rng + ?Sized>(rng: &mut R, b: Bond) -> QuestionBody {
    let template = pick(rng, &["{total} − {part} = ___", "What is {total} take away {part}?"]);
    let text = fill(template, &[("total", b.total.to_string()), ("part", b.part.to_string())]);
    text_input(BondsOp::SubtractionFact, text, b.other.to_string())
        .with_hint(format!("Think: {} + ? = {}", b.part, b.total))
}

fn bond_choice<R: Rng + ?Sized>(rng: &mut R, b: Bond) -> QuestionBody {
    let text = format!("Which number goes with {} to make {}?", b.part, b.total);
    // Off by one either way, the part itself, and the total.
    let distractors = numeric_distractors(b.other, &[b.other + 1, b.other - 1, b.part, b.total], false);
    multiple_choice(rng, BondsOp::BondChoice, text, b.other.to_string(), distractors)
}

fn fact_family(b: Bond) -> QuestionBody {
    let text = format!(
        "Complete the fact family:\n{p} + {o} = {t}\n{o} + {p} = {t}\n{t} − {p} = ___\n{t} − {o} = ___",
        p = b.part,
        o = b.other,
        t = b.total,
    );
    text_input(BondsOp::FactFamily, text, "")
        .with_parts(vec![b.other.to_string(), b.part.to_string()])
        .with_hint("Write both missing numbers, separated by a comma.")
}

fn word_problem<R: Rng + ?Sized>(rng: &mut R, b: Bond) -> QuestionBody {
    let template = pick(
        rng,
        &[
            "{name} has {total} stickers and gives {part} away. How many stickers are left?",
            "{name} needs {total} points to win. They have {part} points. How many more points do they need?",
            "There are {total} children in a class. {part} are in the hall. How many are in the classroom?",
            "{name} has some marbles. After finding {part} more, they have {total}. How many did they start with?",
        ],
    );
    let text = fill(
        template,
        &[("name", name(rng)), ("total", b.total.to_string()), ("part", b.part.to_string())],
    );
    text_input(BondsOp::WordProblem, text, b.other.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str, totals: &[i64]) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op], "totals": totals }))
    }

    #[test]
    fn missing_addend_completes_the_bond() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("missing_addend", &[10, 20]), Level::Developing);
            let nums: Vec<i64> = q.text.split(|c: char| !c.is_ascii_digit()).filter_map(|t| t.parse().ok()).collect();
            let (part, total) = (nums[0], nums[1]);
            assert_eq!(q.answer, (total - part).to_string(), "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn fact_family_parts_differ() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("fact_family", &[10]), Level::Beginning);
            let parts = q.answers.unwrap();
            assert_eq!(parts.len(), 2);
            assert_ne!(parts[0], parts[1], "seed={seed}");
            let sum: i64 = parts.iter().map(|p| p.parse::<i64>().unwrap()).sum();
            assert_eq!(sum, 10);
        }
    }

    #[test]
    fn bond_choice_offers_the_pair() {
        let mut rng = StdRng::seed_from_u64(3);
        let q = generate(&mut rng, &only("bond_choice", &[100]), Level::Meeting);
        assert!(q.options.contains(&q.answer));
        assert!(q.options.len() >= 3);
    }

    #[test]
    fn multiples_restrict_parts() {
        let params = ParameterSet::from_value(json!({
            "operations": ["subtraction_fact"], "totals": [100], "multiples_of": 10
        }));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &params, Level::Meeting);
            assert_eq!(q.answer.parse::<i64>().unwrap() % 10, 0, "seed={seed}");
        }
    }
}
