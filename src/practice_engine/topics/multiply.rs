//! Times tables and the matching division facts.
//!
//! Parameters: `tables` (which tables are in play), `max_factor` (largest
//! multiplier, usually 10 or 12).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, multiple_choice, name, numeric_distractors, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::uniform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplyOp {
    TimesTable,
    DivisionFact,
    MissingFactor,
    MultiplyChoice,
    WordProblem,
}

impl Operation for MultiplyOp {
    const FALLBACK: Self = MultiplyOp::TimesTable;
}

/// `table × factor = product`.
#[derive(Debug, Clone, Copy)]
struct Fact {
    table: i64,
    factor: i64,
    product: i64,
}

fn draw_fact<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> Fact {
    let mut tables = params.ints("tables");
    tables.retain(|&t| t > 0);
    if tables.is_empty() {
        tables = match level {
            Level::Beginning  => vec![2, 5, 10],
            Level::Developing => vec![2, 3, 4, 5, 8, 10],
            _                 => (2..=12).collect(),
        };
    }
    let table = tables.choose(rng).copied().unwrap_or(2);
    let factor = uniform(rng, 1, params.int("max_factor").unwrap_or(12).max(1));
    Fact { table, factor, product: table * factor }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let op = pick_operation::<MultiplyOp, _>(rng, params);
    let fact = draw_fact(rng, params, level);
    match op {
        MultiplyOp::TimesTable     => times_table(rng, fact),
        MultiplyOp::DivisionFact   => division_fact(fact),
        MultiplyOp::MissingFactor  => missing_factor(fact),
        MultiplyOp::MultiplyChoice => multiply_choice(rng, fact),
        MultiplyOp::WordProblem    => word_problem(rng, fact),
    }
}

fn times_table<R: Rng + ?Sized>(rng: &mut R, f: Fact) -> QuestionBody {
    // Either order; multiplication is commutative.
    let (a, b) = if rng.gen_bool(0.5) { (f.table, f.factor) } else { (f.factor, f.table) };
    text_input(MultiplyOp::TimesTable, format!("{a} × {b} = ___"), f.product.to_string())
}

fn division_fact(f: Fact) -> QuestionBody {
    text_input(MultiplyOp::DivisionFact, format!("{} ÷ {} = ___", f.product, f.table), f.factor.to_string())
        .with_hint(format!("How many {}s make {}?", f.table, f.product))
}

fn missing_factor(f: Fact) -> QuestionBody {
    text_input(MultiplyOp::MissingFactor, format!("{} × ___ = {}", f.table, f.product), f.factor.to_string())
        .with_hint(format!("Count in {}s until you reach {}.", f.table, f.product))
}

fn multiply_choice<R: Rng + ?Sized>(rng: &mut R, f: Fact) -> QuestionBody {
    let text = format!("What is {} × {}?", f.table, f.factor);
    // Neighbouring facts, and adding instead of multiplying.
    let near = [
        f.table * (f.factor + 1),
        f.table * (f.factor - 1),
        f.table + f.factor,
        (f.table + 1) * f.factor,
    ];
    let distractors = numeric_distractors(f.product, &near, false);
    multiple_choice(rng, MultiplyOp::MultiplyChoice, text, f.product.to_string(), distractors)
}

fn word_problem<R: Rng + ?Sized>(rng: &mut R, f: Fact) -> QuestionBody {
    let vars = [
        ("name", name(rng)),
        ("table", f.table.to_string()),
        ("factor", f.factor.to_string()),
        ("product", f.product.to_string()),
    ];
    if rng.gen_bool(0.5) {
        let template = pick(
            rng,
            &[
                "There are {factor} bags with {table} sweets in each bag. How many sweets are there altogether?",
                "{name} buys {factor} packs of cards. Each pack has {table} cards. How many cards does {name} have?",
                "A minibus has {factor} rows of {table} seats. How many seats are there?",
            ],
        );
        text_input(MultiplyOp::WordProblem, fill(template, &vars), f.product.to_string())
    } else {
        let template = pick(
            rng,
            &[
                "{product} pencils are shared equally between {table} pots. How many pencils go in each pot?",
                "{name} puts {product} eggs into boxes of {table}. How many boxes does {name} fill?",
            ],
        );
        text_input(MultiplyOp::WordProblem, fill(template, &vars), f.factor.to_string())
    }
}
