//! Money: pounds and pence, totals, change and making amounts with coins.
//!
//! Amounts are carried in whole pence throughout. Parameters: `max_pence`
//! (largest price), `denominations` (coins in pence for `coin_count`),
//! `notes` (notes in pounds paid with for `change_from`), `show_pounds`
//! (write prices of £1 or more in pounds).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, format_number, multiple_choice, name, numeric_distractors, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{sample_int, uniform, Constraint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyOp {
    PenceToPounds,
    PoundsToPence,
    TotalCost,
    ChangeFrom,
    CoinCount,
}

impl Operation for MoneyOp {
    const FALLBACK: Self = MoneyOp::PenceToPounds;
}

const UK_COINS: [i64; 8] = [200, 100, 50, 20, 10, 5, 2, 1];

const ITEMS: &[&str] = &["comic", "sandwich", "pencil case", "ruler", "apple", "drink", "notebook", "yo-yo"];

struct Setup {
    max_pence: i64,
    coins: Vec<i64>,
    notes: Vec<i64>,
    show_pounds: bool,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let mut coins = params.ints("denominations");
    coins.retain(|&c| c > 0);
    if !coins.contains(&1) {
        // Every amount must be makeable.
        coins.push(1);
    }
    coins.sort_unstable_by(|a, b| b.cmp(a));
    coins.dedup();

    let mut notes = params.ints("notes");
    notes.retain(|&n| n > 0);
    if notes.is_empty() {
        notes = vec![5, 10, 20];
    }
    Setup {
        max_pence: params.int("max_pence").unwrap_or(match level {
            Level::Beginning  => 50,
            Level::Developing => 100,
            Level::Meeting    => 500,
            Level::Exceeding  => 2_000,
        }).max(2),
        coins: if coins.len() > 1 { coins } else { UK_COINS.to_vec() },
        notes,
        show_pounds: params.flag("show_pounds") || level >= Level::Meeting,
    }
}

/// `£3.45` / `£3` / `45p`.
pub fn format_money(pence: i64, show_pounds: bool) -> String {
    if show_pounds && pence >= 100 {
        if pence % 100 == 0 {
            format!("£{}", pence / 100)
        } else {
            format!("£{}.{:02}", pence / 100, pence % 100)
        }
    } else {
        format!("{pence}p")
    }
}

/// Decimal pounds without the symbol or trailing zeros (`"1.5"`, `"3"`).
fn pounds_decimal(pence: i64) -> String {
    format_number(pence as f64 / 100.0, 2)
}

/// Fewest coins that make `pence`, largest first. Greedy is optimal for
/// sterling denominations.
pub fn fewest_coins(pence: i64, coins: &[i64]) -> Vec<i64> {
    let mut left = pence;
    let mut used = Vec::new();
    for &c in coins {
        while c > 0 && left >= c {
            left -= c;
            used.push(c);
        }
    }
    used
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<MoneyOp, _>(rng, params) {
        MoneyOp::PenceToPounds => pence_to_pounds(rng, &s),
        MoneyOp::PoundsToPence => pounds_to_pence(rng, &s),
        MoneyOp::TotalCost     => total_cost(rng, &s),
        MoneyOp::ChangeFrom    => change_from(rng, &s),
        MoneyOp::CoinCount     => coin_count(rng, &s),
    }
}

fn pence_to_pounds<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let pence = sample_int(rng, (101, s.max_pence.max(199)), &[Constraint::NotMultipleOf(100)]).into_value();
    text_input(MoneyOp::PenceToPounds, format!("Write {pence}p in pounds."), pounds_decimal(pence))
        .with_hint("There are 100p in £1.")
}

fn pounds_to_pence<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let pence = uniform(rng, 100, s.max_pence.max(199));
    text_input(
        MoneyOp::PoundsToPence,
        format!("How many pence is {}?", format_money(pence, true)),
        pence.to_string(),
    )
    .with_hint("Multiply the pounds by 100, then add the pence.")
}

fn total_cost<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let half = (s.max_pence / 2).max(1);
    let a = uniform(rng, 1, half);
    let b = uniform(rng, 1, half);
    let items: Vec<&str> = ITEMS.choose_multiple(rng, 2).copied().collect();
    let (first, second) = (items.first().copied().unwrap_or("comic"), items.get(1).copied().unwrap_or("ruler"));

    let template = pick(
        rng,
        &[
            "{name} buys a {first} for {a} and a {second} for {b}. How much is that altogether, in pence?",
            "A {first} costs {a} and a {second} costs {b}. What is the total cost in pence?",
        ],
    );
    let text = fill(
        template,
        &[
            ("name", name(rng)),
            ("first", first.to_string()),
            ("second", second.to_string()),
            ("a", format_money(a, s.show_pounds)),
            ("b", format_money(b, s.show_pounds)),
        ],
    );
    text_input(MoneyOp::TotalCost, text, (a + b).to_string())
}

fn change_from<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    // Pay with the smallest note that covers a price, or £1 for small prices.
    let price = uniform(rng, 1, s.max_pence.max(2) - 1);
    let paid = s
        .notes
        .iter()
        .map(|n| n * 100)
        .filter(|&p| p > price)
        .min()
        .unwrap_or_else(|| (price / 100 + 1) * 100);
    let paid = if price < 100 { 100 } else { paid };

    text_input(
        MoneyOp::ChangeFrom,
        format!(
            "{} pays for something costing {} with {}. How much change do they get, in pence?",
            name(rng),
            format_money(price, s.show_pounds),
            format_money(paid, true),
        ),
        (paid - price).to_string(),
    )
    .with_hint("Count on from the price to the amount paid.")
}

fn coin_count<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let amount = uniform(rng, 3, s.max_pence.min(500));
    let count = fewest_coins(amount, &s.coins).len() as i64;
    let distractors = numeric_distractors(count, &[count + 1, count - 1, count + 2], false);
    multiple_choice(
        rng,
        MoneyOp::CoinCount,
        format!("What is the smallest number of coins you need to make {}?", format_money(amount, s.show_pounds)),
        count.to_string(),
        distractors,
    )
    .with_hint("Start with the biggest coin that fits.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op], "max_pence": 900 }))
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(345, true), "£3.45");
        assert_eq!(format_money(300, true), "£3");
        assert_eq!(format_money(345, false), "345p");
        assert_eq!(format_money(45, true), "45p");
        assert_eq!(pounds_decimal(150), "1.5");
        assert_eq!(pounds_decimal(345), "3.45");
        assert_eq!(pounds_decimal(300), "3");
        assert_eq!(pounds_decimal(7), "0.07");
    }

    #[test]
    fn fewest_coins_is_greedy() {
        assert_eq!(fewest_coins(88, &UK_COINS), vec![50, 20, 10, 5, 2, 1]);
        assert_eq!(fewest_coins(400, &UK_COINS), vec![200, 200]);
    }

    #[test]
    fn pence_to_pounds_strips_trailing_zeros() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("pence_to_pounds"), Level::Meeting);
            if let Some((_, pence)) = q.answer.split_once('.') {
                assert!(pence.len() <= 2 && !pence.ends_with('0'), "seed={seed} {}", q.answer);
            }
            let pence: f64 = q.text.trim_start_matches("Write ").split('p').next().unwrap().parse().unwrap();
            let pounds: f64 = q.answer.parse().unwrap();
            assert!((pounds * 100.0 - pence).abs() < 1e-6, "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn change_is_positive_and_below_the_note() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("change_from"), Level::Exceeding);
            let change: i64 = q.answer.parse().unwrap();
            assert!(change > 0 && change < 2_000, "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn coin_count_answer_is_offered() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("coin_count"), Level::Developing);
            assert!(q.options.contains(&q.answer));
            assert_eq!(q.options.len(), 4);
        }
    }
}
