//! Counting sequences: counting on and back in steps, gaps in sequences,
//! one/ten/hundred more or less, and ordering three numbers.
//!
//! Parameters: `range` (start values), `steps` (step sizes), `terms`
//! (sequence length shown), `allow_negative`, `min_gap` (ordering questions).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, multiple_choice, numeric_distractors, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{sample_increasing, uniform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingOp {
    CountOn,
    CountBack,
    MissingNumber,
    OneMoreLess,
    OrderThree,
}

impl Operation for CountingOp {
    const FALLBACK: Self = CountingOp::CountOn;
}

struct Setup {
    range: (i64, i64),
    steps: Vec<i64>,
    terms: usize,
    allow_negative: bool,
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let default_max = match level {
        Level::Beginning  => 20,
        Level::Developing => 100,
        Level::Meeting    => 1_000,
        Level::Exceeding  => 10_000,
    };
    let mut steps = params.ints("steps");
    steps.retain(|&s| s > 0);
    if steps.is_empty() {
        steps = vec![1, 2, 10];
    }
    Setup {
        range: params.int_range("range").unwrap_or((0, default_max)),
        steps,
        terms: params.int("terms").map_or(5, |t| t.clamp(3, 8) as usize),
        allow_negative: params.flag("allow_negative"),
    }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<CountingOp, _>(rng, params) {
        CountingOp::CountOn       => count_on(rng, &s),
        CountingOp::CountBack     => count_back(rng, &s),
        CountingOp::MissingNumber => missing_number(rng, &s),
        CountingOp::OneMoreLess   => one_more_less(rng, &s),
        CountingOp::OrderThree    => order_three(rng, &s, params.int("min_gap").unwrap_or(2)),
    }
}

fn join(values: &[i64]) -> String {
    values.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
}

fn pick_step<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> i64 {
    s.steps.choose(rng).copied().unwrap_or(1)
}

fn count_on<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let step = pick_step(rng, s);
    let start = uniform(rng, s.range.0, s.range.1);
    let shown: Vec<i64> = (0..s.terms as i64 - 1).map(|i| start + i * step).collect();
    let answer = start + (s.terms as i64 - 1) * step;

    text_input(
        CountingOp::CountOn,
        format!("Count on in {step}s. What comes next?\n{}, ___", join(&shown)),
        answer.to_string(),
    )
    .with_hint(format!("Add {step} to the last number."))
}

fn count_back<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let step = pick_step(rng, s);
    let span = (s.terms as i64 - 1) * step;
    // Keep the whole sequence at or above zero unless negatives are allowed.
    let lo = if s.allow_negative { s.range.0 } else { s.range.0.max(span) };
    let start = uniform(rng, lo, s.range.1.max(lo));
    let shown: Vec<i64> = (0..s.terms as i64 - 1).map(|i| start - i * step).collect();

    text_input(
        CountingOp::CountBack,
        format!("Count back in {step}s. What comes next?\n{}, ___", join(&shown)),
        (start - span).to_string(),
    )
    .with_hint(format!("Take away {step} from the last number."))
}

fn missing_number<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let step = pick_step(rng, s);
    let start = uniform(rng, s.range.0, s.range.1);
    let backwards = s.allow_negative && rng.gen_bool(0.5);
    let seq: Vec<i64> = (0..s.terms as i64)
        .map(|i| if backwards { start - i * step } else { start + i * step })
        .collect();
    // Never blank the first or last term so the rule stays visible.
    let gap = rng.gen_range(1..seq.len() - 1);

    let shown: Vec<String> = seq
        .iter()
        .enumerate()
        .map(|(i, v)| if i == gap { "___".to_string() } else { v.to_string() })
        .collect();

    text_input(
        CountingOp::MissingNumber,
        format!("Fill in the missing number:\n{}", shown.join(", ")),
        seq[gap].to_string(),
    )
}

fn one_more_less<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let amounts: Vec<i64> = [1, 10, 100, 1_000].into_iter().filter(|&a| a * 10 <= s.range.1.max(10)).collect();
    let amount = amounts.choose(rng).copied().unwrap_or(1);
    let more = rng.gen_bool(0.5);
    let lo = if more || s.allow_negative { s.range.0 } else { s.range.0.max(amount) };
    let n = uniform(rng, lo, s.range.1.max(lo));
    let answer = if more { n + amount } else { n - amount };

    let word = match amount {
        1   => "one",
        10  => "ten",
        100 => "one hundred",
        _   => "one thousand",
    };
    let direction = if more { "more" } else { "less" };
    let template = pick(rng, &["What is {word} {dir} than {n}?", "Find {word} {dir} than {n}."]);
    let text = fill(template, &[("word", word.to_string()), ("dir", direction.to_string()), ("n", n.to_string())]);

    // Wrong-place distractors: moved by the wrong power of ten or the wrong way.
    let wrong_way = if more { n - amount } else { n + amount };
    let wrong_place = if more { n + amount * 10 } else { n - amount * 10 };
    let distractors = numeric_distractors(answer, &[wrong_way, wrong_place, n], s.allow_negative);
    multiple_choice(rng, CountingOp::OneMoreLess, text, answer.to_string(), distractors)
}

fn order_three<R: Rng + ?Sized>(rng: &mut R, s: &Setup, min_gap: i64) -> QuestionBody {
    let sorted = sample_increasing(rng, s.range, 3, min_gap.max(1)).into_value();
    let mut shown = sorted.clone();
    shown.shuffle(rng);

    text_input(
        CountingOp::OrderThree,
        format!("Put these numbers in order, smallest first:\n{}", join(&shown)),
        "",
    )
    .with_parts(sorted.iter().map(i64::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice_engine::models::QuestionKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str, extra: serde_json::Value) -> ParameterSet {
        ParameterSet::from_value(extra).with("operations", json!([op]))
    }

    fn numbers_in(text: &str) -> Vec<i64> {
        text.split(|c: char| !(c.is_ascii_digit() || c == '-'))
            .filter_map(|t| t.parse().ok())
            .collect()
    }

    #[test]
    fn count_on_continues_the_sequence() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("count_on", json!({ "steps": [3], "range": [0, 50] })), Level::Beginning);
            let nums = numbers_in(q.text.lines().nth(1).unwrap());
            let next = nums[nums.len() - 1] + 3;
            assert_eq!(q.answer, next.to_string(), "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn count_back_stays_non_negative_by_default() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("count_back", json!({ "steps": [10], "range": [0, 60] })), Level::Developing);
            assert!(q.answer.parse::<i64>().unwrap() >= 0, "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn missing_number_fits_the_rule() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("missing_number", json!({ "steps": [5], "terms": 5 })), Level::Beginning);
            let line = q.text.lines().nth(1).unwrap();
            let terms: Vec<&str> = line.split(", ").collect();
            let gap = terms.iter().position(|t| *t == "___").unwrap();
            let prev: i64 = terms[gap - 1].parse().unwrap();
            assert_eq!(q.answer, (prev + 5).to_string(), "seed={seed}");
        }
    }

    #[test]
    fn ordering_answer_is_sorted_parts() {
        let mut rng = StdRng::seed_from_u64(4);
        let q = generate(&mut rng, &only("order_three", json!({ "range": [1, 99] })), Level::Beginning);
        let parts = q.answers.clone().unwrap();
        let nums: Vec<i64> = parts.iter().map(|p| p.parse().unwrap()).collect();
        assert!(nums.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(q.answer, parts.join(","));
    }

    #[test]
    fn one_more_less_is_a_choice_containing_the_answer() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("one_more_less", json!({ "range": [20, 900] })), Level::Meeting);
            assert_eq!(q.kind, QuestionKind::MultipleChoice);
            assert!(q.options.contains(&q.answer));
        }
    }
}
