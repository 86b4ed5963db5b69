//! Unit conversion: metric both ways, imperial approximations, time, word
//! problems, comparisons and two-step problems.
//!
//! Parameters:
//! - `conversions`: `{ "length": [..], "mass": [..], "capacity": [..],
//!   "time": [..], "imperial": [..] }`, lists of `"<from>_to_<to>"` names.
//!   Names the resolver does not know are dropped with a warning.
//! - `ranges`: `{ "<unit>": { "min": .., "max": .. } }`, the value range for a
//!   quantity given in that unit.
//! - `value_types`: any of `"whole"`, `"decimal_1dp"`, `"decimal_2dp"`.
//! - `max_dp`: decimal places kept in answers (default 3).
//!
//! When the requested operation has no usable conversion the generator falls
//! back to larger-to-smaller metric, then time, then `km_to_m`.

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, format_number, multiple_choice, name, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::{uniform, uniform_decimal},
    units::{self, measure_of, unit_name, Measure, ResolvedFactor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionsOp {
    MetricConversionLargerToSmaller,
    MetricConversionSmallerToLarger,
    ImperialMetricConversion,
    TimeConversion,
    WordProblem,
    Comparison,
    MultiStep,
}

impl Operation for ConversionsOp {
    const FALLBACK: Self = ConversionsOp::MetricConversionLargerToSmaller;
}

const METRIC_KINDS: [&str; 3] = ["length", "mass", "capacity"];

/// A resolved `from → to` pair.
#[derive(Debug, Clone)]
struct Conversion {
    from: String,
    to: String,
    factor: ResolvedFactor,
}

impl Conversion {
    fn parse(name: &str) -> Option<Conversion> {
        let (from, to) = units::split_pair(name)?;
        match units::resolve(from, to) {
            Ok(factor) => Some(Conversion { from: from.to_string(), to: to.to_string(), factor }),
            Err(err) => {
                warn!("skipping conversion {name:?}: {err}");
                None
            }
        }
    }

    fn km_to_m() -> Conversion {
        Conversion {
            from: "km".to_string(),
            to: "m".to_string(),
            factor: ResolvedFactor { value: 1_000.0, approximate: false, reversed: false },
        }
    }

    /// Multiplier in the larger-to-smaller direction (always ≥ 1).
    fn scale(&self) -> f64 {
        if self.factor.is_larger_to_smaller() {
            self.factor.value
        } else {
            1.0 / self.factor.value
        }
    }
}

struct Setup {
    conversions: ParameterSet,
    ranges: ParameterSet,
    decimal_places: Vec<u32>,
    max_dp: usize,
}

fn setup(params: &ParameterSet) -> Setup {
    let mut decimal_places: Vec<u32> = params
        .strs("value_types")
        .into_iter()
        .filter_map(|t| match t {
            "whole"       => Some(0),
            "decimal_1dp" => Some(1),
            "decimal_2dp" => Some(2),
            _             => None,
        })
        .collect();
    if decimal_places.is_empty() {
        decimal_places.push(0);
    }
    Setup {
        conversions: params.nested("conversions").unwrap_or_default(),
        ranges: params.nested("ranges").unwrap_or_default(),
        decimal_places,
        max_dp: params.int("max_dp").unwrap_or(3).clamp(0, 6) as usize,
    }
}

impl Setup {
    fn pool(&self, kinds: &[&str]) -> Vec<Conversion> {
        kinds
            .iter()
            .flat_map(|kind| self.conversions.strs(kind))
            .filter_map(Conversion::parse)
            .collect()
    }

    fn metric(&self, larger_to_smaller: bool) -> Vec<Conversion> {
        self.pool(&METRIC_KINDS)
            .into_iter()
            .filter(|c| !c.factor.approximate && c.factor.is_larger_to_smaller() == larger_to_smaller)
            .collect()
    }

    /// Value for a quantity measured in `unit`, using the unit's range and a
    /// randomly chosen number of decimal places.
    fn value<R: Rng + ?Sized>(&self, rng: &mut R, unit: &str) -> f64 {
        let (lo, hi) = self.ranges.float_range(unit).unwrap_or((1.0, 10.0));
        let dp = self.decimal_places.choose(rng).copied().unwrap_or(0);
        uniform_decimal(rng, lo, hi, dp)
    }

    fn fmt(&self, value: f64) -> String {
        format_number(value, self.max_dp)
    }
}

fn choose<R: Rng + ?Sized>(rng: &mut R, pool: Vec<Conversion>) -> Option<Conversion> {
    pool.choose(rng).cloned()
}

/// Larger-to-smaller metric, then time, then `km_to_m`.
fn fallback<R: Rng + ?Sized>(rng: &mut R, s: &Setup, requested: ConversionsOp) -> (ConversionsOp, Conversion) {
    warn!("no usable conversions for {:?}, falling back", requested);
    let metric = s.metric(true);
    if let Some(c) = choose(rng, metric) {
        return (ConversionsOp::MetricConversionLargerToSmaller, c);
    }
    let time = s.pool(&["time"]);
    if let Some(c) = choose(rng, time) {
        return (ConversionsOp::TimeConversion, c);
    }
    (ConversionsOp::MetricConversionLargerToSmaller, Conversion::km_to_m())
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, _level: Level) -> QuestionBody {
    let s = setup(params);
    let requested = pick_operation::<ConversionsOp, _>(rng, params);

    let pool = match requested {
        ConversionsOp::MetricConversionLargerToSmaller => s.metric(true),
        ConversionsOp::MetricConversionSmallerToLarger => s.metric(false),
        ConversionsOp::ImperialMetricConversion        => s.pool(&["imperial"]),
        ConversionsOp::TimeConversion                  => s.pool(&["time"]),
        ConversionsOp::WordProblem | ConversionsOp::MultiStep => {
            let mut all = s.metric(true);
            all.extend(s.pool(&["time"]).into_iter().filter(|c| c.factor.is_larger_to_smaller()));
            all
        }
        ConversionsOp::Comparison => s.metric(true),
    };
    let (op, conversion) = match choose(rng, pool) {
        Some(c) => (requested, c),
        None => fallback(rng, &s, requested),
    };

    match op {
        ConversionsOp::TimeConversion if !conversion.factor.is_larger_to_smaller() =>
            smaller_to_larger(rng, &s, op, &conversion),
        ConversionsOp::MetricConversionLargerToSmaller
        | ConversionsOp::TimeConversion             => direct(rng, &s, op, &conversion),
        ConversionsOp::MetricConversionSmallerToLarger => smaller_to_larger(rng, &s, op, &conversion),
        ConversionsOp::ImperialMetricConversion     => imperial(rng, &s, &conversion),
        ConversionsOp::WordProblem                  => word_problem(rng, &s, &conversion),
        ConversionsOp::Comparison                   => comparison(rng, &s, &conversion),
        ConversionsOp::MultiStep                    => multi_step(rng, &s, &conversion),
    }
}

fn factor_hint(s: &Setup, c: &Conversion) -> String {
    format!(
        "1 {} = {} {}",
        unit_name(&c.from, 1.0),
        s.fmt(c.factor.value),
        unit_name(&c.to, c.factor.value),
    )
}

fn direct<R: Rng + ?Sized>(rng: &mut R, s: &Setup, op: ConversionsOp, c: &Conversion) -> QuestionBody {
    let value = s.value(rng, &c.from);
    let answer = value * c.factor.value;
    text_input(
        op,
        format!("Convert {} {} to {}.", s.fmt(value), unit_name(&c.from, value), unit_name(&c.to, answer)),
        s.fmt(answer),
    )
    .with_hint(factor_hint(s, c))
}

fn smaller_to_larger<R: Rng + ?Sized>(rng: &mut R, s: &Setup, op: ConversionsOp, c: &Conversion) -> QuestionBody {
    // Draw in the larger unit so the answer lands in its range exactly.
    let answer = s.value(rng, &c.to);
    let value = answer * c.scale();
    text_input(
        op,
        format!("Convert {} {} to {}.", s.fmt(value), unit_name(&c.from, value), unit_name(&c.to, answer)),
        s.fmt(answer),
    )
    .with_hint(format!(
        "Divide by {} to convert from {} to {}.",
        s.fmt(c.scale()),
        unit_name(&c.from, 2.0),
        unit_name(&c.to, 2.0),
    ))
}

fn imperial<R: Rng + ?Sized>(rng: &mut R, s: &Setup, c: &Conversion) -> QuestionBody {
    let value = s.value(rng, &c.from);
    let answer = value * c.factor.value;
    text_input(
        ConversionsOp::ImperialMetricConversion,
        format!(
            "Approximately how many {} are there in {} {}?",
            unit_name(&c.to, 2.0),
            s.fmt(value),
            unit_name(&c.from, value),
        ),
        s.fmt(answer),
    )
    .with_hint(format!(
        "1 {} is about {} {}",
        unit_name(&c.from, 1.0),
        s.fmt(c.factor.value),
        unit_name(&c.to, c.factor.value),
    ))
}

fn word_problem<R: Rng + ?Sized>(rng: &mut R, s: &Setup, c: &Conversion) -> QuestionBody {
    let value = s.value(rng, &c.from);
    let answer = value * c.factor.value;
    let contexts: &[&str] = match measure_of(&c.from) {
        Some(Measure::Length) => &[
            "A rope measures {v} {from}.",
            "The distance to the shop is {v} {from}.",
            "A garden path is {v} {from} long.",
        ],
        Some(Measure::Mass) => &[
            "A bag of flour weighs {v} {from}.",
            "A parcel has a mass of {v} {from}.",
            "A watermelon weighs {v} {from}.",
        ],
        Some(Measure::Capacity) => &[
            "A bottle holds {v} {from}.",
            "A jug contains {v} {from} of water.",
            "A bucket has a capacity of {v} {from}.",
        ],
        _ => &[
            "A film lasts {v} {from}.",
            "A journey takes {v} {from}.",
            "A football match lasts {v} {from}.",
        ],
    };
    let context = fill(
        pick(rng, contexts),
        &[("v", s.fmt(value)), ("from", unit_name(&c.from, value).to_string())],
    );
    text_input(
        ConversionsOp::WordProblem,
        format!("{context} How many {} is this?", unit_name(&c.to, 2.0)),
        s.fmt(answer),
    )
    .with_hint(factor_hint(s, c))
}

fn comparison<R: Rng + ?Sized>(rng: &mut R, s: &Setup, c: &Conversion) -> QuestionBody {
    let value = s.value(rng, &c.from);
    let equal = value * c.factor.value;
    // Scaled versions of the equal amount, sometimes the equal amount itself.
    let mult = [0.5, 0.8, 1.0, 1.2, 1.5].choose(rng).copied().unwrap_or(1.0);
    let other: f64 = if mult == 1.0 { equal } else { (equal * mult).round().max(1.0) };

    let first = format!("{} {}", s.fmt(value), unit_name(&c.from, value));
    let second = format!("{} {}", s.fmt(other), unit_name(&c.to, other));
    let same = "They are equal".to_string();
    let answer = if (other - equal).abs() < 1e-9 {
        same.clone()
    } else if equal > other {
        first.clone()
    } else {
        second.clone()
    };

    multiple_choice(
        rng,
        ConversionsOp::Comparison,
        format!("Which is greater: {first} or {second}?"),
        answer,
        vec![first.clone(), second.clone(), same],
    )
    .with_hint(factor_hint(s, c))
}

fn multi_step<R: Rng + ?Sized>(rng: &mut R, s: &Setup, c: &Conversion) -> QuestionBody {
    let value = s.value(rng, &c.from);
    let total = value * c.factor.value;
    let cut = uniform(rng, 1, (total.floor() as i64 - 1).max(1)) as f64;
    let left = total - cut;

    let template = match measure_of(&c.from) {
        Some(Measure::Length)   => "A ribbon is {v} {from} long. {name} cuts off {cut} {to_cut}. How many {to} of ribbon are left?",
        Some(Measure::Mass)     => "A bag holds {v} {from} of flour. {name} uses {cut} {to_cut}. How many {to} are left?",
        Some(Measure::Capacity) => "A jug holds {v} {from} of juice. {name} pours out {cut} {to_cut}. How many {to} are left?",
        _                       => "{name} has {v} {from} to finish a project and has used {cut} {to_cut}. How many {to} are left?",
    };
    let text = fill(
        template,
        &[
            ("name", name(rng)),
            ("v", s.fmt(value)),
            ("from", unit_name(&c.from, value).to_string()),
            ("cut", s.fmt(cut)),
            ("to_cut", unit_name(&c.to, cut).to_string()),
            ("to", unit_name(&c.to, 2.0).to_string()),
        ],
    );
    text_input(ConversionsOp::MultiStep, text, s.fmt(left))
        .with_hint(format!("Convert to {} first, then subtract.", unit_name(&c.to, 2.0)))
}
