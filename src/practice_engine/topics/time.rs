//! Time: hours and minutes, durations between clock times, days and weeks.
//!
//! Parameters: `hours` (`[min, max]` whole hours), `minute_step` (minutes
//! are multiples of this, default 15), `max_duration` (longest duration in
//! minutes), `weeks` (`[min, max]`).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    helpers::{fill, name, pick, pick_operation, text_input, Operation, QuestionBody},
    models::Level,
    params::ParameterSet,
    sampler::uniform,
    units::resolve_factor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOp {
    HoursToMinutes,
    MinutesToHours,
    Duration,
    DaysAndWeeks,
}

impl Operation for TimeOp {
    const FALLBACK: Self = TimeOp::HoursToMinutes;
}

struct Setup {
    hours: (i64, i64),
    minute_step: i64,
    max_duration: i64,
    weeks: (i64, i64),
    minutes_per_hour: i64,
    days_per_week: i64,
}

/// Whole-number factor from the resolver; the time table is exact.
fn whole_factor(from: &str, to: &str, default: i64) -> i64 {
    resolve_factor(from, to).map(|f| f.round() as i64).unwrap_or(default)
}

fn setup(params: &ParameterSet, level: Level) -> Setup {
    let step = params.int("minute_step").unwrap_or(match level {
        Level::Beginning  => 30,
        Level::Developing => 15,
        _                 => 5,
    });
    Setup {
        hours: params.int_range("hours").unwrap_or((1, 2 + level.number() as i64)),
        minute_step: step.clamp(1, 30),
        max_duration: params.int("max_duration").unwrap_or(60 * level.number() as i64).max(30),
        weeks: params.int_range("weeks").unwrap_or((2, 4 + 2 * level.number() as i64)),
        minutes_per_hour: whole_factor("hours", "minutes", 60),
        days_per_week: whole_factor("weeks", "days", 7),
    }
}

impl Setup {
    /// Minutes past the hour: a multiple of the step, never zero.
    fn minutes<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        uniform(rng, 1, (self.minutes_per_hour - 1) / self.minute_step) * self.minute_step
    }
}

/// 24-hour clock time, e.g. `09:05`.
pub fn clock(total_minutes: i64) -> String {
    let t = total_minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", t / 60, t % 60)
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &ParameterSet, level: Level) -> QuestionBody {
    let s = setup(params, level);
    match pick_operation::<TimeOp, _>(rng, params) {
        TimeOp::HoursToMinutes => hours_to_minutes(rng, &s, level),
        TimeOp::MinutesToHours => minutes_to_hours(rng, &s),
        TimeOp::Duration       => duration(rng, &s),
        TimeOp::DaysAndWeeks   => days_and_weeks(rng, &s),
    }
}

fn hours_to_minutes<R: Rng + ?Sized>(rng: &mut R, s: &Setup, level: Level) -> QuestionBody {
    let h = uniform(rng, s.hours.0.max(1), s.hours.1.max(1));
    let hour_word = if h == 1 { "hour" } else { "hours" };
    if level >= Level::Meeting {
        let m = s.minutes(rng);
        text_input(
            TimeOp::HoursToMinutes,
            format!("How many minutes are there in {h} {hour_word} {m} minutes?"),
            (h * s.minutes_per_hour + m).to_string(),
        )
        .with_hint(format!("Change the hours to minutes, then add {m}."))
    } else {
        text_input(
            TimeOp::HoursToMinutes,
            format!("How many minutes are there in {h} {hour_word}?"),
            (h * s.minutes_per_hour).to_string(),
        )
        .with_hint(format!("1 hour = {} minutes", s.minutes_per_hour))
    }
}

fn minutes_to_hours<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let h = uniform(rng, s.hours.0.max(1), s.hours.1.max(1));
    let m = s.minutes(rng);
    let total = h * s.minutes_per_hour + m;
    text_input(
        TimeOp::MinutesToHours,
        format!("Write {total} minutes in hours and minutes.\n___ hours ___ minutes"),
        "",
    )
    .with_parts(vec![h.to_string(), m.to_string()])
    .with_hint(format!("How many groups of {} fit into {total}?", s.minutes_per_hour))
}

fn duration<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let step = s.minute_step;
    // Start between 08:00 and 18:00, on the step.
    let start = uniform(rng, 8 * 60 / step, 18 * 60 / step) * step;
    let length = uniform(rng, 1, s.max_duration / step) * step;
    let end = start + length;

    let template = pick(
        rng,
        &[
            "A film starts at {start} and finishes at {end}. How many minutes long is the film?",
            "{name} gets on a train at {start} and gets off at {end}. How many minutes is the journey?",
            "Swimming club runs from {start} to {end}. How many minutes does it last?",
        ],
    );
    let text = fill(template, &[("name", name(rng)), ("start", clock(start)), ("end", clock(end))]);
    text_input(TimeOp::Duration, text, length.to_string())
        .with_hint("Count on to the next hour, then on to the end time.")
}

fn days_and_weeks<R: Rng + ?Sized>(rng: &mut R, s: &Setup) -> QuestionBody {
    let weeks = uniform(rng, s.weeks.0.max(1), s.weeks.1.max(1));
    let days = weeks * s.days_per_week;
    if rng.gen_bool(0.5) {
        text_input(TimeOp::DaysAndWeeks, format!("How many days are there in {weeks} weeks?"), days.to_string())
            .with_hint(format!("There are {} days in a week.", s.days_per_week))
    } else {
        text_input(TimeOp::DaysAndWeeks, format!("How many weeks are there in {days} days?"), weeks.to_string())
            .with_hint(format!("Divide by {}.", s.days_per_week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn only(op: &str) -> ParameterSet {
        ParameterSet::from_value(json!({ "operations": [op] }))
    }

    fn minutes_of(clock_text: &str) -> i64 {
        let (h, m) = clock_text.split_once(':').unwrap();
        h.parse::<i64>().unwrap() * 60 + m.parse::<i64>().unwrap()
    }

    #[test]
    fn clock_pads_and_wraps() {
        assert_eq!(clock(9 * 60 + 5), "09:05");
        assert_eq!(clock(24 * 60 + 30), "00:30");
    }

    #[test]
    fn minutes_to_hours_splits_correctly() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("minutes_to_hours"), Level::Meeting);
            let total: i64 = q.text.split_whitespace().nth(1).unwrap().parse().unwrap();
            let parts: Vec<i64> = q.answers.unwrap().iter().map(|p| p.parse().unwrap()).collect();
            assert_eq!(parts[0] * 60 + parts[1], total, "seed={seed}");
            assert!(parts[1] > 0 && parts[1] < 60);
        }
    }

    #[test]
    fn durations_match_the_clock_times() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("duration"), Level::Developing);
            let times: Vec<&str> = q.text.split_whitespace().filter(|t| t.contains(':')).collect();
            let (start, end) = (minutes_of(times[0].trim_end_matches('.')), minutes_of(times[1].trim_end_matches('.')));
            assert_eq!(q.answer, (end - start).to_string(), "seed={seed} {}", q.text);
        }
    }

    #[test]
    fn hours_to_minutes_uses_sixty() {
        let params = only("hours_to_minutes").with("hours", json!([3, 3]));
        let mut rng = StdRng::seed_from_u64(1);
        let q = generate(&mut rng, &params, Level::Beginning);
        assert_eq!(q.answer, "180");
    }

    #[test]
    fn weeks_and_days_agree() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate(&mut rng, &only("days_and_weeks"), Level::Developing);
            let n: i64 = q.text.split_whitespace().find_map(|t| t.parse().ok()).unwrap();
            let a: i64 = q.answer.parse().unwrap();
            assert!(n * 7 == a || a * 7 == n, "seed={seed} {}", q.text);
        }
    }
}
