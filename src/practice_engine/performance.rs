//! In-session performance tracking and difficulty interventions.
//!
//! [`PerformanceTracker`] keeps running counts plus a rolling window of the
//! last [`ROLLING_WINDOW`] answers. Two readings come out of it:
//!
//! - [`PerformanceTracker::struggle_report`]: additive indicator score
//!   (low accuracy, error runs, slow answers, guessing, broken streaks).
//! - [`PerformanceTracker::confidence`]: weighted 0-100 score, banded from
//!   `Critical` to `Excelling`.
//!
//! At every [`CHECK_INTERVAL`]th answer [`check_for_intervention`] turns the
//! confidence band into an [`Intervention`]: step down, step up, or switch
//! module. Step-down and switch interventions carry a navigator alternative.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    models::{Level, Topic},
    navigator::{suggest_alternative, Alternative, AlternativeReason},
};

pub const ROLLING_WINDOW: usize = 5;
/// Answers needed before any assessment is made.
pub const MIN_ANSWERS: u32 = 5;
pub const CHECK_INTERVAL: u32 = 5;
/// Accepted interventions allowed per session; enough to climb 1 → 4.
pub const MAX_INTERVENTIONS: u32 = 4;

/// Percentage weights of the confidence factors. They sum to 100.
const WEIGHT_ACCURACY: u32 = 35;
const WEIGHT_RESPONSE_TIME: u32 = 15;
const WEIGHT_HINTS: u32 = 20;
const WEIGHT_CONSISTENCY: u32 = 15;
const WEIGHT_STREAK: u32 = 15;

/// Typical answer time for a level.
pub fn expected_response_ms(level: Level) -> u64 {
    match level {
        Level::Beginning  => 8_000,
        Level::Developing => 6_000,
        Level::Meeting    => 5_000,
        Level::Exceeding  => 4_000,
    }
}

/// Rounded percentage, halves away from zero.
fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct AnswerRecord {
    correct: bool,
    response_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceTracker {
    level: Level,
    total: u32,
    correct: u32,
    current_streak: u32,
    consecutive_errors: u32,
    streak_breaks: u32,
    slow_responses: u32,
    /// Wrong answers given in under half the expected time.
    fast_incorrect: u32,
    response_total_ms: u64,
    timed_answers: u32,
    window: VecDeque<AnswerRecord>,
}

impl PerformanceTracker {
    pub fn new(level: Level) -> Self {
        PerformanceTracker {
            level,
            total: 0,
            correct: 0,
            current_streak: 0,
            consecutive_errors: 0,
            streak_breaks: 0,
            slow_responses: 0,
            fast_incorrect: 0,
            response_total_ms: 0,
            timed_answers: 0,
            window: VecDeque::with_capacity(ROLLING_WINDOW),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Later answers are judged against the new level's expected time.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn record(&mut self, correct: bool, response: Option<Duration>) {
        let response_ms = response.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self.total += 1;

        if correct {
            self.correct += 1;
            self.current_streak += 1;
            self.consecutive_errors = 0;
        } else {
            if self.current_streak > 0 {
                self.streak_breaks += 1;
            }
            self.current_streak = 0;
            self.consecutive_errors += 1;
        }

        if let Some(ms) = response_ms {
            let expected = expected_response_ms(self.level);
            self.response_total_ms = self.response_total_ms.saturating_add(ms);
            self.timed_answers += 1;
            if ms.saturating_mul(2) > expected.saturating_mul(3) {
                self.slow_responses += 1;
            }
            if !correct && ms.saturating_mul(2) < expected {
                self.fast_incorrect += 1;
            }
        }

        if self.window.len() == ROLLING_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(AnswerRecord { correct, response_ms });
        debug!("answer {}: {} accuracy {}%", self.total, if correct { "correct" } else { "wrong" }, self.accuracy());
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn has_enough_data(&self) -> bool {
        self.total >= MIN_ANSWERS
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn streak_breaks(&self) -> u32 {
        self.streak_breaks
    }

    pub fn slow_responses(&self) -> u32 {
        self.slow_responses
    }

    pub fn fast_incorrect(&self) -> u32 {
        self.fast_incorrect
    }

    /// Whole-session accuracy, 0-100.
    pub fn accuracy(&self) -> u32 {
        percent(self.correct as u64, self.total as u64)
    }

    /// Accuracy over the rolling window, 0-100.
    pub fn rolling_accuracy(&self) -> u32 {
        let hits = self.window.iter().filter(|a| a.correct).count();
        percent(hits as u64, self.window.len() as u64)
    }

    /// 0 when no answer was timed.
    pub fn average_response_ms(&self) -> u64 {
        if self.timed_answers == 0 {
            return 0;
        }
        let n = self.timed_answers as u64;
        (self.response_total_ms + n / 2) / n
    }

    /// Mean over the timed answers in the window; 0 when none were timed.
    pub fn rolling_average_response_ms(&self) -> u64 {
        let times: Vec<u64> = self.window.iter().filter_map(|a| a.response_ms).collect();
        if times.is_empty() {
            return 0;
        }
        let n = times.len() as u64;
        let sum = times.iter().fold(0u64, |acc, t| acc.saturating_add(*t));
        (sum + n / 2) / n
    }

    pub fn struggle_report(&self) -> StruggleReport {
        if !self.has_enough_data() {
            return StruggleReport { struggling: false, score: 0, indicators: Vec::new(), confidence: ConfidenceLevel::InsufficientData };
        }

        let mut indicators = Vec::new();
        let mut score = 0;

        let rolling = self.rolling_accuracy();
        if rolling < 40 {
            indicators.push(StruggleIndicator::LowAccuracy(rolling));
            score += 3;
        } else if rolling < 60 {
            indicators.push(StruggleIndicator::BelowTargetAccuracy(rolling));
            score += 1;
        }

        if self.consecutive_errors >= 3 {
            indicators.push(StruggleIndicator::ErrorRun(self.consecutive_errors));
            score += 3;
        } else if self.consecutive_errors == 2 {
            indicators.push(StruggleIndicator::ErrorRun(self.consecutive_errors));
            score += 1;
        }

        let avg = self.rolling_average_response_ms();
        if avg.saturating_mul(2) > expected_response_ms(self.level).saturating_mul(3) {
            indicators.push(StruggleIndicator::SlowResponses(avg));
            score += 2;
        }

        // More than 30% of all answers were fast guesses.
        if self.fast_incorrect * 10 > self.total * 3 {
            indicators.push(StruggleIndicator::Guessing);
            score += 2;
        }

        if self.total >= 10 && self.streak_breaks >= 3 {
            indicators.push(StruggleIndicator::Inconsistent);
            score += 1;
        }

        StruggleReport { struggling: score >= 4, score, indicators, confidence: ConfidenceLevel::from_score(score) }
    }

    /// Weighted confidence, or `None` before [`MIN_ANSWERS`] answers.
    pub fn confidence(&self) -> Option<ConfidenceScore> {
        if !self.has_enough_data() {
            return None;
        }

        let accuracy = self.rolling_accuracy();

        let avg = self.rolling_average_response_ms();
        let expected = expected_response_ms(self.level);
        let response_time = match avg {
            0                                              => 50,
            t if t.saturating_mul(10) < expected * 7       => 90,
            t if t < expected                              => 75,
            t if t.saturating_mul(2) <= expected * 3       => 50,
            t if t <= expected * 2                         => 30,
            _                                              => 15,
        };

        // Hint usage is not recorded yet; full marks.
        let hints = 100;

        let break_rate = self.streak_breaks as f64 / self.total as f64;
        let consistency = if self.streak_breaks == 0 {
            100
        } else if break_rate < 0.2 {
            80
        } else if break_rate < 0.4 {
            60
        } else if break_rate < 0.6 {
            40
        } else {
            20
        };

        let streak = match (self.current_streak, self.consecutive_errors) {
            (s, _) if s >= 5 => 100,
            (s, _) if s >= 3 => 85,
            (2, _)           => 70,
            (1, _)           => 55,
            (_, e) if e >= 3 => 15,
            (_, 2)           => 30,
            _                => 50,
        };

        let weighted = accuracy * WEIGHT_ACCURACY
            + response_time * WEIGHT_RESPONSE_TIME
            + hints * WEIGHT_HINTS
            + consistency * WEIGHT_CONSISTENCY
            + streak * WEIGHT_STREAK;
        let score = (weighted + 50) / 100;

        Some(ConfidenceScore {
            score,
            band: ConfidenceBand::from_score(score),
            breakdown: ConfidenceBreakdown { accuracy, response_time, hints, consistency, streak },
        })
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StruggleIndicator {
    LowAccuracy(u32),
    BelowTargetAccuracy(u32),
    ErrorRun(u32),
    /// Rolling mean response time in milliseconds.
    SlowResponses(u64),
    Guessing,
    Inconsistent,
}

/// How comfortable the learner looks, from the struggle score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    InsufficientData,
    VeryLow,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl ConfidenceLevel {
    pub fn from_score(score: u32) -> ConfidenceLevel {
        match score {
            6..        => ConfidenceLevel::VeryLow,
            4..=5      => ConfidenceLevel::Low,
            2..=3      => ConfidenceLevel::Moderate,
            1          => ConfidenceLevel::Good,
            0          => ConfidenceLevel::Excellent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StruggleReport {
    pub struggling: bool,
    pub score: u32,
    pub indicators: Vec<StruggleIndicator>,
    pub confidence: ConfidenceLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Critical,
    Struggling,
    Challenging,
    Optimal,
    Excelling,
}

impl ConfidenceBand {
    pub fn from_score(score: u32) -> ConfidenceBand {
        match score {
            0..=29  => ConfidenceBand::Critical,
            30..=39 => ConfidenceBand::Struggling,
            40..=64 => ConfidenceBand::Challenging,
            65..=79 => ConfidenceBand::Optimal,
            _       => ConfidenceBand::Excelling,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfidenceBand::Critical    => "These questions are very tricky. Let's try something easier!",
            ConfidenceBand::Struggling  => "These questions are tough. Would you like to try an easier level?",
            ConfidenceBand::Challenging => "You're working hard! Keep going!",
            ConfidenceBand::Optimal     => "Great job! You're learning well at this level!",
            ConfidenceBand::Excelling   => "You're doing brilliantly! Ready for a bigger challenge?",
        }
    }
}

/// Per-factor scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub accuracy: u32,
    pub response_time: u32,
    pub hints: u32,
    pub consistency: u32,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub score: u32,
    pub band: ConfidenceBand,
    pub breakdown: ConfidenceBreakdown,
}

// ---------------------------------------------------------------------------
// Interventions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    Decrease,
    Increase,
    /// Struggling at level 1: nothing easier in this module.
    SwitchModule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub kind: InterventionKind,
    pub module_id: Topic,
    pub current_level: Level,
    /// `None` for [`InterventionKind::SwitchModule`].
    pub suggested_level: Option<Level>,
    /// 1-based answer count at which the check fired.
    pub triggered_at: u32,
    pub confidence: ConfidenceScore,
    pub title: String,
    pub message: String,
    /// Where the navigator would send a struggling learner.
    pub alternative: Option<Alternative>,
}

/// A learner's answer to an intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRecord {
    pub kind: InterventionKind,
    pub triggered_at: u32,
    pub accepted: bool,
    pub at: DateTime<Utc>,
}

/// Checkpoint decision after `question_number` answers. `accepted_so_far`
/// counts interventions already accepted in this session; declined ones may
/// be offered again at the next checkpoint.
pub fn check_for_intervention(
    tracker: &PerformanceTracker,
    topic: Topic,
    question_number: u32,
    accepted_so_far: u32,
) -> Option<Intervention> {
    if question_number == 0 || question_number % CHECK_INTERVAL != 0 {
        return None;
    }
    if accepted_so_far >= MAX_INTERVENTIONS {
        debug!("{}: intervention limit reached", topic.id());
        return None;
    }
    let confidence = tracker.confidence()?;
    let level = tracker.level();
    debug!("{}: checkpoint {} confidence {} ({:?})", topic.id(), question_number, confidence.score, confidence.band);

    let (kind, suggested_level, title, message) = match confidence.band {
        ConfidenceBand::Critical | ConfidenceBand::Struggling => match level.prev() {
            Some(below) => {
                let message = if confidence.band == ConfidenceBand::Critical {
                    "These questions are very challenging for you right now. Let's try an easier level where you can build your confidence!"
                } else {
                    "You're working really hard! Let's try an easier level to help you feel more confident."
                };
                (InterventionKind::Decrease, Some(below), "Let's Make It Easier", message)
            }
            None => (
                InterventionKind::SwitchModule,
                None,
                "Let's Try Something Different",
                "These questions are tricky. Would you like to try a different type of maths practice?",
            ),
        },
        ConfidenceBand::Excelling if level != Level::MAX => (
            InterventionKind::Increase,
            Some(level.next()),
            "Ready for a Challenge?",
            "You're doing brilliantly! These questions seem easy for you. Would you like to try a harder level?",
        ),
        _ => return None,
    };

    let alternative = match kind {
        InterventionKind::Increase => None,
        _                          => suggest_alternative(topic, level, AlternativeReason::Struggling),
    };

    Some(Intervention {
        kind,
        module_id: topic,
        current_level: level,
        suggested_level,
        triggered_at: question_number,
        confidence,
        title: title.to_string(),
        message: message.to_string(),
        alternative,
    })
}
