//! Consecutive-correct streak tracking and the level-up power-up.
//!
//! ```text
//!   Idle(0) --correct--> Streaking(1) --correct--> Streaking(2) --correct--> PowerUpAvailable(3+)
//!      ^                                                                          |
//!      +------------------ incorrect (any state) / power-up consumed -------------+
//! ```

use serde::{Deserialize, Serialize};

/// Consecutive correct answers needed to unlock a power-up.
pub const REQUIRED_STREAK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPhase {
    Idle,
    Streaking,
    PowerUpAvailable,
}

/// Payload of a streak-changed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub streak: u32,
    pub power_up_available: bool,
    /// The power-up became available on this answer.
    pub just_unlocked: bool,
    /// An available power-up was forfeited by this (incorrect) answer.
    pub lost_power_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakStatus {
    pub current_streak: u32,
    pub required_streak: u32,
    pub power_up_available: bool,
    /// Fraction of the way to the next power-up, capped at 1.
    pub progress: f64,
    pub total_correct: u32,
    pub total_incorrect: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakTracker {
    current_streak: u32,
    power_up_available: bool,
    total_correct: u32,
    total_incorrect: u32,
}

impl StreakTracker {
    pub fn new() -> Self {
        StreakTracker::default()
    }

    pub fn record_answer(&mut self, is_correct: bool) -> StreakUpdate {
        if is_correct {
            self.current_streak += 1;
            self.total_correct += 1;

            let just_unlocked = self.current_streak >= REQUIRED_STREAK && !self.power_up_available;
            if just_unlocked {
                self.power_up_available = true;
            }
            StreakUpdate {
                streak: self.current_streak,
                power_up_available: self.power_up_available,
                just_unlocked,
                lost_power_up: false,
            }
        } else {
            let lost_power_up = self.power_up_available;
            self.reset();
            self.total_incorrect += 1;
            StreakUpdate { streak: 0, power_up_available: false, just_unlocked: false, lost_power_up }
        }
    }

    /// Spend the power-up. Returns `false` (and changes nothing) when none was
    /// available. On success the streak restarts from zero.
    pub fn consume_power_up(&mut self) -> bool {
        if !self.power_up_available {
            return false;
        }
        self.reset();
        true
    }

    /// Clear the streak and any power-up, keeping session totals.
    pub fn reset(&mut self) {
        self.current_streak = 0;
        self.power_up_available = false;
    }

    /// Clear everything, including session totals.
    pub fn reset_session(&mut self) {
        *self = StreakTracker::default();
    }

    pub fn phase(&self) -> StreakPhase {
        match (self.power_up_available, self.current_streak) {
            (true, _) => StreakPhase::PowerUpAvailable,
            (false, 0) => StreakPhase::Idle,
            (false, _) => StreakPhase::Streaking,
        }
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn power_up_available(&self) -> bool {
        self.power_up_available
    }

    /// Two or more in a row.
    pub fn is_hot_streak(&self) -> bool {
        self.current_streak >= 2
    }

    pub fn status(&self) -> StreakStatus {
        StreakStatus {
            current_streak: self.current_streak,
            required_streak: REQUIRED_STREAK,
            power_up_available: self.power_up_available,
            progress: (self.current_streak as f64 / REQUIRED_STREAK as f64).min(1.0),
            total_correct: self.total_correct,
            total_incorrect: self.total_incorrect,
        }
    }
}
