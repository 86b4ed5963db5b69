//! Per-module mastery counters and completion records.
//!
//! A level counts as mastered after [`MASTERY_THRESHOLD`] correct answers at
//! that level (not necessarily consecutive, and across sessions). A module is
//! completed once all four levels are mastered. Completion is sticky: no later
//! answer clears it, only an explicit [`ProgressBook::reset_module`] or
//! [`ProgressBook::clear`].
//!
//! The book serialises to one JSON record per module id, ready for whatever
//! storage layer the caller uses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::practice_engine::models::{Level, Topic};

/// Correct answers needed at one level for it to count as mastered.
pub const MASTERY_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgressRecord {
    /// Correct answers per level, index 0 = level 1.
    pub level_correct: [u32; 4],
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ModuleProgressRecord {
    pub fn correct_at(&self, level: Level) -> u32 {
        self.level_correct[level.index()]
    }

    pub fn is_level_complete(&self, level: Level) -> bool {
        self.correct_at(level) >= MASTERY_THRESHOLD
    }

    /// Every level mastered (independent of the `completed` flag).
    pub fn all_levels_complete(&self) -> bool {
        Level::ALL.iter().all(|&l| self.is_level_complete(l))
    }

    pub fn total_correct(&self) -> u32 {
        self.level_correct.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub level_complete: [bool; 4],
    pub all_levels_complete: bool,
    pub marked_complete: bool,
    pub total_correct: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    modules: BTreeMap<Topic, ModuleProgressRecord>,
}

impl ProgressBook {
    pub fn new() -> Self {
        ProgressBook::default()
    }

    /// Count one correct answer. Returns `true` when this answer completed
    /// the module.
    pub fn record_correct(&mut self, topic: Topic, level: Level) -> bool {
        self.record_correct_at(topic, level, Utc::now())
    }

    pub fn record_correct_at(&mut self, topic: Topic, level: Level, now: DateTime<Utc>) -> bool {
        let record = self.modules.entry(topic).or_default();
        record.level_correct[level.index()] += 1;
        if record.all_levels_complete() {
            self.mark_complete_at(topic, now)
        } else {
            false
        }
    }

    /// Snapshot of a module's record (all zeros when never practised).
    pub fn progress(&self, topic: Topic) -> ModuleProgressRecord {
        self.modules.get(&topic).cloned().unwrap_or_default()
    }

    pub fn is_level_complete(&self, topic: Topic, level: Level) -> bool {
        self.modules.get(&topic).is_some_and(|r| r.is_level_complete(level))
    }

    /// All four levels mastered.
    pub fn is_module_complete(&self, topic: Topic) -> bool {
        self.modules.get(&topic).is_some_and(ModuleProgressRecord::all_levels_complete)
    }

    /// The module carries the sticky `completed` flag.
    pub fn is_marked_complete(&self, topic: Topic) -> bool {
        self.modules.get(&topic).is_some_and(|r| r.completed)
    }

    /// Set the completed flag. Idempotent: the first completion time is kept
    /// and `false` is returned when the module was already complete.
    pub fn mark_complete(&mut self, topic: Topic) -> bool {
        self.mark_complete_at(topic, Utc::now())
    }

    pub fn mark_complete_at(&mut self, topic: Topic, at: DateTime<Utc>) -> bool {
        let record = self.modules.entry(topic).or_default();
        if record.completed {
            return false;
        }
        record.completed = true;
        record.completed_at = Some(at);
        info!("module {} completed", topic.id());
        true
    }

    /// Completed modules.
    pub fn completed_modules(&self) -> Vec<Topic> {
        self.modules.iter().filter(|(_, r)| r.completed).map(|(&t, _)| t).collect()
    }

    pub fn stats(&self, topic: Topic) -> ModuleStats {
        let record = self.progress(topic);
        ModuleStats {
            level_complete: Level::ALL.map(|l| record.is_level_complete(l)),
            all_levels_complete: record.all_levels_complete(),
            marked_complete: record.completed,
            total_correct: record.total_correct(),
            completed_at: record.completed_at,
        }
    }

    pub fn reset_module(&mut self, topic: Topic) {
        self.modules.remove(&topic);
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
