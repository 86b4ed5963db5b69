//! Cross-batch repetition guard.
//!
//! Remembers when each question was last served (by fingerprint) so batch
//! generation can avoid repeating a question within the cooldown window.
//! The history is plain serde data; persisting it is up to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::practice_engine::models::{Level, Question, Topic};

pub const DEFAULT_COOLDOWN_HOURS: i64 = 24;
/// Longest cooldown honoured, about a century. Larger requests are capped.
pub const MAX_COOLDOWN_HOURS: i64 = 1_000_000;

/// `module|level|text`, lowercased with whitespace runs replaced by `_`.
pub fn fingerprint(topic: Topic, level: Level, text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase();
    format!("{}|{}|{}", topic.id(), level.number(), text)
}

pub fn question_fingerprint(q: &Question) -> String {
    fingerprint(q.module_id, q.level, &q.text)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_tracked: usize,
    pub cooldown_hours: i64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionHistory {
    cooldown_hours: i64,
    seen: BTreeMap<String, DateTime<Utc>>,
}

impl Default for QuestionHistory {
    fn default() -> Self {
        QuestionHistory { cooldown_hours: DEFAULT_COOLDOWN_HOURS, seen: BTreeMap::new() }
    }
}

impl QuestionHistory {
    pub fn new() -> Self {
        QuestionHistory::default()
    }

    pub fn with_cooldown_hours(hours: i64) -> Self {
        QuestionHistory { cooldown_hours: hours.clamp(0, MAX_COOLDOWN_HOURS), seen: BTreeMap::new() }
    }

    fn cooldown(&self) -> Duration {
        // A deserialized history may carry any value.
        Duration::hours(self.cooldown_hours.clamp(0, MAX_COOLDOWN_HOURS))
    }

    pub fn cooldown_hours(&self) -> i64 {
        self.cooldown_hours
    }

    /// Change the window and drop anything now outside it.
    pub fn set_cooldown_hours(&mut self, hours: i64, now: DateTime<Utc>) {
        self.cooldown_hours = hours.clamp(0, MAX_COOLDOWN_HOURS);
        self.cleanup(now);
    }

    /// Seen within the cooldown window. Expired entries are forgotten.
    pub fn has_seen_recently(&mut self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        match self.seen.get(fingerprint) {
            Some(&at) if now - at <= self.cooldown() => true,
            Some(_) => {
                self.seen.remove(fingerprint);
                false
            }
            None => false,
        }
    }

    pub fn mark_seen(&mut self, fingerprint: impl Into<String>, now: DateTime<Utc>) {
        self.seen.insert(fingerprint.into(), now);
    }

    pub fn mark_question(&mut self, q: &Question, now: DateTime<Utc>) {
        self.mark_seen(question_fingerprint(q), now);
    }

    /// Drop expired entries; returns how many were removed.
    pub fn cleanup(&mut self, now: DateTime<Utc>) -> usize {
        let cooldown = self.cooldown();
        let before = self.seen.len();
        self.seen.retain(|_, &mut at| now - at <= cooldown);
        before - self.seen.len()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total_tracked: self.seen.len(),
            cooldown_hours: self.cooldown_hours,
            oldest_entry: self.seen.values().min().copied(),
            newest_entry: self.seen.values().max().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn fingerprint_normalises_text() {
        assert_eq!(
            fingerprint(Topic::Money, Level::Developing, "What is  £1.50\nin pence?"),
            "money|2|what_is_£1.50_in_pence?"
        );
    }

    #[test]
    fn cooldown_expires() {
        let mut h = QuestionHistory::new();
        h.mark_seen("a", t0());
        assert!(h.has_seen_recently("a", t0() + Duration::hours(23)));
        assert!(!h.has_seen_recently("a", t0() + Duration::hours(25)));
        assert!(h.is_empty());
    }

    #[test]
    fn huge_cooldowns_are_capped() {
        let mut h = QuestionHistory::with_cooldown_hours(i64::MAX);
        assert_eq!(h.cooldown_hours(), MAX_COOLDOWN_HOURS);
        h.mark_seen("a", t0());
        assert!(h.has_seen_recently("a", t0() + Duration::days(365)));

        h.set_cooldown_hours(i64::MAX, t0());
        assert_eq!(h.cooldown_hours(), MAX_COOLDOWN_HOURS);
        h.set_cooldown_hours(i64::MIN, t0());
        assert_eq!(h.cooldown_hours(), 0);

        let mut restored: QuestionHistory =
            serde_json::from_value(serde_json::json!({ "cooldown_hours": i64::MAX, "seen": {} })).unwrap();
        restored.mark_seen("b", t0());
        assert_eq!(restored.cleanup(t0() + Duration::days(30)), 0);
    }

    #[test]
    fn cleanup_and_stats() {
        let mut h = QuestionHistory::with_cooldown_hours(1);
        h.mark_seen("old", t0());
        h.mark_seen("new", t0() + Duration::minutes(90));
        assert_eq!(h.stats().oldest_entry, Some(t0()));
        assert_eq!(h.cleanup(t0() + Duration::minutes(100)), 1);
        assert_eq!(h.len(), 1);
        assert_eq!(h.stats().newest_entry, Some(t0() + Duration::minutes(90)));
    }
}
