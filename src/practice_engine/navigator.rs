//! Cross-module difficulty map and prerequisite graph.
//!
//! Ratings are hand-authored on a 1-10 scale and non-decreasing in level
//! within each module. Prerequisites form a DAG whose edges always point to
//! modules earlier in [`Topic::ALL`], so walking that order visits
//! prerequisites first.
//!
//! Prerequisite checks look at *immediate* prerequisites only. With a chain
//! counting → bonds → multiply, completing bonds is enough for multiply even if
//! counting is incomplete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    models::{Level, Topic},
    progress::ProgressBook,
};

/// Rating used for module ids the table does not know.
pub const DEFAULT_RATING: u8 = 5;

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

fn ratings(topic: Topic) -> [u8; 4] {
    match topic {
        Topic::Counting       => [2, 4, 5, 7],
        Topic::NumberBonds    => [3, 5, 6, 8],
        Topic::Multiplication => [4, 6, 7, 9],
        Topic::Fractions      => [5, 7, 8, 9],
        Topic::PlaceValue     => [2, 3, 5, 6],
        Topic::WrittenMethods => [3, 5, 6, 8],
        Topic::Conversions    => [5, 6, 7, 9],
        Topic::Factors        => [5, 6, 8, 9],
        Topic::Rounding       => [3, 4, 6, 7],
        Topic::Money          => [2, 4, 5, 7],
        Topic::Negatives      => [4, 5, 7, 8],
        Topic::Time           => [3, 5, 6, 8],
    }
}

/// Immediate prerequisites, easiest first.
pub fn prerequisites(topic: Topic) -> &'static [Topic] {
    use Topic::*;
    match topic {
        Counting       => &[],
        PlaceValue     => &[Counting],
        NumberBonds    => &[Counting],
        Negatives      => &[Counting, PlaceValue],
        Rounding       => &[PlaceValue],
        WrittenMethods => &[NumberBonds, PlaceValue],
        Money          => &[NumberBonds, PlaceValue],
        Multiplication => &[Counting, NumberBonds],
        Time           => &[Counting, Multiplication],
        Factors        => &[Multiplication],
        Fractions      => &[Counting, NumberBonds, Multiplication],
        Conversions    => &[Multiplication, PlaceValue],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillConnection {
    pub related: &'static [Topic],
    pub reason: &'static str,
}

/// Modules that share skills with `topic`, for lateral suggestions.
pub fn skill_connections(topic: Topic) -> SkillConnection {
    use Topic::*;
    let (related, reason): (&'static [Topic], &'static str) = match topic {
        Counting       => (&[NumberBonds, PlaceValue], "Number patterns help with number relationships"),
        NumberBonds    => (&[Counting, Multiplication], "Number bonds are the foundation for multiplication"),
        Multiplication => (&[NumberBonds, Factors], "Multiplication is repeated addition"),
        Fractions      => (&[NumberBonds, Multiplication], "Fractions involve division and part-whole relationships"),
        PlaceValue     => (&[Rounding, WrittenMethods], "Column values underpin rounding and written methods"),
        WrittenMethods => (&[NumberBonds, PlaceValue], "Column methods rely on bonds and place value"),
        Conversions    => (&[Multiplication, Time], "Converting units means multiplying by powers of ten"),
        Factors        => (&[Multiplication, Fractions], "Factors come straight from the times tables"),
        Rounding       => (&[PlaceValue, Money], "Rounding depends on reading each digit's value"),
        Money          => (&[NumberBonds, Conversions], "Pounds and pence are a hundred-to-one conversion"),
        Negatives      => (&[Counting, PlaceValue], "Counting through zero extends the number line"),
        Time           => (&[Conversions, Multiplication], "Time uses sixty and twenty-four instead of ten"),
    };
    SkillConnection { related, reason }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

pub fn difficulty_rating(topic: Topic, level: Level) -> u8 {
    ratings(topic)[level.index()]
}

/// Rating by module id; unknown modules rate [`DEFAULT_RATING`].
pub fn difficulty_rating_by_id(module_id: &str, level: Level) -> u8 {
    module_id
        .parse::<Topic>()
        .map(|t| difficulty_rating(t, level))
        .unwrap_or(DEFAULT_RATING)
}

pub fn difficulty_label(rating: u8) -> &'static str {
    match rating {
        0..=2 => "Very Easy",
        3..=4 => "Easy",
        5..=6 => "Moderate",
        7..=8 => "Hard",
        _     => "Very Hard",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyCell {
    pub difficulty: u8,
    pub label: &'static str,
}

/// Every module's four ratings with labels.
pub fn difficulty_map() -> BTreeMap<Topic, [DifficultyCell; 4]> {
    Topic::ALL
        .into_iter()
        .map(|t| {
            let cells = Level::ALL.map(|l| {
                let difficulty = difficulty_rating(t, l);
                DifficultyCell { difficulty, label: difficulty_label(difficulty) }
            });
            (t, cells)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Equivalents and recovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equivalent {
    pub module: Topic,
    pub level: Level,
    pub difficulty: u8,
    /// `difficulty` minus the source rating.
    pub difference: i8,
}

/// Other modules' levels rated within `tolerance` of (topic, level), closest
/// first. Ties keep curriculum order; callers should not rely on it.
pub fn find_equivalents(topic: Topic, level: Level, tolerance: u8) -> Vec<Equivalent> {
    let source = difficulty_rating(topic, level) as i8;
    let mut out: Vec<Equivalent> = Topic::ALL
        .into_iter()
        .filter(|&t| t != topic)
        .flat_map(|t| Level::ALL.map(|l| (t, l)))
        .filter_map(|(t, l)| {
            let difficulty = difficulty_rating(t, l);
            let difference = difficulty as i8 - source;
            (difference.unsigned_abs() <= tolerance).then_some(Equivalent { module: t, level: l, difficulty, difference })
        })
        .collect();
    out.sort_by_key(|e| e.difference.unsigned_abs());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// Practise a prerequisite module first.
    Prerequisite,
    /// Drop one level in the same module.
    StepDown,
    /// Nothing easier exists; keep practising.
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub module: Topic,
    pub level: Level,
    pub difficulty: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPath {
    pub module: Topic,
    pub level: Level,
    pub strategy: RecoveryStrategy,
    /// Best suggestion first. Empty for [`RecoveryStrategy::Persist`].
    pub suggestions: Vec<Suggestion>,
    pub message: String,
}

impl RecoveryPath {
    pub fn has_path(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// Where to go when a learner is struggling at (topic, level).
pub fn recovery_path(topic: Topic, level: Level) -> RecoveryPath {
    if let Some(below) = level.prev() {
        return RecoveryPath {
            module: topic,
            level,
            strategy: RecoveryStrategy::StepDown,
            suggestions: vec![Suggestion {
                module: topic,
                level: below,
                difficulty: difficulty_rating(topic, below),
                reason: "Strengthen skills at easier level".to_string(),
            }],
            message: format!("Try Level {} in this module first", below.number()),
        };
    }

    let prereqs = prerequisites(topic);
    match prereqs.first() {
        Some(first) => RecoveryPath {
            module: topic,
            level,
            strategy: RecoveryStrategy::Prerequisite,
            suggestions: prereqs
                .iter()
                .map(|&p| Suggestion {
                    module: p,
                    level: Level::Beginning,
                    difficulty: difficulty_rating(p, Level::Beginning),
                    reason: format!("Build foundational {} skills first", p.id()),
                })
                .collect(),
            message: format!("Try building foundational skills in {} first", first.id()),
        },
        None => RecoveryPath {
            module: topic,
            level,
            strategy: RecoveryStrategy::Persist,
            suggestions: Vec::new(),
            message: "Keep practicing at this level".to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteCheck {
    pub ready: bool,
    pub missing: Vec<Topic>,
    pub message: String,
}

/// Are the immediate prerequisites of `topic` marked complete?
pub fn check_prerequisites(progress: &ProgressBook, topic: Topic) -> PrerequisiteCheck {
    let prereqs = prerequisites(topic);
    if prereqs.is_empty() {
        return PrerequisiteCheck { ready: true, missing: Vec::new(), message: "No prerequisites required".to_string() };
    }

    let missing: Vec<Topic> = prereqs.iter().copied().filter(|&p| !progress.is_marked_complete(p)).collect();
    let message = if missing.is_empty() {
        "Prerequisites completed".to_string()
    } else {
        let ids: Vec<&str> = missing.iter().map(|t| t.id()).collect();
        format!("Consider completing {} first", ids.join(", "))
    };
    PrerequisiteCheck { ready: missing.is_empty(), missing, message }
}

// ---------------------------------------------------------------------------
// Alternatives and progression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeReason {
    Struggling,
    Bored,
    Variety,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    Recovery,
    StepDown,
    Lateral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub kind: AlternativeKind,
    pub module: Topic,
    pub level: Level,
    pub reason: String,
    pub message: String,
    pub original_module: Topic,
    pub original_level: Level,
}

/// Something else to practise, or `None` when there is nothing to suggest.
///
/// Struggling learners get the recovery path; bored ones (or those asking for
/// variety) get the closest-rated level of another module.
pub fn suggest_alternative(topic: Topic, level: Level, reason: AlternativeReason) -> Option<Alternative> {
    match reason {
        AlternativeReason::Struggling => {
            let path = recovery_path(topic, level);
            let top = path.suggestions.first()?;
            let kind = match path.strategy {
                RecoveryStrategy::StepDown => AlternativeKind::StepDown,
                _                          => AlternativeKind::Recovery,
            };
            Some(Alternative {
                kind,
                module: top.module,
                level: top.level,
                reason: top.reason.clone(),
                message: path.message.clone(),
                original_module: topic,
                original_level: level,
            })
        }
        AlternativeReason::Bored | AlternativeReason::Variety => {
            let best = find_equivalents(topic, level, 1).into_iter().next()?;
            Some(Alternative {
                kind: AlternativeKind::Lateral,
                module: best.module,
                level: best.level,
                reason: "Try a different type of challenge".to_string(),
                message: format!("You might enjoy {} at Level {}", best.module, best.level.number()),
                original_module: topic,
                original_level: level,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionStep {
    /// `None` once every module is complete.
    pub module: Option<Topic>,
    pub reason: String,
    pub message: String,
    pub prerequisites: Vec<Topic>,
}

/// The next module to practise, walking the curriculum order.
pub fn progression_path(progress: &ProgressBook) -> ProgressionStep {
    let Some(next) = Topic::ALL.into_iter().find(|&t| !progress.is_marked_complete(t)) else {
        return ProgressionStep {
            module: None,
            reason: "All modules completed".to_string(),
            message: "Congratulations! All modules completed. Try harder levels!".to_string(),
            prerequisites: Vec::new(),
        };
    };

    let check = check_prerequisites(progress, next);
    match check.missing.first() {
        None => ProgressionStep {
            module: Some(next),
            reason: "Next in curriculum progression".to_string(),
            message: format!("Ready to practice {}", next.id()),
            prerequisites: prerequisites(next).to_vec(),
        },
        Some(&blocker) => ProgressionStep {
            module: Some(blocker),
            reason: format!("Prerequisite for {}", next.id()),
            message: format!("Complete {} before {}", blocker.id(), next.id()),
            prerequisites: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ratings_are_monotone_and_in_range() {
        for topic in Topic::ALL {
            let r = ratings(topic);
            assert!(r.windows(2).all(|w| w[0] <= w[1]), "{topic:?} ratings decrease");
            assert!(r.iter().all(|&v| (1..=10).contains(&v)));
        }
    }

    #[test]
    fn prerequisites_precede_in_curriculum_order() {
        let pos = |t: Topic| Topic::ALL.iter().position(|&x| x == t).unwrap();
        for topic in Topic::ALL {
            for &p in prerequisites(topic) {
                assert!(pos(p) < pos(topic), "{p:?} must come before {topic:?}");
            }
        }
    }

    #[test]
    fn unknown_module_rates_default() {
        assert_eq!(difficulty_rating_by_id("algebra", Level::Meeting), DEFAULT_RATING);
        assert_eq!(difficulty_rating_by_id("bonds", Level::Meeting), 6);
    }

    #[test]
    fn labels_follow_bands() {
        assert_eq!(difficulty_label(2), "Very Easy");
        assert_eq!(difficulty_label(4), "Easy");
        assert_eq!(difficulty_label(6), "Moderate");
        assert_eq!(difficulty_label(8), "Hard");
        assert_eq!(difficulty_label(10), "Very Hard");
        assert_eq!(difficulty_map()[&Topic::Fractions][3].label, "Very Hard");
    }

    #[test]
    fn equivalents_sorted_by_closeness_and_exclude_self() {
        let eq = find_equivalents(Topic::Multiplication, Level::Developing, 1);
        assert!(!eq.is_empty());
        assert!(eq.iter().all(|e| e.module != Topic::Multiplication));
        assert!(eq.iter().all(|e| e.difference.unsigned_abs() <= 1));
        assert!(eq.windows(2).all(|w| w[0].difference.unsigned_abs() <= w[1].difference.unsigned_abs()));
        assert_eq!(eq[0].difference, 0);
    }

    #[test]
    fn recovery_paths() {
        let p = recovery_path(Topic::Fractions, Level::Beginning);
        assert_eq!(p.strategy, RecoveryStrategy::Prerequisite);
        assert_eq!(p.suggestions[0].module, Topic::Counting);
        assert_eq!(p.suggestions[0].level, Level::Beginning);

        let p = recovery_path(Topic::Fractions, Level::Meeting);
        assert_eq!(p.strategy, RecoveryStrategy::StepDown);
        assert_eq!(p.suggestions[0].level, Level::Developing);

        let p = recovery_path(Topic::Counting, Level::Beginning);
        assert_eq!(p.strategy, RecoveryStrategy::Persist);
        assert!(!p.has_path());
    }

    #[test]
    fn prerequisite_check_is_not_transitive() {
        let mut book = ProgressBook::new();
        book.mark_complete(Topic::Counting);
        let check = check_prerequisites(&book, Topic::Multiplication);
        assert!(!check.ready);
        assert_eq!(check.missing, vec![Topic::NumberBonds]);

        // Factors only lists multiply; counting/bonds being incomplete is fine.
        let mut book = ProgressBook::new();
        book.mark_complete(Topic::Multiplication);
        assert!(check_prerequisites(&book, Topic::Factors).ready);
    }

    #[test]
    fn alternatives() {
        assert_eq!(suggest_alternative(Topic::Counting, Level::Beginning, AlternativeReason::Struggling), None);

        let alt = suggest_alternative(Topic::Time, Level::Meeting, AlternativeReason::Struggling).unwrap();
        assert_eq!((alt.kind, alt.module, alt.level), (AlternativeKind::StepDown, Topic::Time, Level::Developing));

        let alt = suggest_alternative(Topic::Time, Level::Meeting, AlternativeReason::Bored).unwrap();
        assert_eq!(alt.kind, AlternativeKind::Lateral);
        assert_ne!(alt.module, Topic::Time);
        assert_eq!(difficulty_rating(alt.module, alt.level), 6);
    }

    #[test]
    fn progression_walks_curriculum_order() {
        let mut book = ProgressBook::new();
        assert_eq!(progression_path(&book).module, Some(Topic::Counting));

        book.mark_complete(Topic::Counting);
        assert_eq!(progression_path(&book).module, Some(Topic::PlaceValue));

        for t in Topic::ALL {
            book.mark_complete(t);
        }
        assert_eq!(progression_path(&book).module, None);
    }
}
