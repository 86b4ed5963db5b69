use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::practice_engine::errors::{ParseLevelError, ParseTopicError};

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// A curriculum topic module. The serde name is the module id used by the
/// curriculum tables, the progress book and the external UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Counting,
    #[serde(rename = "bonds")]
    NumberBonds,
    #[serde(rename = "multiply")]
    Multiplication,
    Fractions,
    PlaceValue,
    #[serde(rename = "written")]
    WrittenMethods,
    Conversions,
    Factors,
    Rounding,
    Money,
    Negatives,
    Time,
}

impl Topic {
    /// Every topic in curriculum order. Navigator scans follow this order.
    pub const ALL: [Topic; 12] = [
        Topic::Counting,
        Topic::PlaceValue,
        Topic::NumberBonds,
        Topic::Money,
        Topic::Rounding,
        Topic::WrittenMethods,
        Topic::Negatives,
        Topic::Multiplication,
        Topic::Time,
        Topic::Factors,
        Topic::Fractions,
        Topic::Conversions,
    ];

    /// Module id as it appears in curriculum tables and progress records.
    pub fn id(self) -> &'static str {
        match self {
            Topic::Counting       => "counting",
            Topic::NumberBonds    => "bonds",
            Topic::Multiplication => "multiply",
            Topic::Fractions      => "fractions",
            Topic::PlaceValue     => "place_value",
            Topic::WrittenMethods => "written",
            Topic::Conversions    => "conversions",
            Topic::Factors        => "factors",
            Topic::Rounding       => "rounding",
            Topic::Money          => "money",
            Topic::Negatives      => "negatives",
            Topic::Time           => "time",
        }
    }

    /// Short prefix for question ids (e.g. `"PV-1A2B3C4D"`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            Topic::Counting       => "CO",
            Topic::NumberBonds    => "NB",
            Topic::Multiplication => "MU",
            Topic::Fractions      => "FR",
            Topic::PlaceValue     => "PV",
            Topic::WrittenMethods => "WM",
            Topic::Conversions    => "CV",
            Topic::Factors        => "FA",
            Topic::Rounding       => "RO",
            Topic::Money          => "MO",
            Topic::Negatives      => "NE",
            Topic::Time           => "TI",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Topic::Counting       => "Counting",
            Topic::NumberBonds    => "Number Bonds",
            Topic::Multiplication => "Multiplication & Division",
            Topic::Fractions      => "Fractions",
            Topic::PlaceValue     => "Place Value",
            Topic::WrittenMethods => "Written Addition & Subtraction",
            Topic::Conversions    => "Unit Conversions",
            Topic::Factors        => "Factors, Multiples & Primes",
            Topic::Rounding       => "Rounding & Estimation",
            Topic::Money          => "Money",
            Topic::Negatives      => "Negative Numbers",
            Topic::Time           => "Time",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Topic {
    type Err = ParseTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| ParseTopicError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Difficulty level within a topic, 1 (Beginning) to 4 (Exceeding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    Beginning,
    Developing,
    Meeting,
    Exceeding,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Beginning, Level::Developing, Level::Meeting, Level::Exceeding];
    pub const MAX: Level = Level::Exceeding;

    pub fn number(self) -> u8 {
        match self {
            Level::Beginning  => 1,
            Level::Developing => 2,
            Level::Meeting    => 3,
            Level::Exceeding  => 4,
        }
    }

    /// Zero-based index into per-level arrays.
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub fn from_number(n: u8) -> Option<Level> {
        match n {
            1 => Some(Level::Beginning),
            2 => Some(Level::Developing),
            3 => Some(Level::Meeting),
            4 => Some(Level::Exceeding),
            _ => None,
        }
    }

    /// Clamp any integer into 1..=4. Used by the total entry points.
    pub fn clamped(n: i64) -> Level {
        Level::from_number(n.clamp(1, 4) as u8).unwrap_or(Level::Beginning)
    }

    /// One level up, saturating at [`Level::MAX`].
    pub fn next(self) -> Level {
        Level::from_number(self.number() + 1).unwrap_or(Level::MAX)
    }

    /// One level down, or `None` at level 1.
    pub fn prev(self) -> Option<Level> {
        Level::from_number(self.number() - 1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Beginning  => write!(f, "Level 1 (Beginning)"),
            Level::Developing => write!(f, "Level 2 (Developing)"),
            Level::Meeting    => write!(f, "Level 3 (Meeting)"),
            Level::Exceeding  => write!(f, "Level 4 (Exceeding)"),
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = ParseLevelError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Level::from_number(n).ok_or(ParseLevelError(n as i64))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.number()
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TextInput,
}

/// One generated practice question. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub module_id: Topic,
    pub level: Level,
    /// Operation tag that produced this question (e.g. `"addition_with_carry"`).
    /// Stable across seeds; useful for per-operation progress tracking.
    pub operation: String,
    /// May contain literal line breaks and inline markup for columns/scales.
    pub text: String,
    pub kind: QuestionKind,
    /// Canonical answer. Multi-part answers are comma-joined.
    pub answer: String,
    /// Multiple-choice options; always contains `answer` for choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Structured parts of a multi-part answer, for UIs with several boxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        self.kind == QuestionKind::MultipleChoice
    }
}

// ---------------------------------------------------------------------------
// Generation request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: Topic,
    pub level: Level,
    pub count: usize,
    /// `Some(seed)` reproduces the exact same batch; `None` draws from entropy.
    pub rng_seed: Option<u64>,
}

impl GenerationRequest {
    /// Ten questions at level 1 from entropy.
    pub fn new(topic: Topic) -> Self {
        GenerationRequest { topic, level: Level::Beginning, count: 10, rng_seed: None }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_ids_round_trip_through_from_str() {
        for topic in Topic::ALL {
            assert_eq!(topic.id().parse::<Topic>().ok(), Some(topic));
        }
        assert!("algebra".parse::<Topic>().is_err());
    }

    #[test]
    fn topic_serde_name_matches_module_id() {
        for topic in Topic::ALL {
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.id()));
        }
    }

    #[test]
    fn level_steps_saturate() {
        assert_eq!(Level::Meeting.next(), Level::Exceeding);
        assert_eq!(Level::Exceeding.next(), Level::Exceeding);
        assert_eq!(Level::Beginning.prev(), None);
        assert_eq!(Level::Developing.prev(), Some(Level::Beginning));
        assert_eq!(Level::clamped(0), Level::Beginning);
        assert_eq!(Level::clamped(9), Level::Exceeding);
    }

    #[test]
    fn level_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Level::Meeting).unwrap(), "3");
        let parsed: Level = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Level::Developing);
        assert!(serde_json::from_str::<Level>("5").is_err());
    }
}
