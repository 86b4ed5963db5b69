//! Core practice engine: question generation, answer checking, streaks,
//! mastery and navigation between curriculum modules.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | Shared types: topics, levels, questions, generation requests |
//! | `errors`    | Error enums for curriculum loading, unit lookup and parsing |
//! | `params`    | JSON-backed parameter sets and the per-topic, per-level curriculum |
//! | `units`     | Exact and approximate unit factors, forward and reciprocal |
//! | `sampler`   | Constrained random sampling plus digit, carry and factor arithmetic |
//! | `helpers`   | Question builders, option shuffling, number formatting |
//! | `topics`    | 12 topic generators, one per curriculum module |
//! | `generator` | Entry points `generate_batch()` / `generate()` with dedup and history |
//! | `validator` | Answer normalisation and tolerant numeric comparison |
//! | `streak`    | Consecutive-correct tracking and the level-up power-up |
//! | `progress`  | Per-module mastery counts and completion |
//! | `history`   | Recently-seen questions with a cooldown |
//! | `navigator` | Prerequisites, difficulty ratings, recovery and progression |
//! | `performance` | Rolling accuracy, struggle indicators, confidence and interventions |
//! | `session`   | One batch in flight: submit answers, accept power-ups, emit events |

pub mod errors;
pub mod generator;
pub mod helpers;
pub mod history;
pub mod models;
pub mod navigator;
pub mod params;
pub mod performance;
pub mod progress;
pub mod sampler;
pub mod session;
pub mod streak;
pub mod topics;
pub mod units;
pub mod validator;

// Re-export the public API surface so callers can use
// `practice_engine::generate` without reaching into sub-modules.
pub use errors::{ConversionError, CurriculumError, ParseLevelError, ParseTopicError};
pub use generator::{generate, generate_batch, generate_operation, generate_questions, generate_questions_with};
pub use history::QuestionHistory;
pub use models::{GenerationRequest, Level, Question, QuestionKind, Topic};
pub use navigator::{check_prerequisites, difficulty_rating, progression_path, recovery_path, suggest_alternative};
pub use params::{Curriculum, ParameterSet};
pub use performance::{check_for_intervention, Intervention, InterventionKind, PerformanceTracker};
pub use progress::{ProgressBook, MASTERY_THRESHOLD};
pub use session::{PracticeSession, ProgressEvent, ProgressObserver, Submission};
pub use streak::{StreakTracker, StreakUpdate, REQUIRED_STREAK};
pub use validator::{validate, validate_parts, ValidationResult};
