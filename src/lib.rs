//! # maths_drill_gen
//!
//! An offline, deterministic practice-question generator for primary
//! mathematics.
//!
//! For a curriculum module (counting, number bonds, written methods, unit
//! conversion, ...) and a difficulty level from 1 to 4, the engine produces
//! randomised questions with one canonical answer. It also tracks the
//! learner: streaks unlock level-up power-ups, three correct answers at each
//! level complete a module, and the navigator suggests where to go next.
//! Every fifth answer the session checks the learner's confidence and may
//! suggest an easier or harder level.
//!
//! ## How it works
//!
//! 1. Pick a [`Topic`] and [`Level`] and build a [`GenerationRequest`].
//! 2. Call [`generate_questions`]. The engine looks up the level's
//!    [`ParameterSet`] in the bundled curriculum, picks one of its enabled
//!    operations, and draws operands that satisfy the operation's
//!    constraints (carry / no carry, non-zero digits, enough factor pairs).
//! 3. Check answers with [`validate`]. Whitespace and case are normalised;
//!    numbers compare within a tolerance, part by part for multi-part answers.
//! 4. Or let a [`PracticeSession`] do steps 2-3 and report [`ProgressEvent`]s
//!    for the UI to react to.
//!
//! ## Key features
//!
//! - **Deterministic**: a seeded request reproduces the exact batch.
//! - **Fail-soft**: missing curriculum fields fall back to topic defaults; an
//!   unknown module id yields an empty batch rather than an error.
//! - **No repeats**: a batch never repeats a question text, and an optional
//!   [`QuestionHistory`] keeps recently-seen questions out of new batches.
//!
//! ## Quick start
//!
//! ```rust
//! use maths_drill_gen::{generate_questions, validate, GenerationRequest, Level, Topic};
//!
//! let batch = generate_questions(
//!     GenerationRequest::new(Topic::WrittenMethods).level(Level::Meeting).count(5).seed(42),
//! );
//! for q in &batch {
//!     println!("{}: {}", q.id, q.text);
//!     assert!(validate(q, &q.answer).is_correct);
//! }
//!
//! // String-keyed entry point for UI callers; unknown ids give an empty batch.
//! let rounding = maths_drill_gen::generate("rounding", 2, 3);
//! assert_eq!(rounding.len(), 3);
//! ```
//!
//! A session with streaks and mastery:
//!
//! ```rust
//! use maths_drill_gen::{Level, PracticeSession, ProgressBook, Topic};
//!
//! let mut book = ProgressBook::new();
//! let mut session = PracticeSession::new(Topic::Multiplication, Level::Beginning, 5, Some(7));
//! while let Some(q) = session.current() {
//!     let answer = q.answer.clone();
//!     let submission = session.submit(&mut book, &answer).unwrap();
//!     assert!(submission.result.is_correct);
//!     if session.streak().power_up_available() {
//!         session.accept_power_up();
//!     }
//! }
//! assert!(book.is_level_complete(Topic::Multiplication, Level::Beginning));
//! ```

pub mod practice_engine;

// Convenience re-exports so callers can use `maths_drill_gen::generate`
// directly without reaching into `practice_engine::`.
pub use practice_engine::{
    generate, generate_batch, generate_operation, generate_questions, generate_questions_with,
    validate, validate_parts, Curriculum, CurriculumError, GenerationRequest, Intervention, Level,
    ParameterSet, PerformanceTracker, PracticeSession, ProgressBook, ProgressEvent, ProgressObserver, Question, QuestionHistory,
    QuestionKind, StreakTracker, Submission, Topic, ValidationResult,
};

#[cfg(test)]
mod tests;
