//! Generation entry points.
//!
//! Everything funnels into [`generate_batch`]: one injected RNG, one
//! curriculum, one topic and level. The convenience wrappers only decide
//! where the RNG and the curriculum come from.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use log::{error, warn};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde_json::json;

use crate::practice_engine::{
    helpers::QuestionBody,
    history::{fingerprint, QuestionHistory},
    models::{GenerationRequest, Level, Question, Topic},
    params::{Curriculum, ParameterSet},
    topics,
};

/// Attempts per requested question before the batch stops checking for
/// duplicates.
pub const BATCH_ATTEMPTS_PER_QUESTION: usize = 10;

/// Question id from topic prefix + 32 random bits, e.g. `"WM-1A2B3C4D"`.
pub fn make_question_id(topic: Topic, rng: &mut (impl RngCore + ?Sized)) -> String {
    format!("{}-{:08X}", topic.id_prefix(), rng.next_u32())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// The bundled curriculum, parsed once.
pub fn builtin_curriculum() -> &'static Curriculum {
    static BUILTIN: OnceLock<Curriculum> = OnceLock::new();
    BUILTIN.get_or_init(|| {
        Curriculum::builtin().unwrap_or_else(|err| {
            error!("bundled curriculum failed to load, generators will use defaults: {err}");
            Curriculum::default()
        })
    })
}

/// Core dispatch: routes to the correct topic module.
pub fn generate_body<R: Rng + ?Sized>(rng: &mut R, topic: Topic, params: &ParameterSet, level: Level) -> QuestionBody {
    match topic {
        Topic::Counting       => topics::counting::generate(rng, params, level),
        Topic::NumberBonds    => topics::bonds::generate(rng, params, level),
        Topic::Multiplication => topics::multiply::generate(rng, params, level),
        Topic::Fractions      => topics::fractions::generate(rng, params, level),
        Topic::PlaceValue     => topics::place_value::generate(rng, params, level),
        Topic::WrittenMethods => topics::written::generate(rng, params, level),
        Topic::Conversions    => topics::conversions::generate(rng, params, level),
        Topic::Factors        => topics::factors::generate(rng, params, level),
        Topic::Rounding       => topics::rounding::generate(rng, params, level),
        Topic::Money          => topics::money::generate(rng, params, level),
        Topic::Negatives      => topics::negatives::generate(rng, params, level),
        Topic::Time           => topics::time::generate(rng, params, level),
    }
}

/// One question for `topic` at `level` using the curriculum's parameter set.
/// A missing parameter set is not an error: the topic runs on its defaults.
pub fn generate_question<R: Rng + ?Sized>(
    rng: &mut R,
    curriculum: &Curriculum,
    topic: Topic,
    level: Level,
) -> Question {
    let empty = ParameterSet::default();
    let params = curriculum.parameters(topic, level).unwrap_or_else(|| {
        warn!("no parameters for {} level {}, using topic defaults", topic.id(), level.number());
        &empty
    });
    let body = generate_body(rng, topic, params, level);
    stamp(rng, topic, level, body)
}

/// One question for a specific operation tag, whatever the parameter set
/// enables. Unknown tags fall back like any other unusable operation list.
pub fn generate_operation<R: Rng + ?Sized>(
    rng: &mut R,
    topic: Topic,
    operation: &str,
    params: &ParameterSet,
    level: Level,
) -> Question {
    let params = params.clone().with("operations", json!([operation]));
    let body = generate_body(rng, topic, &params, level);
    stamp(rng, topic, level, body)
}

fn stamp<R: Rng + ?Sized>(rng: &mut R, topic: Topic, level: Level, body: QuestionBody) -> Question {
    Question {
        id: make_question_id(topic, rng),
        module_id: topic,
        level,
        operation: body.operation,
        text: body.text,
        kind: body.kind,
        answer: body.answer,
        options: body.options,
        answers: body.answers,
        hint: body.hint,
    }
}

/// `count` questions with no repeated text inside the batch and, when a
/// history is given, none seen within its cooldown.
///
/// Duplicate checking stops after `count * 10` attempts; any slots still
/// open are then filled unchecked so the batch always has `count` entries.
/// Accepted questions are recorded in the history at `now`.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    curriculum: &Curriculum,
    topic: Topic,
    level: Level,
    count: usize,
    mut history: Option<&mut QuestionHistory>,
    now: DateTime<Utc>,
) -> Vec<Question> {
    let mut batch: Vec<Question> = Vec::with_capacity(count);
    let mut texts: HashSet<String> = HashSet::with_capacity(count);
    let budget = count * BATCH_ATTEMPTS_PER_QUESTION;

    let mut attempts = 0;
    while batch.len() < count && attempts < budget {
        attempts += 1;
        let q = generate_question(rng, curriculum, topic, level);
        if texts.contains(&q.text) {
            continue;
        }
        if let Some(h) = history.as_deref_mut() {
            if h.has_seen_recently(&fingerprint(topic, level, &q.text), now) {
                continue;
            }
        }
        texts.insert(q.text.clone());
        batch.push(q);
    }

    if batch.len() < count {
        warn!(
            "{}: only {} unique questions after {attempts} attempts, filling {} more without dedup",
            topic.id(),
            batch.len(),
            count - batch.len(),
        );
        while batch.len() < count {
            batch.push(generate_question(rng, curriculum, topic, level));
        }
    }

    if let Some(h) = history {
        for q in &batch {
            h.mark_question(q, now);
        }
    }
    batch
}

/// Batch from the bundled curriculum. Seeded requests are reproducible.
pub fn generate_questions(request: GenerationRequest) -> Vec<Question> {
    generate_questions_with(builtin_curriculum(), request)
}

/// Batch from a caller-supplied curriculum.
pub fn generate_questions_with(curriculum: &Curriculum, request: GenerationRequest) -> Vec<Question> {
    let mut rng = make_rng(request.rng_seed);
    generate_batch(&mut rng, curriculum, request.topic, request.level, request.count, None, Utc::now())
}

/// String-keyed entry point for UI callers. Total: an unknown module id
/// yields an empty batch (logged), an out-of-range level is clamped to 1-4.
pub fn generate(module_id: &str, level: i64, count: usize) -> Vec<Question> {
    let topic: Topic = match module_id.parse() {
        Ok(topic) => topic,
        Err(err) => {
            warn!("{err}");
            return Vec::new();
        }
    };
    let request = GenerationRequest::new(topic).level(Level::clamped(level)).count(count);
    generate_questions(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn ids_carry_the_topic_prefix() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = make_question_id(Topic::PlaceValue, &mut rng);
        assert!(id.starts_with("PV-"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let req = GenerationRequest::new(Topic::WrittenMethods).level(Level::Meeting).count(5).seed(42);
        assert_eq!(generate_questions(req.clone()), generate_questions(req));
    }

    #[test]
    fn batches_have_unique_texts() {
        let req = GenerationRequest::new(Topic::Multiplication).level(Level::Meeting).count(10).seed(7);
        let batch = generate_questions(req);
        assert_eq!(batch.len(), 10);
        let texts: HashSet<&str> = batch.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts.len(), 10);
    }

    #[test]
    fn tiny_question_space_still_fills_the_batch() {
        // Only one possible question: every slot after the first is a top-up.
        let mut curriculum = Curriculum::default();
        curriculum.insert(
            Topic::Time,
            Level::Beginning,
            ParameterSet::from_value(json!({ "operations": ["hours_to_minutes"], "hours": [2, 2] })),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let batch = generate_batch(&mut rng, &curriculum, Topic::Time, Level::Beginning, 4, None, t0());
        assert_eq!(batch.len(), 4);
        assert!(batch.iter().all(|q| q.answer == "120"));
    }

    #[test]
    fn history_blocks_recent_repeats() {
        let mut curriculum = Curriculum::default();
        curriculum.insert(
            Topic::Multiplication,
            Level::Beginning,
            ParameterSet::from_value(json!({ "operations": ["times_table"], "tables": [2], "max_factor": 12 })),
        );
        let mut history = QuestionHistory::new();
        let mut rng = StdRng::seed_from_u64(5);
        let first = generate_batch(&mut rng, &curriculum, Topic::Multiplication, Level::Beginning, 3, Some(&mut history), t0());
        assert_eq!(history.len(), 3);

        let second = generate_batch(&mut rng, &curriculum, Topic::Multiplication, Level::Beginning, 3, Some(&mut history), t0());
        for q in &second {
            assert!(first.iter().all(|f| f.text != q.text), "repeated {}", q.text);
        }
    }

    #[test]
    fn missing_parameters_use_topic_defaults() {
        let mut rng = StdRng::seed_from_u64(9);
        let q = generate_question(&mut rng, &Curriculum::default(), Topic::Factors, Level::Meeting);
        assert_eq!(q.module_id, Topic::Factors);
        assert!(!q.answer.is_empty());
    }

    #[test]
    fn operation_entry_forces_the_tag() {
        let mut rng = StdRng::seed_from_u64(2);
        let q = generate_operation(&mut rng, Topic::Money, "coin_count", &ParameterSet::default(), Level::Developing);
        assert_eq!(q.operation, "coin_count");
        assert!(q.is_multiple_choice());
    }

    #[test]
    fn string_entry_is_total() {
        assert!(generate("algebra", 2, 5).is_empty());
        let batch = generate("rounding", 9, 3);
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|q| q.level == Level::Exceeding));
    }
}
