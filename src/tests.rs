//! Crate-level tests for `maths_drill_gen`.
//!
//! Included from `lib.rs` under `#[cfg(test)]`. Per-module behaviour is tested
//! next to each module; these sweep every topic and level through the public
//! entry points.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Determinism | Same seed → identical batch; different seeds → varied questions |
//! | Structural | ID prefixes, stamped module/level, answers validate, options contain the answer |
//! | Curriculum | Every enabled operation produces its own tag |
//! | Validation | Tolerance boundary, multi-part answers, feedback on wrong answers |
//! | Sessions | Streak → power-up → level up; completion is sticky |
//! | Navigation | Immediate prerequisites, recovery paths, progression order |

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;

use crate::practice_engine::{
    generator::{builtin_curriculum, generate_batch},
    navigator::{check_prerequisites, progression_path, recovery_path, RecoveryStrategy},
    topics::conversions::ConversionsOp,
};
use crate::{
    generate, generate_operation, generate_questions, validate, validate_parts, GenerationRequest, Level,
    ParameterSet, PracticeSession, ProgressBook, ProgressEvent, QuestionHistory, Topic,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn req(topic: Topic, level: Level, seed: u64) -> GenerationRequest {
    GenerationRequest::new(topic).level(level).count(8).seed(seed)
}

/// Five seeds that span different RNG states.
const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn same_seed_produces_identical_batch() {
    for topic in Topic::ALL {
        for level in Level::ALL {
            let a = generate_questions(req(topic, level, 12345));
            let b = generate_questions(req(topic, level, 12345));
            assert_eq!(a, b, "batch mismatch for {topic:?} {level:?}");
        }
    }
}

#[test]
fn different_seeds_produce_varied_questions() {
    let mut same_count = 0usize;
    let pairs = 40u64;
    for seed in 0..pairs {
        let a = generate_questions(req(Topic::WrittenMethods, Level::Meeting, seed));
        let b = generate_questions(req(Topic::WrittenMethods, Level::Meeting, seed + 500));
        if a[0].text == b[0].text {
            same_count += 1;
        }
    }
    assert!(
        same_count < pairs as usize / 4,
        "Too many identical questions across different seeds ({same_count}/{pairs})"
    );
}

#[test]
fn entropy_seed_produces_a_valid_batch() {
    let batch = generate_questions(GenerationRequest::new(Topic::Fractions).count(3));
    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|q| !q.text.is_empty() && !q.answer.is_empty()));
}

// ── structural invariants ─────────────────────────────────────────────────────

#[test]
fn every_question_is_stamped_and_answerable() {
    for topic in Topic::ALL {
        for level in Level::ALL {
            for seed in SEEDS {
                for q in generate_questions(req(topic, level, seed)) {
                    let ctx = format!("{topic:?} {level:?} seed={seed} {:?}", q.text);
                    assert!(q.id.starts_with(&format!("{}-", topic.id_prefix())), "{ctx}: id {}", q.id);
                    assert_eq!(q.module_id, topic, "{ctx}");
                    assert_eq!(q.level, level, "{ctx}");
                    assert!(!q.text.is_empty(), "{ctx}: empty text");
                    assert!(!q.answer.is_empty(), "{ctx}: empty answer");
                    assert!(validate(&q, &q.answer).is_correct, "{ctx}: answer {:?} fails", q.answer);
                }
            }
        }
    }
}

#[test]
fn multiple_choice_options_are_unique_and_contain_the_answer() {
    for topic in Topic::ALL {
        for level in Level::ALL {
            for seed in SEEDS {
                for q in generate_questions(req(topic, level, seed)).into_iter().filter(|q| q.is_multiple_choice()) {
                    let ctx = format!("{topic:?} {level:?} seed={seed} {:?}", q.text);
                    assert!(q.options.contains(&q.answer), "{ctx}: {:?} not in {:?}", q.answer, q.options);
                    assert!((2..=4).contains(&q.options.len()), "{ctx}: {} options", q.options.len());
                    let unique: HashSet<&String> = q.options.iter().collect();
                    assert_eq!(unique.len(), q.options.len(), "{ctx}: duplicate options {:?}", q.options);
                }
            }
        }
    }
}

#[test]
fn multi_part_answers_join_their_parts() {
    for topic in Topic::ALL {
        for seed in SEEDS {
            for q in generate_questions(req(topic, Level::Exceeding, seed)) {
                if let Some(parts) = &q.answers {
                    assert_eq!(q.answer, parts.join(","), "{topic:?} seed={seed}");
                    assert!(validate_parts(&q, parts).is_correct);
                }
            }
        }
    }
}

#[test]
fn batches_never_repeat_a_question() {
    for topic in Topic::ALL {
        let batch = generate_questions(req(topic, Level::Meeting, 42));
        let texts: HashSet<&str> = batch.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts.len(), batch.len(), "{topic:?} repeated a question");
    }
}

// ── curriculum ────────────────────────────────────────────────────────────────

#[test]
fn every_enabled_operation_produces_its_own_tag() {
    let curriculum = builtin_curriculum();
    for topic in Topic::ALL {
        for level in Level::ALL {
            let params = curriculum.parameters(topic, level).unwrap();
            for op in params.operations() {
                let mut rng = StdRng::seed_from_u64(3);
                let q = generate_operation(&mut rng, topic, op, params, level);
                assert_eq!(q.operation, op, "{topic:?} {level:?}");
            }
        }
    }
}

#[test]
fn bundled_conversions_go_both_ways() {
    let curriculum = builtin_curriculum();
    for level in [Level::Developing, Level::Meeting, Level::Exceeding] {
        let params = curriculum.parameters(Topic::Conversions, level).unwrap();
        for seed in SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = generate_operation(&mut rng, Topic::Conversions, "metric_conversion_smaller_to_larger", params, level);
            assert_eq!(q.operation, "metric_conversion_smaller_to_larger", "{level:?} seed {seed}");
            assert!(validate(&q, &q.answer).is_correct);
        }
    }
}

#[test]
fn two_and_a_half_kilometres() {
    let params = ParameterSet::from_value(json!({
        "conversions": { "length": ["km_to_m"] },
        "ranges": { "km": [2.5, 2.5] },
        "value_types": ["decimal_1dp"]
    }));
    let mut rng = StdRng::seed_from_u64(10);
    let q = generate_operation(&mut rng, Topic::Conversions, "metric_conversion_larger_to_smaller", &params, Level::Meeting);
    assert_eq!(q.operation, "metric_conversion_larger_to_smaller");
    assert_eq!(q.answer, "2500");
    assert!(validate(&q, "2500").is_correct);
    assert!(validate(&q, " 2500.00 ").is_correct);
    assert!(!validate(&q, "250").is_correct);
}

#[test]
fn conversions_with_no_units_fall_back_to_km() {
    let mut rng = StdRng::seed_from_u64(4);
    let op = serde_json::to_value(ConversionsOp::ImperialMetricConversion).unwrap();
    let q = generate_operation(&mut rng, Topic::Conversions, op.as_str().unwrap(), &ParameterSet::default(), Level::Meeting);
    assert_eq!(q.operation, "metric_conversion_larger_to_smaller");
    assert!(q.text.contains("kilometre"), "{}", q.text);
}

#[test]
fn string_entry_point_is_total() {
    assert!(generate("long_division", 1, 5).is_empty());
    assert!(generate("", 1, 5).is_empty());
    let clamped = generate("time", -3, 2);
    assert_eq!(clamped.len(), 2);
    assert!(clamped.iter().all(|q| q.level == Level::Beginning));
}

#[test]
fn history_keeps_recent_questions_out_of_the_next_batch() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap();
    let mut history = QuestionHistory::new();
    let mut rng = StdRng::seed_from_u64(8);
    let curriculum = builtin_curriculum();
    let first = generate_batch(&mut rng, curriculum, Topic::Factors, Level::Meeting, 5, Some(&mut history), now);
    let second = generate_batch(&mut rng, curriculum, Topic::Factors, Level::Meeting, 5, Some(&mut history), now);
    let seen: HashSet<&str> = first.iter().map(|q| q.text.as_str()).collect();
    assert!(second.iter().all(|q| !seen.contains(q.text.as_str())));
    assert_eq!(history.len(), 10);
}

// ── validation ────────────────────────────────────────────────────────────────

#[test]
fn tolerance_is_one_hundredth() {
    let mut rng = StdRng::seed_from_u64(2);
    let params = ParameterSet::from_value(json!({ "hours": [2, 2] }));
    let q = generate_operation(&mut rng, Topic::Time, "hours_to_minutes", &params, Level::Beginning);
    assert_eq!(q.answer, "120");
    assert!(validate(&q, "120.01").is_correct);
    assert!(!validate(&q, "120.02").is_correct);
}

#[test]
fn wrong_answers_report_the_correct_one() {
    let q = &generate_questions(req(Topic::Money, Level::Developing, 5))[0];
    let r = validate(q, "not a number");
    assert!(!r.is_correct);
    assert_eq!(r.correct_answer.as_deref(), Some(q.answer.as_str()));
    assert!(r.feedback.contains(&q.answer));
}

// ── sessions ──────────────────────────────────────────────────────────────────

#[test]
fn streak_of_three_at_level_two_levels_up_to_three() {
    let mut book = ProgressBook::new();
    let mut session = PracticeSession::new(Topic::WrittenMethods, Level::Developing, 10, Some(42));

    let mut unlocked = false;
    for _ in 0..3 {
        let answer = session.current().unwrap().answer.clone();
        let sub = session.submit(&mut book, &answer).unwrap();
        unlocked = matches!(sub.events[0], ProgressEvent::StreakChanged(u) if u.just_unlocked);
    }
    assert!(unlocked, "third correct answer should unlock the power-up");

    let event = session.accept_power_up().unwrap();
    assert!(matches!(event, ProgressEvent::LevelUp { new_level: Level::Meeting, .. }));
    assert_eq!(session.current().unwrap().level, Level::Meeting);
    assert_eq!(session.streak().current_streak(), 0);
}

#[test]
fn completion_is_sticky() {
    let mut book = ProgressBook::new();
    for level in Level::ALL {
        for _ in 0..3 {
            book.record_correct(Topic::Rounding, level);
        }
    }
    assert!(book.is_marked_complete(Topic::Rounding));
    assert!(!book.record_correct(Topic::Rounding, Level::Beginning), "completion fires once");
    assert!(!book.mark_complete(Topic::Rounding));
    assert!(book.is_marked_complete(Topic::Rounding));
    assert_eq!(book.completed_modules(), vec![Topic::Rounding]);
}

// ── navigation ────────────────────────────────────────────────────────────────

#[test]
fn multiply_needs_bonds_once_counting_is_done() {
    let mut book = ProgressBook::new();
    book.mark_complete(Topic::Counting);
    let check = check_prerequisites(&book, Topic::Multiplication);
    assert!(!check.ready);
    assert_eq!(check.missing, vec![Topic::NumberBonds]);
}

#[test]
fn prerequisites_are_checked_one_step_deep() {
    let mut book = ProgressBook::new();
    let check = check_prerequisites(&book, Topic::Factors);
    assert!(!check.ready);
    assert_eq!(check.missing, vec![Topic::Multiplication]);

    // Multiplication's own prerequisites stay incomplete.
    book.mark_complete(Topic::Multiplication);
    let check = check_prerequisites(&book, Topic::Factors);
    assert!(check.ready);
    assert!(check.missing.is_empty());
}

#[test]
fn recovery_steps_down_then_back_to_prerequisites() {
    let down = recovery_path(Topic::Fractions, Level::Meeting);
    assert_eq!(down.strategy, RecoveryStrategy::StepDown);
    assert_eq!(down.suggestions[0].module, Topic::Fractions);
    assert_eq!(down.suggestions[0].level, Level::Developing);

    let back = recovery_path(Topic::NumberBonds, Level::Beginning);
    assert_eq!(back.strategy, RecoveryStrategy::Prerequisite);
    assert_eq!(back.suggestions[0].module, Topic::Counting);
    assert_eq!(back.suggestions[0].level, Level::Beginning);

    let stuck = recovery_path(Topic::Counting, Level::Beginning);
    assert_eq!(stuck.strategy, RecoveryStrategy::Persist);
    assert!(!stuck.has_path());
}

#[test]
fn progression_starts_with_counting() {
    let mut book = ProgressBook::new();
    assert_eq!(progression_path(&book).module, Some(Topic::Counting));
    book.mark_complete(Topic::Counting);
    assert_eq!(progression_path(&book).module, Some(Topic::PlaceValue));
}
