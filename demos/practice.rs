//! Walk-through of every topic plus one simulated practice session.
//!
//! Run with: `cargo run --example practice`
//! (set `RUST_LOG=debug` to see sampler and fallback logging).
//!
//! 1. **All 12 topics**: one question per topic at every level, with fixed
//!    seeds so the output is reproducible.
//! 2. **A session**: a learner answers a multiplication batch, gets one
//!    wrong, builds a streak, and spends the power-up on a level up. Events
//!    are printed by a `ProgressObserver`; checkpoint suggestions are
//!    declined.

use maths_drill_gen::{
    generate_questions, GenerationRequest, Intervention, Level, PracticeSession, ProgressBook, ProgressObserver,
    Question, Topic,
};
use maths_drill_gen::practice_engine::{
    navigator::{difficulty_label, difficulty_rating, progression_path},
    streak::StreakUpdate,
};

fn print_question(q: &Question) {
    println!("  [{}] {}  ({})", q.id, q.operation, difficulty_label(difficulty_rating(q.module_id, q.level)));
    for line in q.text.lines() {
        println!("      {line}");
    }
    if q.is_multiple_choice() {
        for opt in &q.options {
            let marker = if *opt == q.answer { "✓" } else { " " };
            println!("      {marker} {opt}");
        }
    } else {
        println!("      = {}", q.answer);
    }
    if let Some(hint) = &q.hint {
        println!("      hint: {hint}");
    }
}

struct Printer;

impl ProgressObserver for Printer {
    fn on_streak_changed(&mut self, update: &StreakUpdate) {
        if update.just_unlocked {
            println!("      ⚡ power-up unlocked (streak {})", update.streak);
        } else if update.lost_power_up {
            println!("      power-up lost");
        }
    }

    fn on_level_up(&mut self, module_id: Topic, old_level: Level, new_level: Level) {
        println!("      ▲ {module_id}: level {old_level} → {new_level}");
    }

    fn on_module_completed(&mut self, module_id: Topic) {
        println!("      ★ {module_id} complete");
    }

    fn on_level_down(&mut self, module_id: Topic, old_level: Level, new_level: Level) {
        println!("      ▼ {module_id}: level {old_level} → {new_level}");
    }

    fn on_intervention_suggested(&mut self, intervention: &Intervention) {
        println!(
            "      ? {} (confidence {}): {}",
            intervention.title, intervention.confidence.score, intervention.message
        );
    }
}

fn main() {
    env_logger::init();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  All topics");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (i, topic) in Topic::ALL.into_iter().enumerate() {
        println!();
        println!("{topic}");
        for level in Level::ALL {
            let request = GenerationRequest::new(topic).level(level).count(1).seed(100 + i as u64);
            for q in generate_questions(request) {
                print_question(&q);
            }
        }
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Session: multiply, level 1");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let mut book = ProgressBook::new();
    let mut session = PracticeSession::new(Topic::Multiplication, Level::Beginning, 8, Some(2024));
    let mut printer = Printer;

    while let Some(q) = session.current() {
        let q = q.clone();
        // Second question answered wrongly on purpose.
        let answer = if session.position() == 1 { "0".to_string() } else { q.answer.clone() };
        print_question(&q);
        println!("      learner: {answer}");

        let Some(submission) = session.submit(&mut book, &answer) else { break };
        println!("      {}", submission.result.feedback);
        submission.dispatch(&mut printer);

        if session.pending_intervention().is_some() {
            // The learner prefers to stay where they are.
            session.respond_to_intervention(false);
        }
        if session.streak().power_up_available() {
            if let Some(event) = session.accept_power_up() {
                event.dispatch(&mut printer);
            }
        }
    }

    let stats = book.stats(Topic::Multiplication);
    println!();
    println!("  correct answers: {}  levels complete: {:?}", stats.total_correct, stats.level_complete);
    println!("  next up: {}", progression_path(&book).message);
}
