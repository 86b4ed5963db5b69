//! One practice session: a batch in flight, the streak, and the events a UI
//! reacts to.
//!
//! `PracticeSession` owns everything that changes while a learner works
//! through a batch. Mastery lives in the caller's [`ProgressBook`] because it
//! outlives the session; it is passed into [`PracticeSession::submit`].
//!
//! Call order is strict: `submit` answers [`PracticeSession::current`] and
//! advances the cursor; `accept_power_up` only touches questions not yet
//! shown.
//!
//! Every fifth answer is a checkpoint. If the learner's confidence is far
//! off, the submission carries an `InterventionSuggested` event and the
//! intervention waits for [`PracticeSession::respond_to_intervention`].

use std::time::Duration;

use chrono::Utc;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::practice_engine::{
    generator::{builtin_curriculum, generate_batch},
    models::{Level, Question, Topic},
    params::Curriculum,
    performance::{check_for_intervention, Intervention, InterventionKind, InterventionRecord, PerformanceTracker},
    progress::ProgressBook,
    streak::{StreakTracker, StreakUpdate},
    validator::{validate, ValidationResult},
};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    StreakChanged(StreakUpdate),
    LevelUp { module_id: Topic, old_level: Level, new_level: Level },
    /// An accepted step-down intervention.
    LevelDown { module_id: Topic, old_level: Level, new_level: Level },
    ModuleCompleted { module_id: Topic },
    /// A fresh power-up at the top level of a completed module. There is no
    /// level above, so the UI offers to end the batch instead.
    FinishEarlyOffered { module_id: Topic },
    InterventionSuggested(Intervention),
}

/// UI hook for progress events. Every method defaults to a no-op.
pub trait ProgressObserver {
    fn on_streak_changed(&mut self, _update: &StreakUpdate) {}
    fn on_level_up(&mut self, _module_id: Topic, _old_level: Level, _new_level: Level) {}
    fn on_module_completed(&mut self, _module_id: Topic) {}
    fn on_finish_early_offered(&mut self, _module_id: Topic) {}
    fn on_level_down(&mut self, _module_id: Topic, _old_level: Level, _new_level: Level) {}
    fn on_intervention_suggested(&mut self, _intervention: &Intervention) {}
}

impl ProgressEvent {
    pub fn dispatch(&self, observer: &mut dyn ProgressObserver) {
        match self {
            ProgressEvent::StreakChanged(update) => observer.on_streak_changed(update),
            ProgressEvent::LevelUp { module_id, old_level, new_level } =>
                observer.on_level_up(*module_id, *old_level, *new_level),
            ProgressEvent::ModuleCompleted { module_id } => observer.on_module_completed(*module_id),
            ProgressEvent::FinishEarlyOffered { module_id } => observer.on_finish_early_offered(*module_id),
            ProgressEvent::LevelDown { module_id, old_level, new_level } =>
                observer.on_level_down(*module_id, *old_level, *new_level),
            ProgressEvent::InterventionSuggested(intervention) => observer.on_intervention_suggested(intervention),
        }
    }
}

/// Outcome of answering the current question.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub question_id: String,
    pub result: ValidationResult,
    pub events: Vec<ProgressEvent>,
}

impl Submission {
    pub fn dispatch(&self, observer: &mut dyn ProgressObserver) {
        for event in &self.events {
            event.dispatch(observer);
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct PracticeSession<'c> {
    rng: StdRng,
    curriculum: &'c Curriculum,
    topic: Topic,
    level: Level,
    batch: Vec<Question>,
    cursor: usize,
    streak: StreakTracker,
    performance: PerformanceTracker,
    pending_intervention: Option<Intervention>,
    interventions: Vec<InterventionRecord>,
}

impl PracticeSession<'static> {
    /// Session on the bundled curriculum. `seed` makes the batch reproducible.
    pub fn new(topic: Topic, level: Level, count: usize, seed: Option<u64>) -> Self {
        PracticeSession::with_curriculum(builtin_curriculum(), topic, level, count, seed)
    }
}

impl<'c> PracticeSession<'c> {
    pub fn with_curriculum(
        curriculum: &'c Curriculum,
        topic: Topic,
        level: Level,
        count: usize,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let batch = generate_batch(&mut rng, curriculum, topic, level, count, None, Utc::now());
        PracticeSession {
            rng,
            curriculum,
            topic,
            level,
            batch,
            cursor: 0,
            streak: StreakTracker::new(),
            performance: PerformanceTracker::new(level),
            pending_intervention: None,
            interventions: Vec::new(),
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn streak(&self) -> &StreakTracker {
        &self.streak
    }

    pub fn performance(&self) -> &PerformanceTracker {
        &self.performance
    }

    /// The intervention awaiting a response, if any.
    pub fn pending_intervention(&self) -> Option<&Intervention> {
        self.pending_intervention.as_ref()
    }

    /// Responses to interventions so far, oldest first.
    pub fn intervention_history(&self) -> &[InterventionRecord] {
        &self.interventions
    }

    fn interventions_accepted(&self) -> u32 {
        self.interventions.iter().filter(|r| r.accepted).count() as u32
    }

    pub fn batch(&self) -> &[Question] {
        &self.batch
    }

    /// The question awaiting an answer, if the batch is not finished.
    pub fn current(&self) -> Option<&Question> {
        self.batch.get(self.cursor)
    }

    /// Questions answered so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Questions not yet answered, including the current one.
    pub fn remaining(&self) -> usize {
        self.batch.len().saturating_sub(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.batch.len()
    }

    /// Grade an answer to the current question and advance. `None` when the
    /// batch is already finished.
    pub fn submit(&mut self, progress: &mut ProgressBook, answer: &str) -> Option<Submission> {
        self.submit_timed(progress, answer, None)
    }

    /// [`submit`](Self::submit) with the time the learner took to answer,
    /// which feeds the speed factors of the performance checks.
    pub fn submit_timed(
        &mut self,
        progress: &mut ProgressBook,
        answer: &str,
        response: Option<Duration>,
    ) -> Option<Submission> {
        let question = self.batch.get(self.cursor)?;
        let result = validate(question, answer);
        let question_id = question.id.clone();
        let question_level = question.level;
        self.cursor += 1;

        let update = self.streak.record_answer(result.is_correct);
        let mut events = vec![ProgressEvent::StreakChanged(update)];

        if result.is_correct && progress.record_correct(self.topic, question_level) {
            events.push(ProgressEvent::ModuleCompleted { module_id: self.topic });
        }
        if update.just_unlocked && self.level == Level::MAX && progress.is_module_complete(self.topic) {
            events.push(ProgressEvent::FinishEarlyOffered { module_id: self.topic });
        }

        self.performance.record(result.is_correct, response);
        let answered = self.cursor as u32;
        if let Some(intervention) = check_for_intervention(&self.performance, self.topic, answered, self.interventions_accepted()) {
            info!("{}: suggesting {:?} at answer {}", self.topic.id(), intervention.kind, answered);
            events.push(ProgressEvent::InterventionSuggested(intervention.clone()));
            self.pending_intervention = Some(intervention);
        }
        Some(Submission { question_id, result, events })
    }

    /// Spend an available power-up: raise the level (capped at the top
    /// level) and regenerate every question not yet shown at the new level.
    /// Returns the level-up event, or `None` when there was no power-up or
    /// the session is already at the top level.
    pub fn accept_power_up(&mut self) -> Option<ProgressEvent> {
        if !self.streak.consume_power_up() {
            return None;
        }
        let old_level = self.level;
        let new_level = old_level.next();
        if new_level == old_level {
            return None;
        }
        info!("{}: level up {} -> {}", self.topic.id(), old_level.number(), new_level.number());
        self.change_level(new_level);
        Some(ProgressEvent::LevelUp { module_id: self.topic, old_level, new_level })
    }

    /// Answer the pending intervention. Accepting a step up or down changes
    /// the level and regenerates the unanswered questions; accepting a module
    /// switch changes nothing here, the caller starts a new session on the
    /// suggested alternative. Returns the level event, if any.
    pub fn respond_to_intervention(&mut self, accepted: bool) -> Option<ProgressEvent> {
        let intervention = self.pending_intervention.take()?;
        info!(
            "{}: intervention {:?} {}",
            self.topic.id(),
            intervention.kind,
            if accepted { "accepted" } else { "declined" }
        );
        self.interventions.push(InterventionRecord {
            kind: intervention.kind,
            triggered_at: intervention.triggered_at,
            accepted,
            at: Utc::now(),
        });
        if !accepted {
            return None;
        }

        let old_level = self.level;
        let new_level = intervention.suggested_level?;
        self.change_level(new_level);
        let module_id = self.topic;
        match intervention.kind {
            InterventionKind::Increase     => Some(ProgressEvent::LevelUp { module_id, old_level, new_level }),
            InterventionKind::Decrease     => Some(ProgressEvent::LevelDown { module_id, old_level, new_level }),
            InterventionKind::SwitchModule => None,
        }
    }

    fn change_level(&mut self, new_level: Level) {
        self.level = new_level;
        self.performance.set_level(new_level);

        let remaining = self.remaining();
        self.batch.truncate(self.cursor);
        let fresh = generate_batch(&mut self.rng, self.curriculum, self.topic, new_level, remaining, None, Utc::now());
        self.batch.extend(fresh);
    }

    /// Drop the unanswered questions, e.g. after accepting a finish-early
    /// offer. Returns how many were dropped.
    pub fn finish_early(&mut self) -> usize {
        let dropped = self.remaining();
        self.batch.truncate(self.cursor);
        dropped
    }
}
