//! Participants: humans and bots in one roster entry.
//!
//! Scores clamp at zero by construction (`u32` + saturating writes), streak
//! and lifetime counters feed the results compiler, and the per-round
//! transients reset on every round start.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::abilities::AbilitySet;
use crate::content::Answer;
use crate::core::ParticipantId;

/// Behavior profile for a simulated participant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    /// Probability a planned answer is correct, drawn at admission.
    pub accuracy: f64,
}

/// One roster entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable per-session id, also the deterministic tie-break key.
    pub id: ParticipantId,
    /// Display name, unique within the session.
    pub name: String,
    /// Running score. Never negative; all writes saturate.
    pub score: u32,

    // Lifetime counters
    /// Correct answers so far.
    pub correct_count: u32,
    /// Wrong or missing answers so far.
    pub wrong_count: u32,
    /// Current consecutive-correct streak.
    pub streak: u32,
    /// Longest streak reached.
    pub best_streak: u32,
    /// Rounds this participant answered fastest-correct.
    pub fastest_count: u32,

    // Lifecycle
    /// Still in the game (elimination variant only flips this).
    pub alive: bool,
    /// 1-based round number of elimination.
    pub eliminated_in: Option<u32>,
    /// Left mid-game; kept in the roster for the audit trail.
    pub left: bool,

    /// Active status counters.
    pub abilities: AbilitySet,

    /// Present on simulated participants.
    pub bot: Option<BotProfile>,

    // Per-round transients, reset at every round start
    /// The answer submitted this round, if any.
    pub submitted: Option<Answer>,
    /// Submission latency this round.
    pub latency: Option<Duration>,
    /// Whether this round's answer was correct.
    pub answer_correct: Option<bool>,
    /// Whether a bonus-phase selection was made this round.
    pub bonus_picked: bool,
}

impl Participant {
    /// New human participant.
    #[must_use]
    pub fn human(id: ParticipantId, name: impl Into<String>) -> Self {
        Self::new(id, name, None)
    }

    /// New simulated participant.
    #[must_use]
    pub fn bot(id: ParticipantId, name: impl Into<String>, accuracy: f64) -> Self {
        Self::new(id, name, Some(BotProfile { accuracy }))
    }

    fn new(id: ParticipantId, name: impl Into<String>, bot: Option<BotProfile>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            correct_count: 0,
            wrong_count: 0,
            streak: 0,
            best_streak: 0,
            fastest_count: 0,
            alive: true,
            eliminated_in: None,
            left: false,
            abilities: AbilitySet::new(),
            bot,
            submitted: None,
            latency: None,
            answer_correct: None,
            bonus_picked: false,
        }
    }

    /// Is this a simulated participant?
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.bot.is_some()
    }

    /// Has an answer been submitted this round?
    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    /// Still playing: not eliminated, not gone.
    #[must_use]
    pub fn in_play(&self) -> bool {
        self.alive && !self.left
    }

    /// Allowed to answer the current round: in play and not cut off by a
    /// block or disconnect status.
    #[must_use]
    pub fn can_answer(&self) -> bool {
        use crate::abilities::AbilityKind;
        self.in_play()
            && !self.abilities.active(AbilityKind::Block)
            && !self.abilities.active(AbilityKind::Disconnect)
    }

    /// Clear the per-round transients. Called at every round start.
    pub fn reset_round(&mut self) {
        self.submitted = None;
        self.latency = None;
        self.answer_correct = None;
        self.bonus_picked = false;
    }

    /// Record this round's submission.
    pub fn record_answer(&mut self, answer: Answer, latency: Duration, correct: bool) {
        self.submitted = Some(answer);
        self.latency = Some(latency);
        self.answer_correct = Some(correct);
    }

    /// Credit points, returning the applied delta.
    pub fn add_points(&mut self, points: u32) -> i64 {
        self.score = self.score.saturating_add(points);
        i64::from(points)
    }

    /// Deduct points, clamping at zero. Returns the applied (negative) delta.
    pub fn deduct_points(&mut self, points: u32) -> i64 {
        let applied = points.min(self.score);
        self.score -= applied;
        -i64::from(applied)
    }

    /// Bump counters for a correct answer. Returns the streak including it.
    pub fn note_correct(&mut self) -> u32 {
        self.correct_count += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.streak
    }

    /// Bump counters for a wrong or missing answer.
    pub fn note_wrong(&mut self) {
        self.wrong_count += 1;
        self.streak = 0;
    }

    /// Eliminate at the given 1-based round number.
    pub fn eliminate(&mut self, round_number: u32) {
        self.alive = false;
        self.eliminated_in = Some(round_number);
    }
}
