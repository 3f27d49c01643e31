//! The append-only round log.
//!
//! One `RoundResult` per closed round, one `AnswerRecord` per participant
//! who was in play when the round closed. The log is the audit trail the
//! results compiler ranks from; entries are never rewritten or reordered.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::content::Answer;
use crate::core::ParticipantId;

/// One participant's line in a closed round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Who answered (or failed to).
    pub participant: ParticipantId,
    /// What they submitted, if anything.
    pub submitted: Option<Answer>,
    /// Whether the submission was correct.
    pub correct: bool,
    /// Submission latency, present when something was submitted.
    pub latency: Option<Duration>,
    /// Applied score delta, penalties negative. Already clamped, so this is
    /// exactly what the score moved by.
    pub points_delta: i64,
    /// Fastest correct answer of the round.
    pub fastest: bool,
    /// Eliminated by this round (elimination variant).
    pub eliminated: bool,
}

/// One closed round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round number.
    pub round_number: u32,
    /// The canonical answer.
    pub correct: Answer,
    /// One record per participant who was in play.
    pub records: Vec<AnswerRecord>,
}

impl RoundResult {
    /// Find a participant's record in this round.
    #[must_use]
    pub fn record_for(&self, id: ParticipantId) -> Option<&AnswerRecord> {
        self.records.iter().find(|r| r.participant == id)
    }
}
