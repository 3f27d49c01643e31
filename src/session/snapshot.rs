//! Session snapshots.
//!
//! The outbound view: current phase plus enough state for a client to
//! render the room. Correct answers never leak into an open round's view;
//! they appear only once the round is in the log.

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityKind;
use crate::core::{JoinCode, ParticipantId, SessionId, Timestamp};
use crate::phase::Phase;
use crate::variant::GameVariant;

use super::log::RoundResult;
use super::session::Session;

/// What a client sees of a participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub is_bot: bool,
    pub score: u32,
    pub streak: u32,
    pub alive: bool,
    pub left: bool,
    pub has_submitted: bool,
    /// Active statuses, by kind.
    pub active_abilities: Vec<AbilityKind>,
}

/// What a client sees of the open round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    /// 1-based round number.
    pub number: u32,
    pub prompt: String,
    /// Displayed options; empty for typed-answer rounds.
    pub options: Vec<String>,
    pub is_bonus: bool,
    /// Milliseconds left on the phase deadline, if one is armed.
    pub remaining_ms: Option<u64>,
}

/// One rendered state of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionId,
    pub code: JoinCode,
    pub variant: GameVariant,
    pub phase: Phase,
    pub host: ParticipantId,
    /// 0-based index of the open round.
    pub round_index: usize,
    pub round_count: usize,
    pub question: Option<QuestionView>,
    /// The most recently closed round, correct answer included. This is
    /// what a reveal screen renders.
    pub last_result: Option<RoundResult>,
    pub participants: Vec<ParticipantView>,
}

impl SessionSnapshot {
    /// Render the session as of `now`.
    #[must_use]
    pub fn of(session: &Session, now: Timestamp) -> Self {
        let question = session.current_round().map(|round| QuestionView {
            number: session.round_index() as u32 + 1,
            prompt: round.prompt.clone(),
            options: if round.correct_index().is_some() {
                round.options.iter().cloned().collect()
            } else {
                Vec::new()
            },
            is_bonus: round.is_bonus,
            remaining_ms: session.time_remaining(now).map(|d| d.as_millis() as u64),
        });

        let participants = session
            .participants()
            .map(|p| ParticipantView {
                id: p.id,
                name: p.name.clone(),
                is_bot: p.is_bot(),
                score: p.score,
                streak: p.streak,
                alive: p.alive,
                left: p.left,
                has_submitted: p.has_submitted(),
                active_abilities: [
                    AbilityKind::Shield,
                    AbilityKind::DoublePoints,
                    AbilityKind::Slow,
                    AbilityKind::Block,
                    AbilityKind::Disconnect,
                ]
                .into_iter()
                .filter(|&kind| p.abilities.active(kind))
                .collect(),
            })
            .collect();

        Self {
            session: session.id(),
            code: session.join_code().clone(),
            variant: session.rules().variant,
            phase: session.phase(),
            host: session.host(),
            round_index: session.round_index(),
            round_count: session.settings().round_count,
            question,
            last_result: session.round_log().back().cloned(),
            participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;
    use crate::session::settings::SessionSettings;
    use crate::variant;

    fn pool(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem::new(format!("term{i}"), format!("def{i}")))
            .collect()
    }

    #[test]
    fn test_waiting_snapshot_has_no_question() {
        let (session, _) = Session::create(
            "host",
            variant::battle::rules(),
            SessionSettings::default(),
            &pool(12),
            42,
            Timestamp::ZERO,
        )
        .unwrap();

        let snap = SessionSnapshot::of(&session, Timestamp::ZERO);
        assert_eq!(snap.phase, Phase::Waiting);
        assert!(snap.question.is_none());
        assert!(snap.last_result.is_none());
        assert_eq!(snap.participants.len(), 1);
        assert_eq!(snap.round_count, 10);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (session, _) = Session::create(
            "host",
            variant::battle::rules(),
            SessionSettings::default(),
            &pool(12),
            42,
            Timestamp::ZERO,
        )
        .unwrap();

        let snap = SessionSnapshot::of(&session, Timestamp::ZERO);
        let json = serde_json::to_string(&snap).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
