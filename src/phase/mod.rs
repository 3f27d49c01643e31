//! The phase state machine.
//!
//! A session is always in exactly one `Phase`. Everything that can happen
//! to it is an `Event`; applying an event yields a list of `SideEffect`s
//! for the driver (schedule these timers, emit a snapshot, here are the
//! final results). The transition function itself lives in
//! [`machine`] and is pure with respect to time: it only ever sees the
//! `now` the driver passes in, so the whole graph is testable without a
//! single real timer.
//!
//! ## The epoch guard
//!
//! Every phase transition bumps the session's epoch. Scheduled timers carry
//! the epoch they were issued under; a timer firing with a stale epoch is
//! silently dropped. Late human submissions, bot answers landing after a
//! round closed, and round deadlines racing an all-answered close all
//! resolve through this one rule.

pub mod machine;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::abilities::AbilityKind;
use crate::content::Answer;
use crate::core::ParticipantId;
use crate::results::ResultsSummary;

/// The session phase superset. Variants move through a subset of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Lobby: participants join, bots trickle in, host may start.
    Waiting,
    /// Countdown between start and the first round.
    Starting,
    /// A round is open for answers.
    Question,
    /// The round just closed; correct answer and deltas on display.
    Reveal,
    /// Ability selection window after a bonus round.
    Bonus,
    /// Standings display between rounds.
    Leaderboard,
    /// Terminal. Results are compiled exactly once on entry.
    Finished,
}

impl Phase {
    /// Phases with no scheduled deadline.
    #[must_use]
    pub fn is_untimed(self) -> bool {
        matches!(self, Phase::Waiting | Phase::Finished)
    }

    /// Is the session over?
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Phase::Finished
    }

    /// Can answers be submitted right now?
    #[must_use]
    pub fn accepts_answers(self) -> bool {
        self == Phase::Question
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Waiting => "waiting",
            Phase::Starting => "starting",
            Phase::Question => "question",
            Phase::Reveal => "reveal",
            Phase::Bonus => "bonus",
            Phase::Leaderboard => "leaderboard",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Everything a driver can be asked to schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimerKind {
    /// `Starting` lead-in elapsed.
    Countdown,
    /// The open round's answer window elapsed.
    RoundDeadline,
    /// Reveal display time elapsed (auto-paced sessions).
    RevealDelay,
    /// Bonus selection window elapsed.
    BonusDeadline,
    /// Leaderboard display time elapsed (auto-paced sessions).
    LeaderboardDelay,
    /// A bot's planned submission comes due.
    BotAnswer {
        participant: ParticipantId,
        answer: Answer,
    },
    /// A bot's planned bonus-phase selection comes due.
    BotBonusPick { participant: ParticipantId },
    /// A bot admission stage comes due while waiting.
    BotAdmission { stage: usize },
}

/// An input to the state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Host starts the session.
    Start { participant: ParticipantId },
    /// A participant submits an answer for the open round.
    Submit {
        participant: ParticipantId,
        answer: Answer,
    },
    /// A participant makes a bonus-phase selection.
    SelectAbility {
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
    },
    /// Host pushes a reveal/leaderboard forward.
    Advance { participant: ParticipantId },
    /// A scheduled timer fired. Stale epochs are dropped silently.
    Timer { kind: TimerKind, epoch: u64 },
}

/// What the driver must do after an event is applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Arm a timer `after` from now. Carries the epoch it was issued
    /// under; the machine drops it on firing if the phase has moved on.
    Schedule {
        timer: TimerKind,
        after: Duration,
        epoch: u64,
    },
    /// Drop every pending timer for this session. Emitted on each phase
    /// transition and on close; drivers that skip this only waste wakeups,
    /// the epoch guard still protects state.
    ClearTimers,
    /// Observable state changed; publish a fresh snapshot.
    Snapshot,
    /// Terminal results, emitted exactly once.
    Results(ResultsSummary),
    /// The session is gone (host left); drivers drop it entirely.
    Closed,
}

/// Validation failures. Reported to the caller; state is untouched.
///
/// Timing races are NOT here: a late submission or a stale timer is an
/// `Ok` no-op by design.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("only the host can do that")]
    NotHost,

    #[error("need {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("operation not valid in the {0} phase")]
    WrongPhase(Phase),

    #[error("unknown participant")]
    UnknownParticipant,

    #[error("answer already submitted this round")]
    AlreadySubmitted,

    #[error("participant is not eligible to act")]
    NotEligible,

    #[error("ability selection already made this round")]
    AlreadyPicked,

    #[error("that ability is not offered in this game")]
    AbilityNotOffered,

    #[error("ability target is unknown or out of play")]
    UnknownTarget,

    #[error("that ability needs a target")]
    MissingTarget,
}
