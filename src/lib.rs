//! # rust-minigames
//!
//! A round-based multiplayer minigame engine: one parameterized phase
//! machine and scoring/ability engine behind four mini-games (elimination
//! quiz, trivia battle, typing race, match pairs), with simulated
//! participants filling empty seats.
//!
//! ## Design Principles
//!
//! 1. **One engine, data-driven variants**: the mini-games differ only in
//!    the `VariantRules` block they hand the engine (answer mode,
//!    elimination, bonus contents). No per-game state machines.
//!
//! 2. **Pure transitions, driver-owned time**: `Session::apply` maps
//!    (phase, event) to (new state, side-effect list). The engine never
//!    reads a clock or arms a timer itself, so the whole graph tests
//!    without sleeping.
//!
//! 3. **Idempotent discard**: every phase transition bumps an epoch;
//!    timers and race-losing inputs die against it silently. Validation
//!    failures, by contrast, come back as errors and never touch state.
//!
//! 4. **Seeded everything**: content selection, bot behavior, wheel spins,
//!    and identifiers all flow from one seeded RNG with per-purpose
//!    streams, so sessions replay exactly.
//!
//! ## Modules
//!
//! - `core`: timestamps, identifiers, seeded RNG
//! - `content`: learning items in, immutable round lists out
//! - `session`: the root aggregate, settings, participants, round log
//! - `phase`: phase graph, events, side effects, the transition function
//! - `scoring`: point math (speed bonus, streaks, fastest-of-round)
//! - `abilities`: status counters, targeted attacks, the reward wheel
//! - `variant`: the four mini-game parameter blocks
//! - `bots`: synthetic answers, bonus picks, staged admission
//! - `results`: terminal ranking
//! - `registry`: multi-session surface with a deterministic virtual clock
//! - `runtime`: tokio actor per session for wall-clock deployments

pub mod abilities;
pub mod bots;
pub mod content;
pub mod core;
pub mod phase;
pub mod registry;
pub mod results;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod variant;

// Re-export commonly used types
pub use crate::core::{JoinCode, ParticipantId, SessionId, SessionRng, Timestamp};

pub use crate::abilities::{AbilityKind, AbilitySet, Wheel, WheelReward};

pub use crate::content::{
    build_rounds, Answer, AnswerMode, ContentError, ContentItem, ContentMapping, Round, RoundPlan,
};

pub use crate::session::{
    AnswerRecord, BotProfile, BotSettings, CreateError, JoinError, Participant, RoundResult,
    ScoringSettings, Session, SessionSettings, SessionSnapshot, SettingsError,
};

pub use crate::phase::{ActionError, Event, Phase, SideEffect, TimerKind};

pub use crate::results::{ParticipantResult, ResultsSummary};

pub use crate::variant::{BonusSelection, GameVariant, VariantRules};

pub use crate::registry::{RegistryError, SessionRegistry};

pub use crate::runtime::{spawn_session, CommandError, SessionHandle, SessionUpdate};
