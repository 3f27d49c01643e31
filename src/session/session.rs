//! The session aggregate.
//!
//! One `Session` is one game room: identity, settings, the immutable round
//! list, the roster, the current phase, and the append-only round log. All
//! mutation goes through the phase machine (`Session::apply`); this file
//! owns construction, roster operations, and read access.

use im::Vector;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::bots;
use crate::content::{self, ContentError, ContentItem, Round, RoundPlan};
use crate::core::{JoinCode, ParticipantId, SessionId, SessionRng, Timestamp};
use crate::phase::{Phase, SideEffect, TimerKind};
use crate::results::ResultsSummary;
use crate::variant::VariantRules;

use super::log::RoundResult;
use super::participant::Participant;
use super::settings::{SessionSettings, SettingsError};

/// Failures at session creation. Nothing is created on error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Failures when joining a session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("no open session with that code")]
    NotFound,

    #[error("session is full")]
    Full,

    #[error("session has already started")]
    AlreadyStarted,

    #[error("that name is already taken")]
    NameTaken,
}

/// One game room.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) code: JoinCode,
    pub(crate) host: ParticipantId,
    pub(crate) rules: VariantRules,
    pub(crate) settings: SessionSettings,
    /// Generated at creation, never mutated.
    pub(crate) rounds: Vec<Round>,
    pub(crate) roster: BTreeMap<ParticipantId, Participant>,
    pub(crate) next_participant: u32,
    pub(crate) bots_admitted: usize,
    pub(crate) phase: Phase,
    /// 0-based index of the open round; equals rounds played once finished.
    pub(crate) round_index: usize,
    pub(crate) phase_started_at: Timestamp,
    pub(crate) phase_deadline: Option<Timestamp>,
    /// Bumped on every phase transition; stale timers die against it.
    pub(crate) epoch: u64,
    pub(crate) round_log: Vector<RoundResult>,
    pub(crate) results: Option<ResultsSummary>,
    pub(crate) bot_rng: SessionRng,
    pub(crate) wheel_rng: SessionRng,
}

impl Session {
    /// Create a session: validate settings, generate identity and the full
    /// round list, admit the host, and schedule bot admission stages.
    ///
    /// Content shortfalls surface here, before anything exists.
    pub fn create(
        host_name: impl Into<String>,
        rules: VariantRules,
        settings: SessionSettings,
        pool: &[ContentItem],
        seed: u64,
        now: Timestamp,
    ) -> Result<(Self, Vec<SideEffect>), CreateError> {
        settings.validate()?;

        let root = SessionRng::new(seed);
        let mut id_rng = root.for_context("identity");
        let mut content_rng = root.for_context("content");

        let plan = RoundPlan {
            count: settings.round_count,
            mode: rules.answer_mode,
            option_count: settings.option_count,
            mapping: settings.mapping,
            time_limit: settings.round_time_limit,
            bonus_every: if rules.has_bonus_phase() {
                settings.bonus_every
            } else {
                None
            },
        };
        let rounds = content::build_rounds(pool, &plan, &mut content_rng)?;

        let host = ParticipantId::new(0);
        let mut roster = BTreeMap::new();
        roster.insert(host, Participant::human(host, host_name));

        let session = Self {
            id: SessionId::generate(&mut id_rng),
            code: JoinCode::generate(&mut id_rng),
            host,
            rules,
            settings,
            rounds,
            roster,
            next_participant: 1,
            bots_admitted: 0,
            phase: Phase::Waiting,
            round_index: 0,
            phase_started_at: now,
            phase_deadline: None,
            epoch: 0,
            round_log: Vector::new(),
            results: None,
            bot_rng: root.for_context("bots"),
            wheel_rng: root.for_context("wheel"),
        };

        let mut effects = vec![SideEffect::Snapshot];
        if let Some(bot_settings) = &session.settings.bots {
            for (stage, (delay, _)) in bot_settings.fill_stages.iter().enumerate() {
                effects.push(SideEffect::Schedule {
                    timer: TimerKind::BotAdmission { stage },
                    after: *delay,
                    epoch: session.epoch,
                });
            }
        }

        tracing::info!(session = %session.id, code = %session.code, variant = %session.rules.variant, "session created");
        Ok((session, effects))
    }

    /// Admit a human participant. Only valid while waiting.
    pub fn join(
        &mut self,
        name: impl Into<String>,
        _now: Timestamp,
    ) -> Result<(ParticipantId, Vec<SideEffect>), JoinError> {
        if self.phase != Phase::Waiting {
            return Err(JoinError::AlreadyStarted);
        }
        if self.roster.len() >= self.settings.capacity {
            return Err(JoinError::Full);
        }
        let name = name.into();
        if self.roster.values().any(|p| p.name == name) {
            return Err(JoinError::NameTaken);
        }

        let id = self.alloc_participant();
        self.roster.insert(id, Participant::human(id, name));
        tracing::debug!(session = %self.id, participant = %id, "participant joined");
        Ok((id, vec![SideEffect::Snapshot]))
    }

    /// Admit up to `count` bots, capacity permitting. Returns the new ids.
    pub(crate) fn admit_bots(&mut self, count: usize) -> Vec<ParticipantId> {
        let Some(bot_settings) = self.settings.bots.clone() else {
            return Vec::new();
        };

        let mut admitted = Vec::new();
        for _ in 0..count {
            if self.roster.len() >= self.settings.capacity {
                break;
            }
            let id = self.alloc_participant();
            let name = bots::bot_name(self.bots_admitted);
            let accuracy = bots::draw_accuracy(&bot_settings, &mut self.bot_rng);
            self.roster.insert(id, Participant::bot(id, name, accuracy));
            self.bots_admitted += 1;
            admitted.push(id);
        }
        if !admitted.is_empty() {
            tracing::debug!(session = %self.id, count = admitted.len(), "bots admitted");
        }
        admitted
    }

    fn alloc_participant(&mut self) -> ParticipantId {
        let id = ParticipantId::new(self.next_participant);
        self.next_participant += 1;
        id
    }

    // === Read access ===

    /// Session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Join code.
    #[must_use]
    pub fn join_code(&self) -> &JoinCode {
        &self.code
    }

    /// The host participant.
    #[must_use]
    pub fn host(&self) -> ParticipantId {
        self.host
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current epoch (bumped per phase transition).
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The variant rules this session runs under.
    #[must_use]
    pub fn rules(&self) -> &VariantRules {
        &self.rules
    }

    /// The settings block.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// 0-based index of the open round; equals rounds played once finished.
    #[must_use]
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// 1-based number of the open round.
    #[must_use]
    pub(crate) fn round_number(&self) -> u32 {
        self.round_index as u32 + 1
    }

    /// The round currently addressable, in phases that have one.
    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        match self.phase {
            Phase::Waiting | Phase::Starting | Phase::Finished => None,
            _ => self.rounds.get(self.round_index),
        }
    }

    /// When the current phase's deadline falls, if it has one.
    #[must_use]
    pub fn phase_deadline(&self) -> Option<Timestamp> {
        self.phase_deadline
    }

    /// Time left in the current phase.
    #[must_use]
    pub fn time_remaining(&self, now: Timestamp) -> Option<Duration> {
        self.phase_deadline
            .map(|deadline| Duration::from_millis(deadline.as_millis().saturating_sub(now.as_millis())))
    }

    /// All roster entries, in id order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.roster.values()
    }

    /// One roster entry.
    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.get(&id)
    }

    /// Roster size, bots included.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }

    /// Participants still in the game.
    pub(crate) fn in_play(&self) -> impl Iterator<Item = &Participant> {
        self.roster.values().filter(|p| p.in_play())
    }

    /// Count of participants still in the game.
    #[must_use]
    pub fn in_play_count(&self) -> usize {
        self.in_play().count()
    }

    /// The append-only round log.
    #[must_use]
    pub fn round_log(&self) -> &Vector<RoundResult> {
        &self.round_log
    }

    /// Terminal results, present once finished.
    #[must_use]
    pub fn results(&self) -> Option<&ResultsSummary> {
        self.results.as_ref()
    }
}
