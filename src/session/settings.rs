//! The session settings block.
//!
//! Everything a host can tune lives here: round shape, timing windows,
//! capacity bounds, pacing mode, scoring constants, and the bot fill
//! schedule. Settings are validated once, at session creation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::content::ContentMapping;

/// Point constants for the scoring engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Base reward for a correct answer.
    pub base_points: u32,
    /// Extra points per consecutive correct answer.
    pub streak_step: u32,
    /// One-participant bonus for the round's fastest correct answer.
    pub fastest_bonus: u32,
    /// Penalty for a wrong or missing answer.
    pub wrong_penalty: u32,
    /// Points transferred by a steal.
    pub steal_amount: u32,
    /// Rounds a granted status stays active.
    pub ability_turns: u8,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            base_points: 100,
            streak_step: 10,
            fastest_bonus: 25,
            wrong_penalty: 50,
            steal_amount: 50,
            ability_turns: 2,
        }
    }
}

/// Bot admission and behavior knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotSettings {
    /// Staged admission while waiting: after each delay (measured from
    /// session creation), admit that many more bots, capacity permitting.
    pub fill_stages: Vec<(Duration, usize)>,
    /// Per-bot accuracy is drawn from this range at admission.
    pub accuracy: (f64, f64),
    /// Synthetic answers land after a delay drawn from this range.
    pub answer_delay: (Duration, Duration),
    /// Delay multiplier applied to slowed bots.
    pub slow_factor: u32,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            fill_stages: vec![
                (Duration::from_secs(10), 1),
                (Duration::from_secs(20), 2),
            ],
            accuracy: (0.55, 0.9),
            answer_delay: (Duration::from_secs(2), Duration::from_secs(8)),
            slow_factor: 2,
        }
    }
}

/// Full settings block for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Rounds per session.
    pub round_count: usize,
    /// Answer window per round.
    pub round_time_limit: Duration,
    /// Lead-in between the host starting and the first round.
    pub countdown: Duration,
    /// Reveal display time before moving on (auto-paced sessions).
    pub reveal_delay: Duration,
    /// Selection window for bonus phases.
    pub bonus_window: Duration,
    /// Leaderboard display time (auto-paced sessions).
    pub leaderboard_delay: Duration,
    /// Minimum participants to start.
    pub min_players: usize,
    /// Maximum participants, bots included.
    pub capacity: usize,
    /// When set, reveal and leaderboard wait for the host instead of a timer.
    pub host_paced: bool,
    /// Every Nth round is a bonus round. `None` disables them.
    pub bonus_every: Option<usize>,
    /// Show the leaderboard after every Nth round. `None` disables it.
    pub leaderboard_every: Option<usize>,
    /// Options per choice round, correct one included.
    pub option_count: usize,
    /// Which side of the content items is prompted.
    pub mapping: ContentMapping,
    /// Scoring constants.
    pub scoring: ScoringSettings,
    /// Bot admission; `None` leaves empty seats empty.
    pub bots: Option<BotSettings>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            round_count: 10,
            round_time_limit: Duration::from_secs(20),
            countdown: Duration::from_secs(3),
            reveal_delay: Duration::from_secs(4),
            bonus_window: Duration::from_secs(10),
            leaderboard_delay: Duration::from_secs(5),
            min_players: 2,
            capacity: 8,
            host_paced: false,
            bonus_every: Some(5),
            leaderboard_every: Some(5),
            option_count: 4,
            mapping: ContentMapping::TermToDefinition,
            scoring: ScoringSettings::default(),
            bots: Some(BotSettings::default()),
        }
    }
}

/// Settings problems, all fatal at session creation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("round count must be at least 1")]
    NoRounds,

    #[error("round time limit must be positive")]
    ZeroTimeLimit,

    #[error("minimum players must be at least 1")]
    ZeroMinPlayers,

    #[error("capacity {capacity} below minimum players {min_players}")]
    CapacityBelowMinimum { capacity: usize, min_players: usize },

    #[error("cadence values must be at least 1")]
    ZeroCadence,

    #[error("bot accuracy range must sit within 0..=1")]
    BadBotAccuracy,

    #[error("bot answer delay range is inverted")]
    BadBotDelay,
}

impl SessionSettings {
    /// New settings with the defaults above.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round count.
    #[must_use]
    pub fn with_rounds(mut self, count: usize) -> Self {
        self.round_count = count;
        self
    }

    /// Set the per-round answer window.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.round_time_limit = limit;
        self
    }

    /// Set capacity bounds.
    #[must_use]
    pub fn with_capacity(mut self, min_players: usize, capacity: usize) -> Self {
        self.min_players = min_players;
        self.capacity = capacity;
        self
    }

    /// Host-paced reveal and leaderboard.
    #[must_use]
    pub fn host_paced(mut self) -> Self {
        self.host_paced = true;
        self
    }

    /// Set the bonus round cadence.
    #[must_use]
    pub fn with_bonus_every(mut self, every: Option<usize>) -> Self {
        self.bonus_every = every;
        self
    }

    /// Set the leaderboard cadence.
    #[must_use]
    pub fn with_leaderboard_every(mut self, every: Option<usize>) -> Self {
        self.leaderboard_every = every;
        self
    }

    /// Replace the scoring constants.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringSettings) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replace the bot settings, or disable bot fill with `None`.
    #[must_use]
    pub fn with_bots(mut self, bots: Option<BotSettings>) -> Self {
        self.bots = bots;
        self
    }

    /// Validate the block. Called once by `Session::create`.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.round_count == 0 {
            return Err(SettingsError::NoRounds);
        }
        if self.round_time_limit.is_zero() {
            return Err(SettingsError::ZeroTimeLimit);
        }
        if self.min_players == 0 {
            return Err(SettingsError::ZeroMinPlayers);
        }
        if self.capacity < self.min_players {
            return Err(SettingsError::CapacityBelowMinimum {
                capacity: self.capacity,
                min_players: self.min_players,
            });
        }
        if self.bonus_every == Some(0) || self.leaderboard_every == Some(0) {
            return Err(SettingsError::ZeroCadence);
        }
        if let Some(bots) = &self.bots {
            let (lo, hi) = bots.accuracy;
            if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
                return Err(SettingsError::BadBotAccuracy);
            }
            if bots.answer_delay.0 > bots.answer_delay.1 {
                return Err(SettingsError::BadBotDelay);
            }
        }
        Ok(())
    }
}
