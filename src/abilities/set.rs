//! Ability kinds and per-participant status counters.
//!
//! Timed abilities carry a remaining-turns counter. Counters tick down
//! exactly once per round advance and clear at zero; within a round they
//! only ever move down (shield consumption), never up.

use serde::{Deserialize, Serialize};

/// Everything a participant can acquire or have inflicted on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Suppresses wrong-answer penalties and absorbs one steal.
    Shield,
    /// Doubles the holder's total round points.
    DoublePoints,
    /// Instantly transfers points from a target. Not a status.
    Steal,
    /// Target cannot answer while blocked.
    Block,
    /// Target's bots answer slower; human targets see a shrunk window
    /// client-side (the engine only stretches bot delays).
    Slow,
    /// Target is cut off: cannot answer, does not gate round close.
    Disconnect,
}

impl AbilityKind {
    /// Abilities aimed at another participant.
    #[must_use]
    pub const fn requires_target(self) -> bool {
        matches!(
            self,
            AbilityKind::Steal | AbilityKind::Block | AbilityKind::Slow | AbilityKind::Disconnect
        )
    }

    /// Abilities that persist as a counted status on someone.
    #[must_use]
    pub const fn is_status(self) -> bool {
        !matches!(self, AbilityKind::Steal)
    }
}

impl std::fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AbilityKind::Shield => "shield",
            AbilityKind::DoublePoints => "double-points",
            AbilityKind::Steal => "steal",
            AbilityKind::Block => "block",
            AbilityKind::Slow => "slow",
            AbilityKind::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

/// Remaining-turn counters for one participant's active statuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet {
    shield: u8,
    double_points: u8,
    slowed: u8,
    blocked: u8,
    disconnected: u8,
}

impl AbilitySet {
    /// No active statuses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: AbilityKind) -> u8 {
        match kind {
            AbilityKind::Shield => self.shield,
            AbilityKind::DoublePoints => self.double_points,
            AbilityKind::Slow => self.slowed,
            AbilityKind::Block => self.blocked,
            AbilityKind::Disconnect => self.disconnected,
            AbilityKind::Steal => 0,
        }
    }

    fn slot_mut(&mut self, kind: AbilityKind) -> Option<&mut u8> {
        match kind {
            AbilityKind::Shield => Some(&mut self.shield),
            AbilityKind::DoublePoints => Some(&mut self.double_points),
            AbilityKind::Slow => Some(&mut self.slowed),
            AbilityKind::Block => Some(&mut self.blocked),
            AbilityKind::Disconnect => Some(&mut self.disconnected),
            AbilityKind::Steal => None,
        }
    }

    /// Is the status currently active?
    #[must_use]
    pub fn active(&self, kind: AbilityKind) -> bool {
        self.slot(kind) > 0
    }

    /// Remaining turns on a status.
    #[must_use]
    pub fn remaining(&self, kind: AbilityKind) -> u8 {
        self.slot(kind)
    }

    /// Grant a status for `turns` rounds. Re-granting extends to the larger
    /// of the two counters rather than stacking. Instant abilities (steal)
    /// are not statuses and are ignored here.
    pub fn grant(&mut self, kind: AbilityKind, turns: u8) {
        if let Some(slot) = self.slot_mut(kind) {
            *slot = (*slot).max(turns);
        }
    }

    /// Consume the shield if active (a steal landed on it).
    ///
    /// Returns whether there was a shield to consume. Penalty suppression
    /// does NOT consume the shield; only this does.
    pub fn consume_shield(&mut self) -> bool {
        if self.shield > 0 {
            self.shield = 0;
            true
        } else {
            false
        }
    }

    /// Tick all counters down by one round. Called exactly once per round
    /// advance.
    pub fn tick(&mut self) {
        self.shield = self.shield.saturating_sub(1);
        self.double_points = self.double_points.saturating_sub(1);
        self.slowed = self.slowed.saturating_sub(1);
        self.blocked = self.blocked.saturating_sub(1);
        self.disconnected = self.disconnected.saturating_sub(1);
    }

    /// Any status active at all?
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.shield > 0
            || self.double_points > 0
            || self.slowed > 0
            || self.blocked > 0
            || self.disconnected > 0
    }
}
