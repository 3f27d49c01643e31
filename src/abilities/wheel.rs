//! The reward wheel.
//!
//! The match-pairs variant replaces free ability picks with a weighted spin:
//! bonus-phase selections draw one reward from this table. Spins come from
//! the session RNG's "wheel" stream, so a seeded session replays its spins.

use serde::{Deserialize, Serialize};

use crate::core::SessionRng;

use super::set::AbilityKind;

/// One possible wheel outcome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum WheelReward {
    /// Flat points, credited immediately.
    Points(u32),
    /// A status granted to the spinner for the given number of rounds.
    Ability(AbilityKind, u8),
    /// The wheel can come up empty.
    Nothing,
}

/// A weighted reward table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wheel {
    slots: Vec<(WheelReward, f32)>,
}

impl Wheel {
    /// Build a wheel from (reward, weight) slots.
    ///
    /// Returns `None` if the table is empty or all weights are zero.
    #[must_use]
    pub fn new(slots: Vec<(WheelReward, f32)>) -> Option<Self> {
        if slots.is_empty() || slots.iter().all(|(_, w)| *w <= 0.0) {
            return None;
        }
        Some(Self { slots })
    }

    /// The stock wheel: mostly points, occasionally a status, rarely empty.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            slots: vec![
                (WheelReward::Points(50), 3.0),
                (WheelReward::Points(100), 2.0),
                (WheelReward::Points(200), 1.0),
                (WheelReward::Ability(AbilityKind::Shield, 2), 1.5),
                (WheelReward::Ability(AbilityKind::DoublePoints, 1), 1.0),
                (WheelReward::Nothing, 1.5),
            ],
        }
    }

    /// Spin the wheel.
    #[must_use]
    pub fn spin(&self, rng: &mut SessionRng) -> WheelReward {
        let weights: Vec<f32> = self.slots.iter().map(|(_, w)| *w).collect();
        match rng.choose_weighted(&weights) {
            Some(i) => self.slots[i].0,
            None => WheelReward::Nothing,
        }
    }

    /// The reward slots, for display.
    #[must_use]
    pub fn slots(&self) -> &[(WheelReward, f32)] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_wheel_rejected() {
        assert!(Wheel::new(vec![]).is_none());
        assert!(Wheel::new(vec![(WheelReward::Points(10), 0.0)]).is_none());
    }

    #[test]
    fn test_spin_is_deterministic_per_seed() {
        let wheel = Wheel::standard();
        let mut rng1 = SessionRng::new(9).for_context("wheel");
        let mut rng2 = SessionRng::new(9).for_context("wheel");

        for _ in 0..20 {
            assert_eq!(wheel.spin(&mut rng1), wheel.spin(&mut rng2));
        }
    }

    #[test]
    fn test_single_slot_always_lands() {
        let wheel = Wheel::new(vec![(WheelReward::Points(77), 1.0)]).unwrap();
        let mut rng = SessionRng::new(1);

        for _ in 0..10 {
            assert_eq!(wheel.spin(&mut rng), WheelReward::Points(77));
        }
    }

    #[test]
    fn test_standard_wheel_covers_outcomes() {
        let wheel = Wheel::standard();
        let mut rng = SessionRng::new(42);

        let mut saw_points = false;
        let mut saw_ability = false;
        for _ in 0..200 {
            match wheel.spin(&mut rng) {
                WheelReward::Points(_) => saw_points = true,
                WheelReward::Ability(..) => saw_ability = true,
                WheelReward::Nothing => {}
            }
        }
        assert!(saw_points && saw_ability);
    }
}
