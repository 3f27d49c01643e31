//! Abilities: timed statuses, instant attacks, and the reward wheel.
//!
//! Grant/consume/tick mechanics live here; the decision of *when* abilities
//! apply (bonus phases, steal-vs-shield) belongs to the phase machine.

pub mod set;
pub mod wheel;

pub use set::{AbilityKind, AbilitySet};
pub use wheel::{Wheel, WheelReward};
