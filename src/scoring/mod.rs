//! Scoring engine: pure point math.
//!
//! The phase machine decides *when* points move; this module decides *how
//! many*. Ability interactions that move points between participants
//! (steal) are resolved in the phase machine where both sides are in reach.

pub mod points;

pub use points::{correct_points, fastest_correct, speed_bonus};
