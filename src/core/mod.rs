//! Core engine types: time, identifiers, RNG.
//!
//! These are the variant-agnostic building blocks. Nothing here knows what a
//! question or a score is; sessions configure behavior above this layer.

pub mod ids;
pub mod rng;
pub mod time;

pub use ids::{JoinCode, ParticipantId, SessionId, CODE_LEN};
pub use rng::SessionRng;
pub use time::Timestamp;
