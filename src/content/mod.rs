//! Content adapter: learning items in, game rounds out.
//!
//! Pure and seed-replayable. Sessions call `build_rounds` exactly once, at
//! creation; the resulting round list is immutable for the session's life.

pub mod adapter;
pub mod round;

pub use adapter::{build_rounds, ContentError, ContentItem, ContentMapping, RoundPlan};
pub use round::{Answer, AnswerMode, Round};
