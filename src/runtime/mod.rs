//! Wall-clock runtime: one tokio task owns each live session.
//!
//! Use this layer in real deployments; the synchronous `registry` surface
//! with its virtual clock exists for tests and embedders that bring their
//! own scheduling.

pub mod actor;

pub use actor::{spawn_session, CommandError, SessionHandle, SessionUpdate};
