//! Session and participant identifiers.
//!
//! ## SessionId
//!
//! A uuid, with its bytes drawn from the caller's RNG so that id assignment
//! is replayable under a fixed seed.
//!
//! ## ParticipantId
//!
//! Sequential per-session index. Ids are never reused within a session, and
//! ordering by id is the deterministic tie-break everywhere one is needed.
//!
//! ## JoinCode
//!
//! The short human-entered room code: 6 characters from an unambiguous
//! uppercase alphabet. Generation is random; collision checking against
//! currently open sessions is the registry's job.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rng::SessionRng;

/// Unique session identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a session id from the given RNG.
    #[must_use]
    pub fn generate(rng: &mut SessionRng) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// The underlying uuid.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-session participant identifier, assigned sequentially at admission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Create a participant id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw index value.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Alphabet for join codes. No 0/O or 1/I, people type these on phones.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a join code.
pub const CODE_LEN: usize = 6;

/// Short human-entered room code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCode(String);

impl JoinCode {
    /// Generate a fresh code from the given RNG.
    ///
    /// The caller is responsible for collision checking against open
    /// sessions before handing the code out.
    #[must_use]
    pub fn generate(rng: &mut SessionRng) -> Self {
        let code: String = (0..CODE_LEN)
            .map(|_| {
                let i = rng.gen_range_usize(0..CODE_ALPHABET.len());
                CODE_ALPHABET[i] as char
            })
            .collect();
        Self(code)
    }

    /// Parse a user-entered code, normalizing case.
    ///
    /// Returns `None` if the input is not 6 characters from the code
    /// alphabet.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let normalized: String = input.trim().to_ascii_uppercase();
        if normalized.len() != CODE_LEN {
            return None;
        }
        if !normalized.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return None;
        }
        Some(Self(normalized))
    }

    /// The code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JoinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_deterministic() {
        let mut rng1 = SessionRng::new(7);
        let mut rng2 = SessionRng::new(7);

        assert_eq!(SessionId::generate(&mut rng1), SessionId::generate(&mut rng2));
    }

    #[test]
    fn test_join_code_shape() {
        let mut rng = SessionRng::new(42);
        let code = JoinCode::generate(&mut rng);

        assert_eq!(code.as_str().len(), CODE_LEN);
        assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_join_code_parse_normalizes() {
        let parsed = JoinCode::parse("  abcdef ").unwrap();
        assert_eq!(parsed.as_str(), "ABCDEF");
    }

    #[test]
    fn test_join_code_parse_rejects() {
        assert!(JoinCode::parse("ABC").is_none());
        assert!(JoinCode::parse("ABCDE0").is_none()); // 0 not in alphabet
        assert!(JoinCode::parse("ABCDEFG").is_none());
    }

    #[test]
    fn test_participant_id_ordering() {
        assert!(ParticipantId::new(0) < ParticipantId::new(1));
        assert_eq!(ParticipantId::new(3).index(), 3);
    }
}
