//! Point arithmetic for round closes.
//!
//! All pure. The order is fixed: base, plus the capped speed bonus, plus
//! the streak bonus, and double-points doubles that whole sum as the final
//! step. Integer math throughout; latency is measured against the round's
//! own limit.

use std::time::Duration;

use crate::core::ParticipantId;
use crate::session::settings::ScoringSettings;

/// Speed bonus for a correct answer: proportional to the fraction of the
/// window left, capped at half the base reward.
#[must_use]
pub fn speed_bonus(base: u32, latency: Duration, limit: Duration) -> u32 {
    let limit_ms = limit.as_millis() as u64;
    if limit_ms == 0 {
        return 0;
    }
    let left_ms = limit_ms.saturating_sub(latency.as_millis() as u64);
    let raw = (u64::from(base) * left_ms / limit_ms) as u32;
    raw.min(base / 2)
}

/// Total reward for a correct answer.
///
/// `streak` counts consecutive correct answers including this one.
#[must_use]
pub fn correct_points(
    scoring: &ScoringSettings,
    latency: Duration,
    limit: Duration,
    streak: u32,
    doubled: bool,
) -> u32 {
    let base = scoring.base_points;
    let total = base
        .saturating_add(speed_bonus(base, latency, limit))
        .saturating_add(streak.saturating_mul(scoring.streak_step));
    if doubled {
        total.saturating_mul(2)
    } else {
        total
    }
}

/// Pick the round's fastest correct responder.
///
/// Ties on latency break to the lowest participant id, so the outcome never
/// depends on iteration order.
#[must_use]
pub fn fastest_correct<I>(candidates: I) -> Option<ParticipantId>
where
    I: IntoIterator<Item = (ParticipantId, Duration)>,
{
    candidates
        .into_iter()
        .min_by_key(|&(id, latency)| (latency, id))
        .map(|(id, _)| id)
}
