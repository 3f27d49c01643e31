//! Synthetic participant behavior.
//!
//! Plans are made when an answerable phase opens: one submission per bot,
//! with a delay drawn from the configured range (stretched while slowed)
//! and an answer that is correct with the bot's own accuracy. The plan is
//! delivered later as an ordinary timer event; if the phase has moved on by
//! then, the epoch guard eats it, exactly like a late human submission.

use std::time::Duration;

use crate::abilities::AbilityKind;
use crate::content::{Answer, Round};
use crate::core::{ParticipantId, SessionRng};
use crate::session::participant::BotProfile;
use crate::session::settings::BotSettings;

/// A planned synthetic submission.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerPlan {
    /// When the answer lands, measured from the round opening.
    pub delay: Duration,
    /// What gets submitted.
    pub answer: Answer,
}

/// Plan one bot's answer for the round that just opened.
#[must_use]
pub fn plan_answer(
    profile: &BotProfile,
    slowed: bool,
    round: &Round,
    settings: &BotSettings,
    rng: &mut SessionRng,
) -> AnswerPlan {
    let mut delay = draw_delay(settings, rng);
    if slowed {
        delay = delay.saturating_mul(settings.slow_factor);
    }

    let answer = if rng.gen_bool(profile.accuracy) {
        round.correct.clone()
    } else {
        round.wrong_answer(rng.gen_range_usize(0..16))
    };

    AnswerPlan { delay, answer }
}

/// Delay for a bot's bonus-phase selection. Bots pick quickly; the point is
/// only that they never stall the phase until its deadline.
#[must_use]
pub fn plan_bonus_delay(settings: &BotSettings, rng: &mut SessionRng) -> Duration {
    let lo = settings.answer_delay.0.min(settings.answer_delay.1);
    Duration::from_millis(rng.gen_range_u64(200..lo.as_millis().max(1) as u64 + 1200))
}

/// Pick an ability from the offered menu.
#[must_use]
pub fn pick_ability(menu: &[AbilityKind], rng: &mut SessionRng) -> Option<AbilityKind> {
    rng.choose(menu).copied()
}

/// Pick a target among the other in-play participants.
#[must_use]
pub fn pick_target(candidates: &[ParticipantId], rng: &mut SessionRng) -> Option<ParticipantId> {
    rng.choose(candidates).copied()
}

/// Draw a fresh bot's accuracy from the configured range.
#[must_use]
pub fn draw_accuracy(settings: &BotSettings, rng: &mut SessionRng) -> f64 {
    let (lo, hi) = settings.accuracy;
    rng.gen_range_f64(lo..hi)
}

fn draw_delay(settings: &BotSettings, rng: &mut SessionRng) -> Duration {
    let lo = settings.answer_delay.0.as_millis() as u64;
    let hi = settings.answer_delay.1.as_millis() as u64;
    Duration::from_millis(rng.gen_range_u64(lo..hi + 1))
}
