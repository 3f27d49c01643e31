//! The match-pairs contest.
//!
//! Word pairs rendered as choice rounds: the prompt is one half, the
//! options are candidate mates. Bonus rounds spin the reward wheel instead
//! of offering a pick.

use crate::abilities::Wheel;
use crate::content::AnswerMode;

use super::{BonusSelection, GameVariant, VariantRules};

/// Rules block for the match-pairs contest.
#[must_use]
pub fn rules() -> VariantRules {
    VariantRules {
        variant: GameVariant::MatchPairs,
        answer_mode: AnswerMode::Choice,
        elimination: false,
        bonus: BonusSelection::Wheel(Wheel::standard()),
    }
}
