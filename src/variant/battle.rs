//! The trivia battle.
//!
//! Scored multiple choice. Bonus rounds open a power-up menu: defensive
//! picks (shield, double points) and attacks aimed at the leaders (steal,
//! block, slow, disconnect).

use crate::abilities::AbilityKind;
use crate::content::AnswerMode;

use super::{BonusSelection, GameVariant, VariantRules};

/// Rules block for the trivia battle.
#[must_use]
pub fn rules() -> VariantRules {
    VariantRules {
        variant: GameVariant::TriviaBattle,
        answer_mode: AnswerMode::Choice,
        elimination: false,
        bonus: BonusSelection::Pick(vec![
            AbilityKind::Shield,
            AbilityKind::DoublePoints,
            AbilityKind::Steal,
            AbilityKind::Block,
            AbilityKind::Slow,
            AbilityKind::Disconnect,
        ]),
    }
}
