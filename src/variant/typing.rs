//! The typing race.
//!
//! Fill-in-the-blank prompts answered by typing, compared after trimming
//! and lowercasing. Skill rounds offer a narrower menu than the battle:
//! nothing that cuts an opponent off entirely, typing races stay winnable.

use crate::abilities::AbilityKind;
use crate::content::AnswerMode;

use super::{BonusSelection, GameVariant, VariantRules};

/// Rules block for the typing race.
#[must_use]
pub fn rules() -> VariantRules {
    VariantRules {
        variant: GameVariant::TypingRace,
        answer_mode: AnswerMode::Text,
        elimination: false,
        bonus: BonusSelection::Pick(vec![
            AbilityKind::Shield,
            AbilityKind::DoublePoints,
            AbilityKind::Slow,
        ]),
    }
}
