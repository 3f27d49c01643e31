//! The elimination quiz.
//!
//! Multiple choice, no abilities, no second chances: answer wrong or not at
//! all and you are out, stamped with the round that got you. The session
//! ends when one participant remains (or rounds run out, in which case the
//! survivors rank by how long they lasted).

use crate::content::AnswerMode;

use super::{BonusSelection, GameVariant, VariantRules};

/// Rules block for the elimination quiz.
#[must_use]
pub fn rules() -> VariantRules {
    VariantRules {
        variant: GameVariant::EliminationQuiz,
        answer_mode: AnswerMode::Choice,
        elimination: true,
        bonus: BonusSelection::None,
    }
}
