//! Game variants.
//!
//! One engine, four parameter blocks. A `VariantRules` value tells the
//! phase machine how answers are collected, whether wrong answers
//! eliminate, and what a bonus phase hands out. Nothing else differs
//! between the mini-games.

pub mod battle;
pub mod pairs;
pub mod quiz;
pub mod typing;

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityKind, Wheel};
use crate::content::AnswerMode;

/// Which mini-game a session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVariant {
    /// Wrong answer and you're out; last one standing wins.
    EliminationQuiz,
    /// Scored multiple choice with power-ups on bonus rounds.
    TriviaBattle,
    /// Typed answers against the clock, skills on bonus rounds.
    TypingRace,
    /// Match word pairs; bonus rounds spin the reward wheel.
    MatchPairs,
}

impl std::fmt::Display for GameVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameVariant::EliminationQuiz => "elimination-quiz",
            GameVariant::TriviaBattle => "trivia-battle",
            GameVariant::TypingRace => "typing-race",
            GameVariant::MatchPairs => "match-pairs",
        };
        f.write_str(name)
    }
}

/// What a bonus phase offers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BonusSelection {
    /// No bonus phases in this variant.
    None,
    /// Pick one ability from a menu.
    Pick(Vec<AbilityKind>),
    /// Spin a weighted reward wheel.
    Wheel(Wheel),
}

/// Everything the engine needs to know about a variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantRules {
    /// Which mini-game this is.
    pub variant: GameVariant,
    /// Choice or typed answers.
    pub answer_mode: AnswerMode,
    /// Wrong/missing answers eliminate.
    pub elimination: bool,
    /// Bonus phase contents.
    pub bonus: BonusSelection,
}

impl VariantRules {
    /// Does this variant ever open a bonus phase?
    #[must_use]
    pub fn has_bonus_phase(&self) -> bool {
        !matches!(self.bonus, BonusSelection::None)
    }

    /// The pickable ability menu, when bonus phases are menu-driven.
    #[must_use]
    pub fn ability_menu(&self) -> Option<&[AbilityKind]> {
        match &self.bonus {
            BonusSelection::Pick(menu) => Some(menu),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_cover_the_matrix() {
        let quiz = quiz::rules();
        let battle = battle::rules();
        let typing = typing::rules();
        let pairs = pairs::rules();

        assert!(quiz.elimination && !quiz.has_bonus_phase());
        assert!(!battle.elimination && battle.ability_menu().is_some());
        assert_eq!(typing.answer_mode, AnswerMode::Text);
        assert!(matches!(pairs.bonus, BonusSelection::Wheel(_)));
    }
}
