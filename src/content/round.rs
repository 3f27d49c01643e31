//! Rounds and answers.
//!
//! A `Round` is immutable once generated: the prompt, the canonical answer,
//! the shuffled option list, the per-round time limit, and the bonus flag.
//! Sessions index into their round list and never mutate it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

/// How a variant collects answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerMode {
    /// Pick one of the displayed options (quiz, trivia battle, match pairs).
    Choice,
    /// Type the answer (typing race).
    Text,
}

/// A submitted or canonical answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    /// Option index into the round's option list.
    Choice(usize),
    /// Free text, compared case- and whitespace-insensitively.
    Text(String),
}

impl Answer {
    /// Normalize free text for comparison.
    #[must_use]
    pub fn normalize(text: &str) -> String {
        text.trim().to_lowercase()
    }
}

/// One immutable round of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// The question or prompt shown to participants.
    pub prompt: String,

    /// Displayed options in choice mode; plausible decoys (used for
    /// synthetic wrong answers) in text mode.
    pub options: SmallVec<[String; 4]>,

    /// The canonical answer. `Choice` holds the correct option index after
    /// shuffling.
    pub correct: Answer,

    /// Time participants have to answer this round.
    pub time_limit: Duration,

    /// Bonus rounds open the ability sub-phase after the reveal.
    pub is_bonus: bool,
}

impl Round {
    /// Check a submitted answer against the canonical one.
    ///
    /// Text answers match after trimming and lowercasing; a choice submitted
    /// against a text round (or vice versa) never matches.
    #[must_use]
    pub fn is_correct(&self, submitted: &Answer) -> bool {
        match (&self.correct, submitted) {
            (Answer::Choice(correct), Answer::Choice(picked)) => correct == picked,
            (Answer::Text(correct), Answer::Text(typed)) => {
                Answer::normalize(correct) == Answer::normalize(typed)
            }
            _ => false,
        }
    }

    /// The correct option index, if this is a choice round.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        match self.correct {
            Answer::Choice(i) => Some(i),
            Answer::Text(_) => None,
        }
    }

    /// A deliberately wrong answer for this round, used by the bot
    /// simulator. `pick` selects among the wrong options.
    #[must_use]
    pub fn wrong_answer(&self, pick: usize) -> Answer {
        match &self.correct {
            Answer::Choice(correct) => {
                let wrong: SmallVec<[usize; 4]> =
                    (0..self.options.len()).filter(|i| i != correct).collect();
                if wrong.is_empty() {
                    // Single-option round; nothing wrong to pick
                    Answer::Choice(*correct)
                } else {
                    Answer::Choice(wrong[pick % wrong.len()])
                }
            }
            Answer::Text(correct) => {
                let decoys: SmallVec<[&String; 4]> = self
                    .options
                    .iter()
                    .filter(|o| Answer::normalize(o) != Answer::normalize(correct))
                    .collect();
                if decoys.is_empty() {
                    Answer::Text(String::new())
                } else {
                    Answer::Text(decoys[pick % decoys.len()].clone())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn choice_round() -> Round {
        Round {
            prompt: "capital of France?".to_string(),
            options: smallvec![
                "Lyon".to_string(),
                "Paris".to_string(),
                "Nice".to_string(),
                "Lille".to_string()
            ],
            correct: Answer::Choice(1),
            time_limit: Duration::from_secs(20),
            is_bonus: false,
        }
    }

    fn text_round() -> Round {
        Round {
            prompt: "ubiquitous".to_string(),
            options: smallvec!["everywhere".to_string(), "nowhere".to_string()],
            correct: Answer::Text("everywhere".to_string()),
            time_limit: Duration::from_secs(30),
            is_bonus: false,
        }
    }

    #[test]
    fn test_choice_matching() {
        let round = choice_round();

        assert!(round.is_correct(&Answer::Choice(1)));
        assert!(!round.is_correct(&Answer::Choice(0)));
        assert!(!round.is_correct(&Answer::Text("Paris".to_string())));
        assert_eq!(round.correct_index(), Some(1));
    }

    #[test]
    fn test_text_matching_normalizes() {
        let round = text_round();

        assert!(round.is_correct(&Answer::Text("everywhere".to_string())));
        assert!(round.is_correct(&Answer::Text("  EveryWhere ".to_string())));
        assert!(!round.is_correct(&Answer::Text("nowhere".to_string())));
        assert!(!round.is_correct(&Answer::Choice(0)));
        assert_eq!(round.correct_index(), None);
    }

    #[test]
    fn test_wrong_answer_is_never_correct() {
        let round = choice_round();
        for pick in 0..8 {
            assert!(!round.is_correct(&round.wrong_answer(pick)));
        }

        let round = text_round();
        for pick in 0..4 {
            assert!(!round.is_correct(&round.wrong_answer(pick)));
        }
    }
}
