//! Content adapter: turns a flat pool of learning items into a session's
//! round list.
//!
//! Selection is a non-repeating shuffle; pools smaller than the requested
//! round count are cycled with a reshuffle per pass. Choice rounds draw
//! distractors from the rest of the pool and shuffle the option order,
//! recording the correct index. The whole step is pure: same pool, plan,
//! and RNG stream, same rounds.
//!
//! Shortfalls are fatal here, at session creation, never mid-game.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;
use thiserror::Error;

use crate::core::SessionRng;

use super::round::{Answer, AnswerMode, Round};

/// Decoy answers carried by text rounds for synthetic wrong submissions.
const TEXT_DECOY_COUNT: usize = 3;

/// One source item from the learning content pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// The term side (word, expression).
    pub term: String,
    /// The definition side (meaning, translation).
    pub definition: String,
}

impl ContentItem {
    /// Create a content item.
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// Which side of an item becomes the prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentMapping {
    /// Show the term, answer with the definition.
    #[default]
    TermToDefinition,
    /// Show the definition, answer with the term.
    DefinitionToTerm,
}

impl ContentMapping {
    fn prompt<'a>(&self, item: &'a ContentItem) -> &'a str {
        match self {
            ContentMapping::TermToDefinition => &item.term,
            ContentMapping::DefinitionToTerm => &item.definition,
        }
    }

    fn answer<'a>(&self, item: &'a ContentItem) -> &'a str {
        match self {
            ContentMapping::TermToDefinition => &item.definition,
            ContentMapping::DefinitionToTerm => &item.term,
        }
    }
}

/// What to generate: how many rounds, in which shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundPlan {
    /// Number of rounds to generate.
    pub count: usize,
    /// Choice or text answers.
    pub mode: AnswerMode,
    /// Options per choice round, correct one included.
    pub option_count: usize,
    /// Which side of the items is prompted.
    pub mapping: ContentMapping,
    /// Per-round answer window.
    pub time_limit: Duration,
    /// Every Nth round is a bonus round; `None` disables bonus rounds.
    pub bonus_every: Option<usize>,
}

/// Content problems, all fatal at session creation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content pool is empty")]
    EmptyPool,

    #[error("need {needed} distinct answers for options, pool has {available}")]
    NotEnoughDistinctAnswers { needed: usize, available: usize },

    #[error("invalid round plan: {0}")]
    InvalidPlan(&'static str),
}

/// Generate the ordered round list for a session.
pub fn build_rounds(
    pool: &[ContentItem],
    plan: &RoundPlan,
    rng: &mut SessionRng,
) -> Result<Vec<Round>, ContentError> {
    if plan.count == 0 {
        return Err(ContentError::InvalidPlan("round count must be at least 1"));
    }
    if plan.time_limit.is_zero() {
        return Err(ContentError::InvalidPlan("time limit must be positive"));
    }
    if plan.mode == AnswerMode::Choice && plan.option_count < 2 {
        return Err(ContentError::InvalidPlan("choice rounds need at least 2 options"));
    }
    if matches!(plan.bonus_every, Some(0)) {
        return Err(ContentError::InvalidPlan("bonus cadence must be at least 1"));
    }
    if pool.is_empty() {
        return Err(ContentError::EmptyPool);
    }

    if plan.mode == AnswerMode::Choice {
        let distinct = distinct_answer_count(pool, plan.mapping);
        if distinct < plan.option_count {
            return Err(ContentError::NotEnoughDistinctAnswers {
                needed: plan.option_count,
                available: distinct,
            });
        }
    }

    let order = selection_order(pool.len(), plan.count, rng);

    let mut rounds = Vec::with_capacity(plan.count);
    for (idx, &item_idx) in order.iter().enumerate() {
        let item = &pool[item_idx];
        let round_number = idx + 1;
        let is_bonus = plan
            .bonus_every
            .is_some_and(|every| round_number % every == 0);

        let round = match plan.mode {
            AnswerMode::Choice => {
                let (options, correct) = build_options(pool, item_idx, plan, rng);
                Round {
                    prompt: plan.mapping.prompt(item).to_string(),
                    options,
                    correct: Answer::Choice(correct),
                    time_limit: plan.time_limit,
                    is_bonus,
                }
            }
            AnswerMode::Text => Round {
                prompt: plan.mapping.prompt(item).to_string(),
                options: text_decoys(pool, item_idx, plan.mapping, rng),
                correct: Answer::Text(plan.mapping.answer(item).to_string()),
                time_limit: plan.time_limit,
                is_bonus,
            },
        };
        rounds.push(round);
    }

    Ok(rounds)
}

/// Pick `count` pool indices: one shuffled pass through the pool, then
/// reshuffled passes until enough, avoiding a back-to-back repeat across
/// pass boundaries.
fn selection_order(pool_len: usize, count: usize, rng: &mut SessionRng) -> Vec<usize> {
    let mut order = Vec::with_capacity(count);

    while order.len() < count {
        let mut pass: Vec<usize> = (0..pool_len).collect();
        rng.shuffle(&mut pass);

        if pool_len > 1 && order.last() == pass.first() {
            pass.swap(0, 1);
        }

        let take = pool_len.min(count - order.len());
        order.extend(pass.into_iter().take(take));
    }

    order
}

fn distinct_answer_count(pool: &[ContentItem], mapping: ContentMapping) -> usize {
    let mut seen: Vec<String> = pool
        .iter()
        .map(|item| Answer::normalize(mapping.answer(item)))
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Draw distractors, append the correct answer, shuffle, and locate it.
fn build_options(
    pool: &[ContentItem],
    item_idx: usize,
    plan: &RoundPlan,
    rng: &mut SessionRng,
) -> (SmallVec<[String; 4]>, usize) {
    let correct_text = plan.mapping.answer(&pool[item_idx]).to_string();
    let correct_norm = Answer::normalize(&correct_text);

    let mut candidates: Vec<String> = Vec::new();
    let mut seen: Vec<String> = vec![correct_norm];
    for (i, item) in pool.iter().enumerate() {
        if i == item_idx {
            continue;
        }
        let text = plan.mapping.answer(item);
        let norm = Answer::normalize(text);
        if !seen.contains(&norm) {
            seen.push(norm);
            candidates.push(text.to_string());
        }
    }
    rng.shuffle(&mut candidates);

    let mut options: SmallVec<[String; 4]> = candidates
        .into_iter()
        .take(plan.option_count - 1)
        .collect();
    options.push(correct_text.clone());
    rng.shuffle(&mut options);

    let correct_index = options
        .iter()
        .position(|o| Answer::normalize(o) == Answer::normalize(&correct_text))
        .unwrap_or(0);

    (options, correct_index)
}

fn text_decoys(
    pool: &[ContentItem],
    item_idx: usize,
    mapping: ContentMapping,
    rng: &mut SessionRng,
) -> SmallVec<[String; 4]> {
    let correct_norm = Answer::normalize(mapping.answer(&pool[item_idx]));

    let mut decoys: Vec<String> = pool
        .iter()
        .enumerate()
        .filter(|(i, item)| *i != item_idx && Answer::normalize(mapping.answer(item)) != correct_norm)
        .map(|(_, item)| mapping.answer(item).to_string())
        .collect();
    rng.shuffle(&mut decoys);

    decoys.into_iter().take(TEXT_DECOY_COUNT).collect()
}
