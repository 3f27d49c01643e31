//! Results compiler.
//!
//! Runs once, on the transition into `Finished`, and produces the immutable
//! ranked summary. Elimination sessions rank survivors first, then by how
//! long the rest lasted; score sessions rank by points. Every sort ends in
//! the participant id, so rankings are total and deterministic.

use serde::{Deserialize, Serialize};

use crate::core::{ParticipantId, SessionId};
use crate::session::participant::Participant;
use crate::variant::VariantRules;

/// One participant's final line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantResult {
    /// 1-based rank after sorting.
    pub rank: u32,
    /// Who.
    pub participant: ParticipantId,
    /// Display name.
    pub name: String,
    /// Simulated participant?
    pub is_bot: bool,
    /// Final score.
    pub score: u32,
    /// Correct answers.
    pub correct_count: u32,
    /// Wrong or missing answers.
    pub wrong_count: u32,
    /// `correct / (correct + wrong)` as a percentage; zero with no attempts.
    pub accuracy: f64,
    /// Longest consecutive-correct streak.
    pub longest_streak: u32,
    /// Rounds won as fastest correct responder.
    pub fastest_rounds: u32,
    /// Rounds survived before elimination (or all rounds played).
    pub rounds_survived: u32,
    /// Round of elimination, elimination variant only.
    pub eliminated_in: Option<u32>,
    /// Exactly one entry per session carries this.
    pub is_winner: bool,
}

/// The terminal record for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Which session.
    pub session: SessionId,
    /// Rounds actually played (may be fewer than configured when an
    /// elimination session ends early).
    pub rounds_played: u32,
    /// Ranked entries, rank 1 first.
    pub rankings: Vec<ParticipantResult>,
}

impl ResultsSummary {
    /// The winning entry, if the session had any participants.
    #[must_use]
    pub fn winner(&self) -> Option<&ParticipantResult> {
        self.rankings.iter().find(|r| r.is_winner)
    }

    /// Look up one participant's entry.
    #[must_use]
    pub fn entry_for(&self, id: ParticipantId) -> Option<&ParticipantResult> {
        self.rankings.iter().find(|r| r.participant == id)
    }
}

/// Compile the final rankings.
pub fn compile<'a, I>(
    session: SessionId,
    rules: &VariantRules,
    participants: I,
    rounds_played: u32,
) -> ResultsSummary
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut entries: Vec<&Participant> = participants.into_iter().collect();

    if rules.elimination {
        // Survivors first; among the eliminated, later is better.
        entries.sort_by(|a, b| {
            b.in_play()
                .cmp(&a.in_play())
                .then_with(|| {
                    let a_round = a.eliminated_in.unwrap_or(u32::MAX);
                    let b_round = b.eliminated_in.unwrap_or(u32::MAX);
                    b_round.cmp(&a_round)
                })
                .then_with(|| b.correct_count.cmp(&a.correct_count))
                .then_with(|| a.id.cmp(&b.id))
        });
    } else {
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.correct_count.cmp(&a.correct_count))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    let rankings: Vec<ParticipantResult> = entries
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let attempts = p.correct_count + p.wrong_count;
            let accuracy = if attempts == 0 {
                0.0
            } else {
                f64::from(p.correct_count) * 100.0 / f64::from(attempts)
            };
            ParticipantResult {
                rank: (i + 1) as u32,
                participant: p.id,
                name: p.name.clone(),
                is_bot: p.is_bot(),
                score: p.score,
                correct_count: p.correct_count,
                wrong_count: p.wrong_count,
                accuracy,
                longest_streak: p.best_streak,
                fastest_rounds: p.fastest_count,
                rounds_survived: p
                    .eliminated_in
                    .map_or(rounds_played, |r| r.saturating_sub(1)),
                eliminated_in: p.eliminated_in,
                is_winner: i == 0,
            }
        })
        .collect();

    ResultsSummary {
        session,
        rounds_played,
        rankings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionRng;
    use crate::variant;

    fn session_id() -> SessionId {
        SessionId::generate(&mut SessionRng::new(1))
    }

    fn player(id: u32, name: &str) -> Participant {
        Participant::human(ParticipantId::new(id), name)
    }

    #[test]
    fn test_score_ranking() {
        let mut a = player(0, "a");
        let mut b = player(1, "b");
        let mut c = player(2, "c");
        a.score = 300;
        b.score = 500;
        c.score = 100;

        let summary = compile(session_id(), &variant::battle::rules(), [&a, &b, &c], 10);

        let order: Vec<u32> = summary.rankings.iter().map(|r| r.participant.index()).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(summary.rankings[0].rank, 1);
        assert!(summary.rankings[0].is_winner);
        assert!(!summary.rankings[1].is_winner);
        assert_eq!(summary.winner().unwrap().participant, ParticipantId::new(1));
    }

    #[test]
    fn test_score_tie_breaks_on_correct_then_id() {
        let mut a = player(0, "a");
        let mut b = player(1, "b");
        a.score = 300;
        b.score = 300;
        a.correct_count = 3;
        b.correct_count = 5;

        let summary = compile(session_id(), &variant::battle::rules(), [&a, &b], 10);
        assert_eq!(summary.rankings[0].participant, ParticipantId::new(1));

        b.correct_count = 3;
        let summary = compile(session_id(), &variant::battle::rules(), [&a, &b], 10);
        assert_eq!(summary.rankings[0].participant, ParticipantId::new(0));
    }

    #[test]
    fn test_elimination_ranking() {
        let mut survivor = player(3, "survivor");
        survivor.correct_count = 5;

        let mut early = player(0, "early");
        early.eliminate(1);
        early.wrong_count = 1;

        let mut late = player(1, "late");
        late.eliminate(4);
        late.correct_count = 3;
        late.wrong_count = 1;

        let summary =
            compile(session_id(), &variant::quiz::rules(), [&early, &late, &survivor], 5);

        let order: Vec<u32> = summary.rankings.iter().map(|r| r.participant.index()).collect();
        assert_eq!(order, vec![3, 1, 0]);

        let winner = summary.winner().unwrap();
        assert_eq!(winner.participant, ParticipantId::new(3));
        assert_eq!(winner.rounds_survived, 5);
        assert_eq!(summary.entry_for(ParticipantId::new(1)).unwrap().rounds_survived, 3);
        assert_eq!(summary.entry_for(ParticipantId::new(0)).unwrap().eliminated_in, Some(1));
    }

    #[test]
    fn test_exactly_one_winner() {
        let players: Vec<Participant> = (0..6).map(|i| player(i, "p")).collect();
        let summary = compile(
            session_id(),
            &variant::battle::rules(),
            players.iter(),
            10,
        );

        assert_eq!(summary.rankings.iter().filter(|r| r.is_winner).count(), 1);
    }

    #[test]
    fn test_accuracy() {
        let mut p = player(0, "p");
        p.correct_count = 3;
        p.wrong_count = 1;
        let summary = compile(session_id(), &variant::battle::rules(), [&p], 4);
        assert_eq!(summary.rankings[0].accuracy, 75.0);

        let empty = player(1, "q");
        let summary = compile(session_id(), &variant::battle::rules(), [&empty], 4);
        assert_eq!(summary.rankings[0].accuracy, 0.0);
    }
}
