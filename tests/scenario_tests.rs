//! End-to-end session scenarios.
//!
//! These drive full games through the registry's virtual clock: no real
//! timers, every firing deterministic, every timestamp chosen by the test.

use rust_minigames::variant;
use rust_minigames::{
    Answer, ContentItem, ParticipantId, Phase, SessionId, SessionRegistry, SessionSettings,
    Timestamp,
};

fn pool(n: usize) -> Vec<ContentItem> {
    (0..n)
        .map(|i| ContentItem::new(format!("term{i}"), format!("def{i}")))
        .collect()
}

fn ts(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

fn correct_answer(registry: &SessionRegistry, id: SessionId) -> Answer {
    registry
        .session(id)
        .unwrap()
        .current_round()
        .unwrap()
        .correct
        .clone()
}

fn wrong_choice(registry: &SessionRegistry, id: SessionId) -> Answer {
    let round = registry.session(id).unwrap().current_round().unwrap();
    let correct = round.correct_index().unwrap();
    Answer::Choice((correct + 1) % round.options.len())
}

/// Three participants, ten rounds, everyone correct every round with
/// distinct latencies: all accuracies are 100 and the final scores are
/// strictly ordered by cumulative speed bonus.
#[test]
fn test_trivia_battle_happy_path() {
    let mut registry = SessionRegistry::new(11);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_bonus_every(None)
        .with_leaderboard_every(None);
    let (id, code) = registry
        .create_session("host", variant::battle::rules(), settings, &pool(12), ts(0))
        .unwrap();
    registry.join(code.as_str(), "ada", ts(0)).unwrap();
    registry.join(code.as_str(), "bob", ts(0)).unwrap();

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Question);

    // Each round opens, three correct answers land at 11s/12s/13s, the
    // round closes on the last, and the reveal elapses 4s later.
    let mut open = 3_000u64;
    for round in 0..10 {
        assert_eq!(registry.session(id).unwrap().round_index(), round);
        let answer = correct_answer(&registry, id);

        registry
            .submit_answer(id, ParticipantId::new(0), answer.clone(), ts(open + 11_000))
            .unwrap();
        registry
            .submit_answer(id, ParticipantId::new(1), answer.clone(), ts(open + 12_000))
            .unwrap();
        registry
            .submit_answer(id, ParticipantId::new(2), answer, ts(open + 13_000))
            .unwrap();
        assert_eq!(registry.session(id).unwrap().phase(), Phase::Reveal);

        registry.advance_to(ts(open + 17_000));
        open += 17_000;
    }

    let session = registry.session(id).unwrap();
    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.round_index(), 10);
    assert_eq!(session.round_log().len(), 10);

    let summary = registry.results(id).unwrap();
    assert_eq!(summary.rankings.len(), 3);
    assert_eq!(summary.rounds_played, 10);

    for entry in &summary.rankings {
        assert_eq!(entry.accuracy, 100.0);
        assert_eq!(entry.correct_count, 10);
        assert_eq!(entry.longest_streak, 10);
    }

    // Per round: base 100, speed bonus 45/40/35, streak 10k, fastest +25
    // to the host. Totals come out strictly speed-ordered.
    let host = summary.entry_for(ParticipantId::new(0)).unwrap();
    let ada = summary.entry_for(ParticipantId::new(1)).unwrap();
    let bob = summary.entry_for(ParticipantId::new(2)).unwrap();
    assert_eq!(host.score, 2_250);
    assert_eq!(ada.score, 1_950);
    assert_eq!(bob.score, 1_900);
    assert!(host.score > ada.score && ada.score > bob.score);
    assert_eq!(host.rank, 1);
    assert!(host.is_winner);
    assert_eq!(host.fastest_rounds, 10);
}

/// Five participants; one is eliminated per round until a sole survivor
/// remains, and the session ends early with the survivor as winner.
#[test]
fn test_elimination_to_sole_survivor() {
    let mut registry = SessionRegistry::new(13);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_capacity(2, 8)
        .with_leaderboard_every(None);
    let (id, code) = registry
        .create_session("host", variant::quiz::rules(), settings, &pool(12), ts(0))
        .unwrap();
    for name in ["ada", "bob", "carol", "dave"] {
        registry.join(code.as_str(), name, ts(0)).unwrap();
    }

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));

    // Rounds 1..=4: the highest-id living participant answers wrong
    let mut open = 3_000u64;
    for loser in [4u32, 3, 2, 1] {
        let answer = correct_answer(&registry, id);
        let bad = wrong_choice(&registry, id);

        for pid in 0..=loser {
            let submitted = if pid == loser { bad.clone() } else { answer.clone() };
            registry
                .submit_answer(id, ParticipantId::new(pid), submitted, ts(open + 5_000))
                .unwrap();
        }
        assert_eq!(registry.session(id).unwrap().phase(), Phase::Reveal);
        assert_eq!(
            registry
                .session(id)
                .unwrap()
                .participant(ParticipantId::new(loser))
                .unwrap()
                .alive,
            false
        );

        registry.advance_to(ts(open + 9_000));
        open += 9_000;
    }

    // After round 4 only the host lives; the reveal exit finished the game
    let session = registry.session(id).unwrap();
    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.round_index(), 4);

    let summary = registry.results(id).unwrap();
    assert_eq!(summary.rounds_played, 4);

    let winner = summary.winner().unwrap();
    assert_eq!(winner.participant, ParticipantId::new(0));
    assert_eq!(winner.rank, 1);
    assert!(winner.is_winner);
    assert_eq!(winner.rounds_survived, 4);

    // Elimination order ranks latest-out highest
    let order: Vec<u32> = summary
        .rankings
        .iter()
        .map(|r| r.participant.index())
        .collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
    assert_eq!(
        summary.entry_for(ParticipantId::new(4)).unwrap().eliminated_in,
        Some(1)
    );
    assert_eq!(
        summary.entry_for(ParticipantId::new(4)).unwrap().rounds_survived,
        0
    );
}

/// A round times out with zero submissions: every active participant takes
/// the missing-answer penalty exactly once.
#[test]
fn test_timeout_with_no_submissions() {
    let mut registry = SessionRegistry::new(17);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_bonus_every(None)
        .with_leaderboard_every(None);
    let (id, code) = registry
        .create_session("host", variant::battle::rules(), settings, &pool(12), ts(0))
        .unwrap();
    registry.join(code.as_str(), "ada", ts(0)).unwrap();
    registry.join(code.as_str(), "bob", ts(0)).unwrap();

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));

    // Round 1: everyone answers fast to bank some points
    let answer = correct_answer(&registry, id);
    for pid in 0..3 {
        registry
            .submit_answer(id, ParticipantId::new(pid), answer.clone(), ts(5_000))
            .unwrap();
    }
    registry.advance_to(ts(9_000));
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Question);

    // Round 2: nobody answers; the deadline closes it at 29s
    registry.advance_to(ts(29_000));
    let session = registry.session(id).unwrap();
    assert_eq!(session.phase(), Phase::Reveal);
    assert_eq!(session.round_log().len(), 2);

    let result = &session.round_log()[1];
    assert_eq!(result.records.len(), 3);
    for record in &result.records {
        assert!(record.submitted.is_none());
        assert!(!record.correct);
        assert_eq!(record.points_delta, -50);
    }

    // Round 1 paid 160 (+25 fastest for the host); round 2 took 50 back
    for (pid, expected) in [(0, 135), (1, 110), (2, 110)] {
        let p = session.participant(ParticipantId::new(pid)).unwrap();
        assert_eq!(p.score, expected);
        assert_eq!(p.wrong_count, 1);
        assert_eq!(p.streak, 0);
    }
}

/// Host-paced sessions hold the reveal forever until the host advances.
#[test]
fn test_host_paced_reveal_waits_for_advance() {
    let mut registry = SessionRegistry::new(19);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_bonus_every(None)
        .with_leaderboard_every(None)
        .host_paced();
    let (id, code) = registry
        .create_session("host", variant::battle::rules(), settings, &pool(12), ts(0))
        .unwrap();
    registry.join(code.as_str(), "ada", ts(0)).unwrap();

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));

    let answer = correct_answer(&registry, id);
    registry
        .submit_answer(id, ParticipantId::new(0), answer.clone(), ts(5_000))
        .unwrap();
    registry
        .submit_answer(id, ParticipantId::new(1), answer, ts(5_000))
        .unwrap();
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Reveal);

    // No reveal timer armed; a day passes and nothing moves
    assert_eq!(registry.pending_timers(id), 0);
    registry.advance_to(ts(86_400_000));
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Reveal);

    registry
        .advance(id, ParticipantId::new(0), ts(86_400_000))
        .unwrap();
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Question);
    assert_eq!(registry.session(id).unwrap().round_index(), 1);
}

/// The typing race compares typed answers after normalization.
#[test]
fn test_typing_race_normalizes_answers() {
    let mut registry = SessionRegistry::new(23);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_bonus_every(None)
        .with_leaderboard_every(None);
    let (id, code) = registry
        .create_session("host", variant::typing::rules(), settings, &pool(8), ts(0))
        .unwrap();
    registry.join(code.as_str(), "ada", ts(0)).unwrap();

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));

    let Answer::Text(correct) = correct_answer(&registry, id) else {
        panic!("typing race rounds carry text answers");
    };

    // Sloppy but right; and confidently wrong
    registry
        .submit_answer(
            id,
            ParticipantId::new(0),
            Answer::Text(format!("  {} ", correct.to_uppercase())),
            ts(5_000),
        )
        .unwrap();
    registry
        .submit_answer(
            id,
            ParticipantId::new(1),
            Answer::Text("wrong".to_string()),
            ts(6_000),
        )
        .unwrap();

    let session = registry.session(id).unwrap();
    let result = &session.round_log()[0];
    assert!(result.record_for(ParticipantId::new(0)).unwrap().correct);
    assert!(!result.record_for(ParticipantId::new(1)).unwrap().correct);
    assert!(result.record_for(ParticipantId::new(0)).unwrap().points_delta > 0);
    assert_eq!(result.record_for(ParticipantId::new(1)).unwrap().points_delta, -50);
}

/// Leaderboard rounds appear on their cadence and pace the session without
/// touching scores.
#[test]
fn test_leaderboard_cadence() {
    let mut registry = SessionRegistry::new(29);
    let settings = SessionSettings::default()
        .with_bots(None)
        .with_bonus_every(None)
        .with_rounds(4)
        .with_leaderboard_every(Some(2));
    let (id, code) = registry
        .create_session("host", variant::battle::rules(), settings, &pool(12), ts(0))
        .unwrap();
    registry.join(code.as_str(), "ada", ts(0)).unwrap();

    registry.start(id, ParticipantId::new(0), ts(0)).unwrap();
    registry.advance_to(ts(3_000));

    let mut open = 3_000u64;
    let mut saw_leaderboard = 0;
    for round in 0..4 {
        let answer = correct_answer(&registry, id);
        for pid in 0..2 {
            registry
                .submit_answer(id, ParticipantId::new(pid), answer.clone(), ts(open + 5_000))
                .unwrap();
        }
        // Reveal elapses at +4s
        registry.advance_to(ts(open + 9_000));

        if round == 1 {
            // Round 2 is a leaderboard round
            assert_eq!(registry.session(id).unwrap().phase(), Phase::Leaderboard);
            saw_leaderboard += 1;
            registry.advance_to(ts(open + 14_000));
            open += 14_000;
        } else if round < 3 {
            assert_eq!(registry.session(id).unwrap().phase(), Phase::Question);
            open += 9_000;
        }
    }

    assert_eq!(saw_leaderboard, 1);
    assert_eq!(registry.session(id).unwrap().phase(), Phase::Finished);
    assert_eq!(registry.results(id).unwrap().rounds_played, 4);
}
