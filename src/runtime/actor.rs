//! One tokio task per live session.
//!
//! The actor owns its `Session` outright and serializes everything into it:
//! commands from handles, and timer firings from a `DelayQueue`. That is
//! the whole concurrency story — no lock, no shared state, every mutation
//! goes through `Session::apply` on this task.
//!
//! Timer hygiene: `ClearTimers` empties the queue on every phase
//! transition, and dropping the last handle (or a host leave) tears the
//! actor down with all timers in it. The in-session epoch guard backstops
//! both.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::time::DelayQueue;

use crate::abilities::AbilityKind;
use crate::content::{Answer, ContentItem};
use crate::core::{JoinCode, ParticipantId, SessionId, Timestamp};
use crate::phase::{ActionError, SideEffect, TimerKind};
use crate::results::ResultsSummary;
use crate::session::{CreateError, JoinError, Session, SessionSettings, SessionSnapshot};
use crate::variant::VariantRules;

/// Everything the actor publishes.
#[derive(Clone, Debug)]
pub enum SessionUpdate {
    /// Observable state changed.
    Snapshot(SessionSnapshot),
    /// Terminal results; sent exactly once, right before the stream ends.
    Results(ResultsSummary),
}

/// Failures for operations sent to a running session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("session is gone")]
    Gone,
}

enum Command {
    Join {
        name: String,
        reply: oneshot::Sender<Result<ParticipantId, JoinError>>,
    },
    Leave {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Start {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Submit {
        participant: ParticipantId,
        answer: Answer,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    SelectAbility {
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Advance {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<(), ActionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// A cloneable handle to a running session actor.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    code: JoinCode,
    commands: mpsc::Sender<Command>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    /// Session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Join code.
    #[must_use]
    pub fn join_code(&self) -> &JoinCode {
        &self.code
    }

    /// Subscribe to the update stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Join the session.
    pub async fn join(&self, name: impl Into<String>) -> Result<ParticipantId, JoinError> {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .commands
            .send(Command::Join {
                name: name.into(),
                reply,
            })
            .await;
        if sent.is_err() {
            return Err(JoinError::NotFound);
        }
        rx.await.unwrap_or(Err(JoinError::NotFound))
    }

    /// Leave the session.
    pub async fn leave(&self, participant: ParticipantId) -> Result<(), CommandError> {
        self.action(|reply| Command::Leave { participant, reply }).await
    }

    /// Host starts the session.
    pub async fn start(&self, participant: ParticipantId) -> Result<(), CommandError> {
        self.action(|reply| Command::Start { participant, reply }).await
    }

    /// Submit an answer.
    pub async fn submit_answer(
        &self,
        participant: ParticipantId,
        answer: Answer,
    ) -> Result<(), CommandError> {
        self.action(|reply| Command::Submit {
            participant,
            answer,
            reply,
        })
        .await
    }

    /// Make a bonus-phase selection.
    pub async fn select_ability(
        &self,
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
    ) -> Result<(), CommandError> {
        self.action(|reply| Command::SelectAbility {
            participant,
            ability,
            target,
            reply,
        })
        .await
    }

    /// Host pushes a display phase forward.
    pub async fn advance(&self, participant: ParticipantId) -> Result<(), CommandError> {
        self.action(|reply| Command::Advance { participant, reply }).await
    }

    /// Fetch a snapshot.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| CommandError::Gone)?;
        rx.await.map_err(|_| CommandError::Gone)
    }

    async fn action<F>(&self, make: F) -> Result<(), CommandError>
    where
        F: FnOnce(oneshot::Sender<Result<(), ActionError>>) -> Command,
    {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| CommandError::Gone)?;
        match rx.await {
            Ok(result) => result.map_err(CommandError::from),
            Err(_) => Err(CommandError::Gone),
        }
    }
}

/// Create a session and spawn its owning task.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(
    host_name: impl Into<String>,
    rules: VariantRules,
    settings: SessionSettings,
    pool: &[ContentItem],
    seed: u64,
) -> Result<SessionHandle, CreateError> {
    let (session, initial) =
        Session::create(host_name, rules, settings, pool, seed, Timestamp::ZERO)?;

    let id = session.id();
    let code = session.join_code().clone();
    let (commands, command_rx) = mpsc::channel(64);
    let (updates, _) = broadcast::channel(256);

    tokio::spawn(run_actor(session, initial, command_rx, updates.clone()));

    Ok(SessionHandle {
        id,
        code,
        commands,
        updates,
    })
}

async fn run_actor(
    mut session: Session,
    initial: Vec<SideEffect>,
    mut commands: mpsc::Receiver<Command>,
    updates: broadcast::Sender<SessionUpdate>,
) {
    let started = tokio::time::Instant::now();
    let mut timers: DelayQueue<(TimerKind, u64)> = DelayQueue::new();

    let now = Timestamp::ZERO;
    if absorb(&session, &updates, &mut timers, now, initial) {
        return;
    }

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    // Every handle is gone; the session is abandoned and
                    // the queue drops with the task
                    tracing::info!(session = %session.id(), "all handles dropped, session torn down");
                    break;
                };
                let now = Timestamp::from_millis(started.elapsed().as_millis() as u64);
                let effects = handle_command(&mut session, command, now);
                if absorb(&session, &updates, &mut timers, now, effects) {
                    break;
                }
            }
            Some(expired) = next_expired(&mut timers), if !timers.is_empty() => {
                let (kind, epoch) = expired.into_inner();
                let now = Timestamp::from_millis(started.elapsed().as_millis() as u64);
                let effects = session.timer_fired(kind, epoch, now);
                if absorb(&session, &updates, &mut timers, now, effects) {
                    break;
                }
            }
        }

        if session.phase().is_terminal() {
            break;
        }
    }
}

async fn next_expired(
    timers: &mut DelayQueue<(TimerKind, u64)>,
) -> Option<tokio_util::time::delay_queue::Expired<(TimerKind, u64)>> {
    std::future::poll_fn(|cx| timers.poll_expired(cx)).await
}

fn handle_command(session: &mut Session, command: Command, now: Timestamp) -> Vec<SideEffect> {
    match command {
        Command::Join { name, reply } => {
            let (result, effects) = match session.join(name, now) {
                Ok((id, effects)) => (Ok(id), effects),
                Err(err) => (Err(err), Vec::new()),
            };
            let _ = reply.send(result);
            effects
        }
        Command::Leave { participant, reply } => {
            let (result, effects) = split(session.leave(participant, now));
            let _ = reply.send(result);
            effects
        }
        Command::Start { participant, reply } => {
            let (result, effects) = split(session.start(participant, now));
            let _ = reply.send(result);
            effects
        }
        Command::Submit {
            participant,
            answer,
            reply,
        } => {
            let (result, effects) = split(session.submit_answer(participant, answer, now));
            let _ = reply.send(result);
            effects
        }
        Command::SelectAbility {
            participant,
            ability,
            target,
            reply,
        } => {
            let (result, effects) = split(session.select_ability(participant, ability, target, now));
            let _ = reply.send(result);
            effects
        }
        Command::Advance { participant, reply } => {
            let (result, effects) = split(session.advance(participant, now));
            let _ = reply.send(result);
            effects
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(SessionSnapshot::of(session, now));
            Vec::new()
        }
    }
}

fn split(result: Result<Vec<SideEffect>, ActionError>) -> (Result<(), ActionError>, Vec<SideEffect>) {
    match result {
        Ok(effects) => (Ok(()), effects),
        Err(err) => (Err(err), Vec::new()),
    }
}

/// Fold effects into the timer queue and the update stream. Returns true
/// when the session is closed and the actor should stop.
fn absorb(
    session: &Session,
    updates: &broadcast::Sender<SessionUpdate>,
    timers: &mut DelayQueue<(TimerKind, u64)>,
    now: Timestamp,
    effects: Vec<SideEffect>,
) -> bool {
    let mut closed = false;
    for effect in effects {
        match effect {
            SideEffect::Schedule { timer, after, epoch } => {
                // Zero-length windows still need to go through the queue
                timers.insert((timer, epoch), after.max(Duration::from_millis(1)));
            }
            SideEffect::ClearTimers => {
                timers.clear();
            }
            SideEffect::Snapshot => {
                let _ = updates.send(SessionUpdate::Snapshot(SessionSnapshot::of(session, now)));
            }
            SideEffect::Results(summary) => {
                let _ = updates.send(SessionUpdate::Results(summary));
            }
            SideEffect::Closed => {
                closed = true;
            }
        }
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::variant;
    use tokio::sync::broadcast::error::RecvError;

    fn pool(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem::new(format!("term{i}"), format!("def{i}")))
            .collect()
    }

    async fn wait_for_results(
        rx: &mut broadcast::Receiver<SessionUpdate>,
    ) -> Option<ResultsSummary> {
        loop {
            match rx.recv().await {
                Ok(SessionUpdate::Results(summary)) => return Some(summary),
                Ok(SessionUpdate::Snapshot(_)) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_filled_session_plays_to_results() {
        let handle = spawn_session(
            "host",
            variant::battle::rules(),
            SessionSettings::default().with_capacity(2, 4),
            &pool(12),
            42,
        )
        .unwrap();
        let mut updates = handle.subscribe();

        // Let both admission stages fire, then start
        tokio::time::sleep(Duration::from_secs(25)).await;
        let snap = handle.snapshot().await.unwrap();
        assert!(snap.participants.iter().filter(|p| p.is_bot).count() >= 1);

        handle.start(ParticipantId::new(0)).await.unwrap();

        // The host never answers; deadlines and bots drive the whole game
        let summary = wait_for_results(&mut updates).await.expect("results");
        assert_eq!(summary.rankings.len(), snap.participants.len());
        assert_eq!(summary.winner().unwrap().rank, 1);
        assert_eq!(summary.rounds_played, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_errors_come_back_through_the_handle() {
        let handle = spawn_session(
            "host",
            variant::battle::rules(),
            SessionSettings::default().with_bots(None),
            &pool(12),
            42,
        )
        .unwrap();

        let err = handle.start(ParticipantId::new(0)).await.unwrap_err();
        assert_eq!(
            err,
            CommandError::Action(ActionError::NotEnoughPlayers { have: 1, need: 2 })
        );

        let joined = handle.join("ada").await.unwrap();
        assert_eq!(joined, ParticipantId::new(1));
        assert_eq!(handle.join("ada").await.unwrap_err(), JoinError::NameTaken);
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_leave_tears_the_actor_down() {
        let handle = spawn_session(
            "host",
            variant::battle::rules(),
            SessionSettings::default(),
            &pool(12),
            42,
        )
        .unwrap();
        let mut updates = handle.subscribe();

        handle.leave(ParticipantId::new(0)).await.unwrap();

        // The stream ends without a Results record
        assert!(wait_for_results(&mut updates).await.is_none());
        assert_eq!(handle.snapshot().await.unwrap_err(), CommandError::Gone);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submissions_close_rounds_early() {
        let handle = spawn_session(
            "host",
            variant::quiz::rules(),
            SessionSettings::default()
                .with_bots(None)
                .with_rounds(1)
                .with_leaderboard_every(None),
            &pool(12),
            42,
        )
        .unwrap();
        let mut updates = handle.subscribe();

        let ada = handle.join("ada").await.unwrap();
        handle.start(ParticipantId::new(0)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::Question);
        let correct = Answer::Choice(0);

        // Both submit; wrong answers are fine, the round just closes
        handle.submit_answer(ParticipantId::new(0), correct.clone()).await.unwrap();
        handle.submit_answer(ada, correct).await.unwrap();

        let summary = wait_for_results(&mut updates).await.expect("results");
        assert_eq!(summary.rounds_played, 1);
    }
}
