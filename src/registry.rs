//! The session registry.
//!
//! The synchronous inbound surface: create/join/leave/start/submit/select/
//! advance, plus a deterministic timer queue per session. Drivers (and
//! tests) move a virtual clock forward with `advance_to`, and every due
//! timer fires in due order with its own due time as "now" — wall-clock
//! deployments use the tokio actor in `runtime` instead, but the guard
//! discipline is identical.
//!
//! Join codes are generated here and collision-checked against currently
//! open sessions; a code frees up as soon as its session terminates.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::abilities::AbilityKind;
use crate::content::{Answer, ContentItem};
use crate::core::{JoinCode, ParticipantId, SessionId, SessionRng, Timestamp};
use crate::phase::{ActionError, SideEffect, TimerKind};
use crate::results::ResultsSummary;
use crate::session::{CreateError, JoinError, Session, SessionSettings, SessionSnapshot};
use crate::variant::VariantRules;

/// Registry-level failures for operations addressed by session id.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown session")]
    UnknownSession,

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// One armed timer.
#[derive(Clone, Debug)]
struct PendingTimer {
    due: Timestamp,
    seq: u64,
    kind: TimerKind,
    epoch: u64,
}

impl PartialEq for PendingTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for PendingTimer {}

impl PartialOrd for PendingTimer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTimer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Deterministic timer queue: due order, then arming order.
#[derive(Debug, Default)]
struct TimerQueue {
    heap: BinaryHeap<Reverse<PendingTimer>>,
    seq: u64,
}

impl TimerQueue {
    fn arm(&mut self, now: Timestamp, after: std::time::Duration, kind: TimerKind, epoch: u64) {
        self.seq += 1;
        self.heap.push(Reverse(PendingTimer {
            due: now + after,
            seq: self.seq,
            kind,
            epoch,
        }));
    }

    fn clear(&mut self) {
        self.heap.clear();
    }

    fn pop_due(&mut self, now: Timestamp) -> Option<PendingTimer> {
        if self.heap.peek().is_some_and(|Reverse(t)| t.due <= now) {
            self.heap.pop().map(|Reverse(t)| t)
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

struct SessionEntry {
    session: Session,
    timers: TimerQueue,
    closed: bool,
}

impl SessionEntry {
    /// Fold a batch of side effects into the timer queue.
    fn absorb(&mut self, now: Timestamp, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Schedule { timer, after, epoch } => {
                    self.timers.arm(now, after, timer, epoch);
                }
                SideEffect::ClearTimers => self.timers.clear(),
                SideEffect::Closed => {
                    self.timers.clear();
                    self.closed = true;
                }
                // The sync surface is pull-based: snapshots are rendered on
                // demand and results are read off the session
                SideEffect::Snapshot | SideEffect::Results(_) => {}
            }
        }
    }
}

/// All open sessions, addressed by id or join code.
pub struct SessionRegistry {
    sessions: FxHashMap<SessionId, SessionEntry>,
    codes: FxHashMap<JoinCode, SessionId>,
    rng: SessionRng,
    seed_counter: u64,
}

impl SessionRegistry {
    /// A registry whose code generation and session seeds derive from one
    /// seed, so whole multi-session runs are replayable.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            sessions: FxHashMap::default(),
            codes: FxHashMap::default(),
            rng: SessionRng::new(seed).for_context("registry"),
            seed_counter: seed,
        }
    }

    /// Create a session and register its join code.
    pub fn create_session(
        &mut self,
        host_name: impl Into<String>,
        rules: VariantRules,
        settings: SessionSettings,
        pool: &[ContentItem],
        now: Timestamp,
    ) -> Result<(SessionId, JoinCode), CreateError> {
        self.seed_counter = self.seed_counter.wrapping_add(1);
        let seed = self.seed_counter;

        let (mut session, effects) = Session::create(host_name, rules, settings, pool, seed, now)?;

        // Collision-check the code against open sessions
        while self.codes.contains_key(&session.code) {
            session.code = JoinCode::generate(&mut self.rng);
        }

        let id = session.id();
        let code = session.join_code().clone();
        self.codes.insert(code.clone(), id);

        let mut entry = SessionEntry {
            session,
            timers: TimerQueue::default(),
            closed: false,
        };
        entry.absorb(now, effects);
        self.sessions.insert(id, entry);

        Ok((id, code))
    }

    /// Join by code.
    pub fn join(
        &mut self,
        code: &str,
        name: impl Into<String>,
        now: Timestamp,
    ) -> Result<(SessionId, ParticipantId), JoinError> {
        let code = JoinCode::parse(code).ok_or(JoinError::NotFound)?;
        let id = *self.codes.get(&code).ok_or(JoinError::NotFound)?;
        let entry = self.sessions.get_mut(&id).ok_or(JoinError::NotFound)?;

        let (participant, effects) = entry.session.join(name, now)?;
        entry.absorb(now, effects);
        Ok((id, participant))
    }

    /// Leave a session.
    pub fn leave(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_session(session, now, |s, now| s.leave(participant, now))
    }

    /// Host starts a session.
    pub fn start(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_session(session, now, |s, now| s.start(participant, now))
    }

    /// Submit an answer.
    pub fn submit_answer(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        answer: Answer,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_session(session, now, |s, now| s.submit_answer(participant, answer, now))
    }

    /// Make a bonus-phase selection.
    pub fn select_ability(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_session(session, now, |s, now| {
            s.select_ability(participant, ability, target, now)
        })
    }

    /// Host pushes a display phase forward.
    pub fn advance(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_session(session, now, |s, now| s.advance(participant, now))
    }

    /// Fire every timer due at or before `now`, in due order, using each
    /// timer's own due time as its "now". Stale timers die on the epoch
    /// guard inside the session.
    pub fn advance_to(&mut self, now: Timestamp) {
        let ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        for id in ids {
            loop {
                let Some(entry) = self.sessions.get_mut(&id) else {
                    break;
                };
                let Some(timer) = entry.timers.pop_due(now) else {
                    break;
                };
                let effects = entry.session.timer_fired(timer.kind, timer.epoch, timer.due);
                entry.absorb(timer.due, effects);
                self.reap(id);
            }
        }
    }

    /// Render a session as of `now`.
    #[must_use]
    pub fn snapshot(&self, session: SessionId, now: Timestamp) -> Option<SessionSnapshot> {
        self.sessions
            .get(&session)
            .map(|entry| SessionSnapshot::of(&entry.session, now))
    }

    /// Terminal results for a finished session.
    #[must_use]
    pub fn results(&self, session: SessionId) -> Option<&ResultsSummary> {
        self.sessions.get(&session)?.session.results()
    }

    /// Read access to a session.
    #[must_use]
    pub fn session(&self, session: SessionId) -> Option<&Session> {
        self.sessions.get(&session).map(|e| &e.session)
    }

    /// Number of open (non-terminal) sessions.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|e| !e.session.phase().is_terminal())
            .count()
    }

    /// Pending timer count for a session. Test and debugging aid; the
    /// cancellation tests pin the leak discipline with this.
    #[must_use]
    pub fn pending_timers(&self, session: SessionId) -> usize {
        self.sessions.get(&session).map_or(0, |e| e.timers.len())
    }

    fn with_session<F>(&mut self, id: SessionId, now: Timestamp, op: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Session, Timestamp) -> Result<Vec<SideEffect>, ActionError>,
    {
        let entry = self
            .sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession)?;
        let effects = op(&mut entry.session, now)?;
        entry.absorb(now, effects);
        self.reap(id);
        Ok(())
    }

    /// Free the join code of a terminated session and drop abandoned ones.
    fn reap(&mut self, id: SessionId) {
        let Some(entry) = self.sessions.get(&id) else {
            return;
        };
        if entry.session.phase().is_terminal() {
            self.codes.remove(entry.session.join_code());
            tracing::debug!(session = %id, "join code released");
        }
        if entry.closed {
            self.sessions.remove(&id);
            tracing::info!(session = %id, "session dropped");
        }
    }
}
