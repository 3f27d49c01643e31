//! The transition function.
//!
//! `Session::apply` is the single entry point for every mutation after
//! creation: host actions, submissions, ability picks, and timer firings
//! all funnel through it. Each call checks the guard for the current
//! phase, mutates, and returns the side effects the driver must act on.
//! Guard failures split two ways per the error design: operations that
//! should never have been sent are `Err` (validation), inputs that simply
//! lost a race are `Ok(vec![])` (idempotent discard).

use std::time::Duration;

use crate::abilities::{AbilityKind, WheelReward};
use crate::bots;
use crate::content::Answer;
use crate::core::{ParticipantId, Timestamp};
use crate::results;
use crate::scoring;
use crate::session::log::{AnswerRecord, RoundResult};
use crate::session::participant::BotProfile;
use crate::session::session::Session;
use crate::session::settings::BotSettings;
use crate::variant::BonusSelection;

use super::{ActionError, Event, Phase, SideEffect, TimerKind};

impl Session {
    /// Apply one event as of `now`.
    ///
    /// This is the whole transition table: (phase, event) in, (new state,
    /// side effects) out. Pure with respect to time; drivers own the
    /// clock and the timers.
    pub fn apply(&mut self, event: Event, now: Timestamp) -> Result<Vec<SideEffect>, ActionError> {
        match event {
            Event::Start { participant } => self.handle_start(participant, now),
            Event::Submit { participant, answer } => self.handle_submit(participant, answer, now),
            Event::SelectAbility {
                participant,
                ability,
                target,
            } => self.handle_select(participant, ability, target, now),
            Event::Advance { participant } => self.handle_advance(participant, now),
            Event::Timer { kind, epoch } => Ok(self.handle_timer(kind, epoch, now)),
        }
    }

    /// Host starts the session.
    pub fn start(
        &mut self,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        self.apply(Event::Start { participant }, now)
    }

    /// Submit an answer for the open round.
    pub fn submit_answer(
        &mut self,
        participant: ParticipantId,
        answer: Answer,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        self.apply(Event::Submit { participant, answer }, now)
    }

    /// Make a bonus-phase selection.
    ///
    /// In wheel variants the pick is the spin; `ability` and `target` are
    /// ignored and the wheel decides.
    pub fn select_ability(
        &mut self,
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        self.apply(
            Event::SelectAbility {
                participant,
                ability,
                target,
            },
            now,
        )
    }

    /// Host pushes a reveal or leaderboard forward.
    pub fn advance(
        &mut self,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        self.apply(Event::Advance { participant }, now)
    }

    /// A scheduled timer fired. Never fails: stale or mistargeted firings
    /// are no-ops.
    pub fn timer_fired(&mut self, kind: TimerKind, epoch: u64, now: Timestamp) -> Vec<SideEffect> {
        self.handle_timer(kind, epoch, now)
    }

    /// A participant leaves.
    ///
    /// The host leaving abandons the whole session. Others are removed
    /// outright while waiting, or marked `left` once play started; if the
    /// leaver was the last answer the round was waiting on, the round
    /// closes now.
    pub fn leave(
        &mut self,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        if !self.roster.contains_key(&participant) {
            return Err(ActionError::UnknownParticipant);
        }

        if participant == self.host {
            self.phase = Phase::Finished;
            self.phase_deadline = None;
            self.epoch += 1;
            tracing::info!(session = %self.id(), "session abandoned by host");
            return Ok(vec![SideEffect::ClearTimers, SideEffect::Closed]);
        }

        let mut effects = vec![SideEffect::Snapshot];
        if self.phase == Phase::Waiting {
            self.roster.remove(&participant);
        } else {
            if let Some(p) = self.roster.get_mut(&participant) {
                p.left = true;
            }
            match self.phase {
                Phase::Question if self.all_answered() => {
                    effects.extend(self.close_round(now));
                }
                Phase::Bonus if self.all_picked() => {
                    effects.extend(self.leave_bonus(now));
                }
                _ => {}
            }
        }
        Ok(effects)
    }

    // === Event handlers ===

    fn handle_start(
        &mut self,
        actor: ParticipantId,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        if !self.roster.contains_key(&actor) {
            return Err(ActionError::UnknownParticipant);
        }
        if actor != self.host {
            return Err(ActionError::NotHost);
        }
        if self.phase != Phase::Waiting {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let have = self.participant_count();
        let need = self.settings.min_players;
        if have < need {
            return Err(ActionError::NotEnoughPlayers { have, need });
        }

        tracing::info!(session = %self.id(), participants = have, "session started");
        self.transition(Phase::Starting, now);
        let countdown = self.settings.countdown;
        self.phase_deadline = Some(now + countdown);
        Ok(vec![
            SideEffect::ClearTimers,
            self.schedule(TimerKind::Countdown, countdown),
            SideEffect::Snapshot,
        ])
    }

    fn handle_submit(
        &mut self,
        participant: ParticipantId,
        answer: Answer,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        if !self.roster.contains_key(&participant) {
            return Err(ActionError::UnknownParticipant);
        }
        match self.phase {
            Phase::Question => {}
            // Before any round is open the submission is a caller bug
            Phase::Waiting | Phase::Starting => return Err(ActionError::WrongPhase(self.phase)),
            // After the round closed it lost a race; drop it silently
            _ => return Ok(Vec::new()),
        }

        let round = &self.rounds[self.round_index];
        let correct = round.is_correct(&answer);
        let latency = now.since(self.phase_started_at);

        let Some(p) = self.roster.get_mut(&participant) else {
            return Err(ActionError::UnknownParticipant);
        };
        if !p.can_answer() {
            return Err(ActionError::NotEligible);
        }
        if p.has_submitted() {
            return Err(ActionError::AlreadySubmitted);
        }
        p.record_answer(answer, latency, correct);

        let mut effects = vec![SideEffect::Snapshot];
        if self.all_answered() {
            effects.extend(self.close_round(now));
        }
        Ok(effects)
    }

    fn handle_select(
        &mut self,
        participant: ParticipantId,
        ability: AbilityKind,
        target: Option<ParticipantId>,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        if !self.roster.contains_key(&participant) {
            return Err(ActionError::UnknownParticipant);
        }
        match self.phase {
            Phase::Bonus => {}
            Phase::Waiting | Phase::Starting => return Err(ActionError::WrongPhase(self.phase)),
            _ => return Ok(Vec::new()),
        }
        {
            let p = &self.roster[&participant];
            if !p.can_answer() {
                return Err(ActionError::NotEligible);
            }
            if p.bonus_picked {
                return Err(ActionError::AlreadyPicked);
            }
        }

        match self.rules.bonus.clone() {
            BonusSelection::None => Err(ActionError::AbilityNotOffered),
            BonusSelection::Pick(menu) => {
                if !menu.contains(&ability) {
                    return Err(ActionError::AbilityNotOffered);
                }
                if ability.requires_target() {
                    let Some(target) = target else {
                        return Err(ActionError::MissingTarget);
                    };
                    let valid = target != participant
                        && self.roster.get(&target).is_some_and(|t| t.in_play());
                    if !valid {
                        return Err(ActionError::UnknownTarget);
                    }
                    self.apply_targeted(participant, ability, target);
                } else {
                    let turns = self.settings.scoring.ability_turns;
                    if let Some(p) = self.roster.get_mut(&participant) {
                        p.abilities.grant(ability, turns);
                    }
                }
                Ok(self.complete_pick(participant, now))
            }
            BonusSelection::Wheel(wheel) => {
                let reward = wheel.spin(&mut self.wheel_rng);
                tracing::debug!(session = %self.id(), participant = %participant, ?reward, "wheel spun");
                self.apply_wheel(participant, reward);
                Ok(self.complete_pick(participant, now))
            }
        }
    }

    fn handle_advance(
        &mut self,
        actor: ParticipantId,
        now: Timestamp,
    ) -> Result<Vec<SideEffect>, ActionError> {
        if !self.roster.contains_key(&actor) {
            return Err(ActionError::UnknownParticipant);
        }
        if actor != self.host {
            return Err(ActionError::NotHost);
        }
        match self.phase {
            Phase::Reveal => Ok(self.leave_reveal(now)),
            Phase::Leaderboard => Ok(self.next_round(now)),
            other => Err(ActionError::WrongPhase(other)),
        }
    }

    fn handle_timer(&mut self, kind: TimerKind, epoch: u64, now: Timestamp) -> Vec<SideEffect> {
        if epoch != self.epoch {
            tracing::trace!(session = %self.id(), ?kind, "stale timer dropped");
            return Vec::new();
        }

        match (kind, self.phase) {
            (TimerKind::Countdown, Phase::Starting) => self.enter_question(now),
            (TimerKind::RoundDeadline, Phase::Question) => self.close_round(now),
            (TimerKind::RevealDelay, Phase::Reveal) => self.leave_reveal(now),
            (TimerKind::BonusDeadline, Phase::Bonus) => self.leave_bonus(now),
            (TimerKind::LeaderboardDelay, Phase::Leaderboard) => self.next_round(now),
            (TimerKind::BotAnswer { participant, answer }, Phase::Question) => {
                // A bot that got blocked or eliminated since planning just
                // misses the round
                self.handle_submit(participant, answer, now).unwrap_or_default()
            }
            (TimerKind::BotBonusPick { participant }, Phase::Bonus) => {
                self.bot_pick(participant, now)
            }
            (TimerKind::BotAdmission { stage }, Phase::Waiting) => self.bot_admission(stage),
            _ => Vec::new(),
        }
    }

    // === Transitions ===

    fn transition(&mut self, phase: Phase, now: Timestamp) {
        self.phase = phase;
        self.phase_started_at = now;
        self.phase_deadline = None;
        self.epoch += 1;
    }

    fn schedule(&self, timer: TimerKind, after: Duration) -> SideEffect {
        SideEffect::Schedule {
            timer,
            after,
            epoch: self.epoch,
        }
    }

    fn bot_settings(&self) -> BotSettings {
        self.settings.bots.clone().unwrap_or_default()
    }

    /// Open the round at `round_index`.
    fn enter_question(&mut self, now: Timestamp) -> Vec<SideEffect> {
        self.transition(Phase::Question, now);
        for p in self.roster.values_mut() {
            p.reset_round();
        }

        let round = self.rounds[self.round_index].clone();
        let limit = round.time_limit;
        self.phase_deadline = Some(now + limit);

        let mut effects = vec![
            SideEffect::ClearTimers,
            self.schedule(TimerKind::RoundDeadline, limit),
        ];

        let bot_settings = self.bot_settings();
        let plans: Vec<(ParticipantId, BotProfile, bool)> = self
            .roster
            .values()
            .filter(|p| p.can_answer())
            .filter_map(|p| {
                p.bot
                    .map(|profile| (p.id, profile, p.abilities.active(AbilityKind::Slow)))
            })
            .collect();
        for (id, profile, slowed) in plans {
            let plan = bots::plan_answer(&profile, slowed, &round, &bot_settings, &mut self.bot_rng);
            effects.push(self.schedule(
                TimerKind::BotAnswer {
                    participant: id,
                    answer: plan.answer,
                },
                plan.delay,
            ));
        }

        effects.push(SideEffect::Snapshot);
        effects
    }

    /// Everyone who can still answer has.
    fn all_answered(&self) -> bool {
        self.roster
            .values()
            .filter(|p| p.can_answer())
            .all(|p| p.has_submitted())
    }

    /// Everyone eligible has made a bonus selection.
    fn all_picked(&self) -> bool {
        self.roster
            .values()
            .filter(|p| p.can_answer())
            .all(|p| p.bonus_picked)
    }

    /// Close the open round: score everyone in play, append the log entry,
    /// and move to the reveal.
    fn close_round(&mut self, now: Timestamp) -> Vec<SideEffect> {
        let round = self.rounds[self.round_index].clone();
        let round_number = self.round_number();
        self.transition(Phase::Reveal, now);

        let fastest = scoring::fastest_correct(
            self.roster
                .values()
                .filter(|p| p.in_play() && p.answer_correct == Some(true))
                .map(|p| (p.id, p.latency.unwrap_or(round.time_limit))),
        );

        let scoring_cfg = self.settings.scoring;
        let elimination = self.rules.elimination;

        let ids: Vec<ParticipantId> = self.in_play().map(|p| p.id).collect();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(p) = self.roster.get_mut(&id) else {
                continue;
            };
            let is_fastest = fastest == Some(id);
            let mut eliminated = false;

            let delta = if p.answer_correct == Some(true) {
                let streak = p.note_correct();
                let latency = p.latency.unwrap_or(round.time_limit);
                let doubled = p.abilities.active(AbilityKind::DoublePoints);
                let mut points =
                    scoring::correct_points(&scoring_cfg, latency, round.time_limit, streak, doubled);
                if is_fastest {
                    points = points.saturating_add(scoring_cfg.fastest_bonus);
                    p.fastest_count += 1;
                }
                p.add_points(points)
            } else {
                p.note_wrong();
                let delta = if p.abilities.active(AbilityKind::Shield) {
                    // Suppressed; penalty suppression does not consume it
                    0
                } else {
                    p.deduct_points(scoring_cfg.wrong_penalty)
                };
                if elimination {
                    p.eliminate(round_number);
                    eliminated = true;
                }
                delta
            };

            records.push(AnswerRecord {
                participant: id,
                submitted: p.submitted.clone(),
                correct: p.answer_correct == Some(true),
                latency: p.latency,
                points_delta: delta,
                fastest: is_fastest,
                eliminated,
            });
        }

        self.round_log.push_back(RoundResult {
            round_number,
            correct: round.correct.clone(),
            records,
        });
        tracing::debug!(session = %self.id(), round = round_number, "round closed");

        let mut effects = vec![SideEffect::ClearTimers];
        if !self.settings.host_paced {
            let delay = self.settings.reveal_delay;
            self.phase_deadline = Some(now + delay);
            effects.push(self.schedule(TimerKind::RevealDelay, delay));
        }
        effects.push(SideEffect::Snapshot);
        effects
    }

    /// Reveal is over: finish, open the bonus phase, or move along.
    fn leave_reveal(&mut self, now: Timestamp) -> Vec<SideEffect> {
        if self.rules.elimination && self.in_play_count() <= 1 {
            return self.finish(now);
        }
        let is_bonus = self.rounds[self.round_index].is_bonus;
        if is_bonus && self.rules.has_bonus_phase() {
            return self.enter_bonus(now);
        }
        self.post_display(now)
    }

    /// After reveal or bonus: finish, show the leaderboard, or next round.
    fn post_display(&mut self, now: Timestamp) -> Vec<SideEffect> {
        if self.round_index + 1 >= self.settings.round_count {
            return self.finish(now);
        }
        if let Some(every) = self.settings.leaderboard_every {
            if self.round_number() % every as u32 == 0 {
                return self.enter_leaderboard(now);
            }
        }
        self.next_round(now)
    }

    fn enter_bonus(&mut self, now: Timestamp) -> Vec<SideEffect> {
        self.transition(Phase::Bonus, now);
        let window = self.settings.bonus_window;
        self.phase_deadline = Some(now + window);

        let mut effects = vec![
            SideEffect::ClearTimers,
            self.schedule(TimerKind::BonusDeadline, window),
        ];

        let bot_settings = self.bot_settings();
        let bot_ids: Vec<ParticipantId> = self
            .roster
            .values()
            .filter(|p| p.is_bot() && p.can_answer())
            .map(|p| p.id)
            .collect();
        for id in bot_ids {
            let delay = bots::plan_bonus_delay(&bot_settings, &mut self.bot_rng);
            effects.push(self.schedule(TimerKind::BotBonusPick { participant: id }, delay));
        }

        effects.push(SideEffect::Snapshot);
        effects
    }

    fn leave_bonus(&mut self, now: Timestamp) -> Vec<SideEffect> {
        self.post_display(now)
    }

    fn enter_leaderboard(&mut self, now: Timestamp) -> Vec<SideEffect> {
        self.transition(Phase::Leaderboard, now);
        let mut effects = vec![SideEffect::ClearTimers];
        if !self.settings.host_paced {
            let delay = self.settings.leaderboard_delay;
            self.phase_deadline = Some(now + delay);
            effects.push(self.schedule(TimerKind::LeaderboardDelay, delay));
        }
        effects.push(SideEffect::Snapshot);
        effects
    }

    /// Advance to the next round: bump the index, tick every status
    /// counter exactly once, and open the question.
    fn next_round(&mut self, now: Timestamp) -> Vec<SideEffect> {
        self.round_index += 1;
        for p in self.roster.values_mut() {
            p.abilities.tick();
        }
        self.enter_question(now)
    }

    /// Terminal transition. Compiles results exactly once.
    fn finish(&mut self, now: Timestamp) -> Vec<SideEffect> {
        let rounds_played = self.round_number();
        self.transition(Phase::Finished, now);
        self.round_index += 1;

        let summary = results::compile(self.id(), &self.rules, self.roster.values(), rounds_played);
        self.results = Some(summary.clone());
        tracing::info!(session = %self.id(), rounds = rounds_played, "session finished");

        vec![
            SideEffect::ClearTimers,
            SideEffect::Snapshot,
            SideEffect::Results(summary),
        ]
    }

    // === Selections ===

    /// Steal, block, slow, disconnect: applied to the target immediately.
    fn apply_targeted(&mut self, actor: ParticipantId, ability: AbilityKind, target: ParticipantId) {
        let turns = self.settings.scoring.ability_turns;
        match ability {
            AbilityKind::Steal => {
                let stolen = {
                    let Some(t) = self.roster.get_mut(&target) else {
                        return;
                    };
                    if t.abilities.consume_shield() {
                        // Shield absorbs the steal and is spent
                        None
                    } else {
                        let amount = self.settings.scoring.steal_amount.min(t.score);
                        t.deduct_points(amount);
                        Some(amount)
                    }
                };
                if let (Some(amount), Some(a)) = (stolen, self.roster.get_mut(&actor)) {
                    a.add_points(amount);
                }
            }
            AbilityKind::Block | AbilityKind::Slow | AbilityKind::Disconnect => {
                if let Some(t) = self.roster.get_mut(&target) {
                    t.abilities.grant(ability, turns);
                }
            }
            AbilityKind::Shield | AbilityKind::DoublePoints => {}
        }
    }

    fn apply_wheel(&mut self, participant: ParticipantId, reward: WheelReward) {
        let Some(p) = self.roster.get_mut(&participant) else {
            return;
        };
        match reward {
            WheelReward::Points(points) => {
                p.add_points(points);
            }
            WheelReward::Ability(kind, turns) => {
                p.abilities.grant(kind, turns);
            }
            WheelReward::Nothing => {}
        }
    }

    /// Mark the pick made and close the phase early when it was the last.
    fn complete_pick(&mut self, participant: ParticipantId, now: Timestamp) -> Vec<SideEffect> {
        if let Some(p) = self.roster.get_mut(&participant) {
            p.bonus_picked = true;
        }
        let mut effects = vec![SideEffect::Snapshot];
        if self.all_picked() {
            effects.extend(self.leave_bonus(now));
        }
        effects
    }

    /// A bot's planned bonus selection comes due.
    fn bot_pick(&mut self, participant: ParticipantId, now: Timestamp) -> Vec<SideEffect> {
        let eligible = self
            .roster
            .get(&participant)
            .is_some_and(|p| p.can_answer() && !p.bonus_picked);
        if !eligible {
            return Vec::new();
        }

        match self.rules.bonus.clone() {
            BonusSelection::None => Vec::new(),
            BonusSelection::Pick(menu) => {
                let others: Vec<ParticipantId> = self
                    .roster
                    .values()
                    .filter(|p| p.in_play() && p.id != participant)
                    .map(|p| p.id)
                    .collect();
                let menu: Vec<AbilityKind> = if others.is_empty() {
                    menu.into_iter().filter(|a| !a.requires_target()).collect()
                } else {
                    menu
                };

                if let Some(ability) = bots::pick_ability(&menu, &mut self.bot_rng) {
                    if ability.requires_target() {
                        if let Some(target) = bots::pick_target(&others, &mut self.bot_rng) {
                            self.apply_targeted(participant, ability, target);
                        }
                    } else {
                        let turns = self.settings.scoring.ability_turns;
                        if let Some(p) = self.roster.get_mut(&participant) {
                            p.abilities.grant(ability, turns);
                        }
                    }
                }
                self.complete_pick(participant, now)
            }
            BonusSelection::Wheel(wheel) => {
                let reward = wheel.spin(&mut self.wheel_rng);
                self.apply_wheel(participant, reward);
                self.complete_pick(participant, now)
            }
        }
    }

    /// A bot admission stage comes due while the session still waits.
    fn bot_admission(&mut self, stage: usize) -> Vec<SideEffect> {
        let Some(count) = self
            .settings
            .bots
            .as_ref()
            .and_then(|b| b.fill_stages.get(stage))
            .map(|(_, count)| *count)
        else {
            return Vec::new();
        };

        if self.admit_bots(count).is_empty() {
            Vec::new()
        } else {
            vec![SideEffect::Snapshot]
        }
    }
}
