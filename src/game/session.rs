//! Round orchestration over time.
//!
//! A [`Session`] owns the engine and the three timer families of a round:
//! the movement tick, the power-up spawn/expiry pair and the timed-mode
//! countdown. Time is measured on a round clock that only moves while the
//! round is running. Every transition that leaves the running phase cancels
//! all timers before anything new is armed, so no timer from a superseded
//! round can fire. Pausing sets the pending deadlines aside and resuming
//! re-arms them, so each task keeps whatever time it had left.

use std::time::Duration;

use super::{
    action::Direction,
    engine::{GameEngine, TickInfo},
    error::EngineError,
    policy::ModePolicy,
    schedule::{Task, Timers},
    state::{Difficulty, Mode, RoundState},
};

/// What a call to [`Session::advance`] produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub ticks: Vec<TickInfo>,
    pub round_ended: bool,
}

pub struct Session {
    engine: GameEngine,
    timers: Timers,
    /// Deadlines set aside by a pause; the clock is frozen meanwhile
    suspended: Timers,
    clock_ms: u64,
}

impl Session {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine,
            timers: Timers::new(),
            suspended: Timers::new(),
            clock_ms: 0,
        }
    }

    pub fn start_round(
        &mut self,
        mode: Mode,
        difficulty: Difficulty,
    ) -> Result<RoundState, EngineError> {
        self.timers.cancel_all();
        self.suspended.cancel_all();
        self.clock_ms = 0;
        let state = self.engine.start_round(mode, difficulty)?;
        self.arm_all();
        Ok(state)
    }

    /// Start again with the current mode and difficulty
    pub fn restart(&mut self) -> Result<RoundState, EngineError> {
        let state = self.engine.state();
        let (mode, difficulty) = (state.mode, state.difficulty);
        self.start_round(mode, difficulty)
    }

    /// Abandon the round and return to the not-started layout
    pub fn reset(&mut self) -> Result<RoundState, EngineError> {
        self.timers.cancel_all();
        self.suspended.cancel_all();
        self.clock_ms = 0;
        self.engine.reset()
    }

    pub fn set_direction(&mut self, agent: usize, direction: Direction) {
        self.engine.set_direction(agent, direction);
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.engine.pause();
        if changed {
            self.suspended = std::mem::take(&mut self.timers);
        }
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.engine.resume();
        if changed {
            if self.suspended.is_idle() {
                self.arm_all();
            } else {
                self.timers = std::mem::take(&mut self.suspended);
            }
        }
        changed
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.engine.state().is_running() {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Move the round clock forward by `elapsed`, firing every task that
    /// falls due on the way in deadline order. Does nothing unless running.
    pub fn advance(&mut self, elapsed: Duration) -> Result<AdvanceReport, EngineError> {
        let mut report = AdvanceReport::default();
        if !self.engine.state().is_running() {
            return Ok(report);
        }

        let target = self.clock_ms + elapsed.as_millis() as u64;
        while let Some((task, at)) = self.timers.pop_due(target) {
            self.move_clock_to(at);
            let fired = self.fire(task, &mut report);
            if fired.is_err() || !self.engine.state().is_running() {
                self.timers.cancel_all();
                report.round_ended = true;
                fired?;
                return Ok(report);
            }
        }
        self.move_clock_to(target);

        Ok(report)
    }

    /// Time until the next pending task, if any
    pub fn time_until_next(&self) -> Option<Duration> {
        self.timers
            .next_deadline()
            .map(|at| Duration::from_millis(at.saturating_sub(self.clock_ms)))
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn state(&self) -> &RoundState {
        self.engine.state()
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    fn move_clock_to(&mut self, at_ms: u64) {
        if at_ms <= self.clock_ms {
            return;
        }
        let elapsed = Duration::from_millis(at_ms - self.clock_ms);
        self.clock_ms = at_ms;
        self.engine.advance_effects(elapsed);
    }

    fn fire(&mut self, task: Task, report: &mut AdvanceReport) -> Result<(), EngineError> {
        let config = self.engine.config();
        let (spawn_ms, lifetime_ms, countdown_ms) = (
            config.power_up_spawn_ms,
            config.power_up_lifetime_ms,
            config.countdown_period_ms,
        );

        match task {
            Task::Movement => {
                let info = self.engine.step()?;
                if info.collected.is_some() {
                    self.timers.cancel(Task::PowerUpExpiry);
                }
                report.ticks.push(info);
                // Interval changes apply from the next tick on
                let interval = self.engine.tick_interval().as_millis() as u64;
                self.timers.arm(Task::Movement, self.clock_ms + interval);
            }
            Task::Countdown => {
                self.engine.count_down();
                self.timers.arm(Task::Countdown, self.clock_ms + countdown_ms);
            }
            Task::PowerUpSpawn => {
                if self.engine.spawn_power_up(self.clock_ms)?.is_some() {
                    self.timers
                        .arm(Task::PowerUpExpiry, self.clock_ms + lifetime_ms);
                }
                self.timers.arm(Task::PowerUpSpawn, self.clock_ms + spawn_ms);
            }
            Task::PowerUpExpiry => {
                if let Some(power_up) = self.engine.state().power_up {
                    self.engine.expire_power_up(power_up.spawned_at_ms);
                }
            }
        }
        Ok(())
    }

    /// Arm every timer family a freshly started round needs, relative to now
    fn arm_all(&mut self) {
        self.timers.cancel_all();
        if !self.engine.state().is_running() {
            return;
        }

        let config = self.engine.config();
        let now = self.clock_ms;
        let interval = self.engine.tick_interval().as_millis() as u64;
        let spawn_at = now + config.power_up_spawn_ms;
        let countdown_at = now + config.countdown_period_ms;
        let expiry_at = self
            .engine
            .state()
            .power_up
            .map(|p| (p.spawned_at_ms + config.power_up_lifetime_ms).max(now));

        self.timers.arm(Task::Movement, now + interval);
        self.timers.arm(Task::PowerUpSpawn, spawn_at);
        if ModePolicy::new(self.engine.state().mode).has_countdown() {
            self.timers.arm(Task::Countdown, countdown_at);
        }
        if let Some(at) = expiry_at {
            self.timers.arm(Task::PowerUpExpiry, at);
        }
    }
}
