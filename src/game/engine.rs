use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;

use super::{
    action::Direction,
    config::GameConfig,
    effects::{EffectKind, EffectRegistry},
    error::EngineError,
    grid::{Grid, Position},
    policy::{CollisionModifiers, ModePolicy, Verdict},
    spawn::{generate_obstacles, place_random, spawn_points},
    state::{CollisionType, Difficulty, Mode, OverReason, Phase, PowerUp, RoundState, Snake},
};
use crate::persistence::ScoreStore;

/// Information about a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInfo {
    /// Agents that ate food this tick
    pub fed: Vec<usize>,
    /// Power-up collected this tick
    pub collected: Option<EffectKind>,
    /// Fatal collisions, by agent
    pub collisions: Vec<(usize, CollisionType)>,
}

/// Lay out a fresh round in [`Phase::NotStarted`]
pub fn build_round<R: Rng + ?Sized>(
    config: &GameConfig,
    mode: Mode,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<RoundState, EngineError> {
    let grid = Grid::new(config.grid_size);
    let spawns = spawn_points(mode, &grid);
    let snakes: Vec<Snake> = spawns
        .iter()
        .map(|&(head, direction)| Snake::new(head, direction, 1))
        .collect();

    let obstacles = if ModePolicy::new(mode).has_obstacles() {
        let starts: Vec<Position> = spawns.iter().map(|&(head, _)| head).collect();
        generate_obstacles(rng, &grid, config, &starts)
    } else {
        BTreeSet::new()
    };

    let mut exclusions: HashSet<Position> = obstacles.iter().copied().collect();
    exclusions.extend(snakes.iter().flat_map(|snake| snake.body.iter().copied()));
    let food = place_random(rng, &grid, &exclusions, config.placement_attempts)?;

    Ok(RoundState {
        mode,
        difficulty,
        grid,
        scores: vec![0; snakes.len()],
        snakes,
        food,
        power_up: None,
        obstacles,
        time_left: (mode == Mode::Timed).then_some(config.timed_round_secs),
        effects: BTreeMap::new(),
        phase: Phase::NotStarted,
        winner: None,
        crashed: Vec::new(),
        over_reason: None,
        ticks: 0,
    })
}

/// Advance every agent by one cell.
///
/// Both agents propose their move from `prev` before anything is committed,
/// so neither sees the other's updated position. Any fatal verdict ends the
/// round with the bodies left as they were.
pub fn resolve_tick<R: Rng + ?Sized>(
    prev: &RoundState,
    config: &GameConfig,
    rng: &mut R,
) -> Result<(RoundState, TickInfo), EngineError> {
    let policy = ModePolicy::new(prev.mode);
    let modifiers = CollisionModifiers {
        phase: prev.effect_active(EffectKind::Phase),
        invulnerable: prev.effect_active(EffectKind::Invulnerable),
    };

    // Propose
    let snakes: Vec<Snake> = prev.snakes.iter().map(Snake::committed).collect();
    let candidates: Vec<Position> = snakes
        .iter()
        .map(|snake| policy.candidate_head(snake, &prev.grid, modifiers))
        .collect();
    let verdicts: Vec<Verdict> = (0..snakes.len())
        .map(|agent| {
            policy.judge(
                &prev.grid,
                &prev.obstacles,
                &snakes,
                &candidates,
                agent,
                modifiers,
            )
        })
        .collect();

    let collisions: Vec<(usize, CollisionType)> = verdicts
        .iter()
        .enumerate()
        .filter_map(|(agent, verdict)| match verdict {
            Verdict::Fatal(collision) => Some((agent, *collision)),
            _ => None,
        })
        .collect();

    let mut next = prev.clone();
    next.ticks += 1;

    if let Some(&(_, first)) = collisions.first() {
        let crashed: Vec<usize> = collisions.iter().map(|&(agent, _)| agent).collect();
        next.winner = policy.winner(snakes.len(), &crashed);
        next.snakes = snakes;
        next.crashed = crashed;
        next.phase = Phase::Over;
        next.over_reason = Some(OverReason::Collision(first));
        let info = TickInfo {
            collisions,
            ..TickInfo::default()
        };
        return Ok((next, info));
    }

    // Commit
    let points = policy.food_points(prev.difficulty, prev.effect_active(EffectKind::DoublePoints));
    let mut info = TickInfo::default();
    let mut moved = Vec::with_capacity(snakes.len());
    for (agent, (snake, verdict)) in snakes.iter().zip(&verdicts).enumerate() {
        let Verdict::Move(head) = *verdict else {
            moved.push(snake.clone());
            continue;
        };

        if let Some(power_up) = next.power_up.filter(|p| p.position == head) {
            next.power_up = None;
            info.collected = Some(power_up.kind);
        }

        let eats = head == prev.food;
        if eats {
            next.scores[agent] += points;
            info.fed.push(agent);
        }
        moved.push(snake.advanced(head, eats));
    }
    next.snakes = moved;

    if !info.fed.is_empty() {
        let mut exclusions: HashSet<Position> = next.obstacles.iter().copied().collect();
        exclusions.extend(next.snakes.iter().flat_map(|snake| snake.body.iter().copied()));
        if let Some(power_up) = next.power_up {
            exclusions.insert(power_up.position);
        }
        next.food = place_random(rng, &next.grid, &exclusions, config.placement_attempts)?;
    }

    Ok((next, info))
}

/// The game engine that owns the round and applies every state transition
pub struct GameEngine {
    config: GameConfig,
    state: RoundState,
    effects: EffectRegistry,
    store: Box<dyn ScoreStore>,
    rng: ThreadRng,
}

impl GameEngine {
    /// Create an engine holding an idle classic round at the stored difficulty
    pub fn new(config: GameConfig, store: Box<dyn ScoreStore>) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = rand::thread_rng();
        let state = build_round(&config, Mode::Classic, store.difficulty(), &mut rng)?;
        let effects = EffectRegistry::new(&config);

        Ok(Self {
            config,
            state,
            effects,
            store,
            rng,
        })
    }

    pub fn start_round(
        &mut self,
        mode: Mode,
        difficulty: Difficulty,
    ) -> Result<RoundState, EngineError> {
        let mut state = build_round(&self.config, mode, difficulty, &mut self.rng)?;
        state.phase = Phase::Running;
        self.state = state;
        self.effects.clear();

        if let Err(error) = self.store.set_difficulty(difficulty) {
            tracing::warn!(?error, "failed to persist difficulty");
        }
        tracing::info!(
            ?mode,
            ?difficulty,
            obstacles = self.state.obstacles.len(),
            "round started"
        );

        Ok(self.state.clone())
    }

    /// Discard the current round and lay out a fresh one that has not started
    pub fn reset(&mut self) -> Result<RoundState, EngineError> {
        self.state = build_round(
            &self.config,
            self.state.mode,
            self.state.difficulty,
            &mut self.rng,
        )?;
        self.effects.clear();
        Ok(self.state.clone())
    }

    /// Queue a turn for `agent`. Reversals, unknown agents and input outside
    /// a running round are ignored.
    pub fn set_direction(&mut self, agent: usize, direction: Direction) {
        if !self.state.is_running() {
            return;
        }
        if let Some(snake) = self.state.snakes.get_mut(agent) {
            if !snake.steer(direction) {
                tracing::trace!(agent, ?direction, "reversal ignored");
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.state.phase = Phase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase != Phase::Paused {
            return false;
        }
        self.state.phase = Phase::Running;
        true
    }

    /// Flip between running and paused; returns whether anything changed
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::NotStarted | Phase::Over => false,
        }
    }

    /// Run one tick and return the new snapshot
    pub fn tick(&mut self) -> Result<RoundState, EngineError> {
        self.step()?;
        Ok(self.state.clone())
    }

    /// Run one tick and report what happened in it. No-op unless running.
    pub fn step(&mut self) -> Result<TickInfo, EngineError> {
        if !self.state.is_running() {
            return Ok(TickInfo::default());
        }

        let (next, info) = match resolve_tick(&self.state, &self.config, &mut self.rng) {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::error!(%error, "placement failed, ending round");
                self.end_round(OverReason::Capacity);
                return Err(error);
            }
        };
        self.state = next;

        if let Some(kind) = info.collected {
            self.effects.activate(kind);
            self.state.effects = self.effects.snapshot();
            tracing::debug!(?kind, "power-up collected");
        }
        if !info.fed.is_empty() {
            self.record_best_score();
        }
        if self.state.is_over() {
            tracing::info!(
                reason = ?self.state.over_reason,
                scores = ?self.state.scores,
                winner = ?self.state.winner,
                "game over"
            );
        }

        Ok(info)
    }

    /// One second of the timed-mode countdown; returns the seconds left
    pub fn count_down(&mut self) -> Option<u32> {
        if !self.state.is_running() {
            return self.state.time_left;
        }
        let left = self.state.time_left?.saturating_sub(1);
        self.state.time_left = Some(left);
        if left == 0 {
            self.end_round(OverReason::TimeUp);
            tracing::info!(scores = ?self.state.scores, "time up");
        }
        Some(left)
    }

    /// Put a random power-up on a free cell if none is on the board
    pub fn spawn_power_up(&mut self, now_ms: u64) -> Result<Option<PowerUp>, EngineError> {
        if !self.state.is_running() || self.state.power_up.is_some() {
            return Ok(None);
        }

        let kind = EffectKind::ALL[self.rng.gen_range(0..EffectKind::ALL.len())];
        let position = match place_random(
            &mut self.rng,
            &self.state.grid,
            &self.state.occupied_cells(),
            self.config.placement_attempts,
        ) {
            Ok(position) => position,
            Err(error) => {
                tracing::error!(%error, "no room for a power-up, ending round");
                self.end_round(OverReason::Capacity);
                return Err(error);
            }
        };

        let power_up = PowerUp {
            position,
            kind,
            spawned_at_ms: now_ms,
        };
        self.state.power_up = Some(power_up);
        tracing::debug!(?kind, x = position.x, y = position.y, "power-up spawned");
        Ok(Some(power_up))
    }

    /// Remove the power-up spawned at `spawned_at_ms` if it is still uncollected
    pub fn expire_power_up(&mut self, spawned_at_ms: u64) -> bool {
        match self.state.power_up {
            Some(power_up) if power_up.spawned_at_ms == spawned_at_ms => {
                self.state.power_up = None;
                tracing::debug!(kind = ?power_up.kind, "power-up expired");
                true
            }
            _ => false,
        }
    }

    /// Run effect countdowns forward; returns the kinds that ran out
    pub fn advance_effects(&mut self, elapsed: Duration) -> Vec<EffectKind> {
        let expired = self.effects.advance(elapsed);
        if !expired.is_empty() {
            self.state.effects = self.effects.snapshot();
            tracing::debug!(?expired, "effects expired");
        }
        expired
    }

    /// Current movement interval: the difficulty's base, stretched while
    /// slow motion is active
    pub fn tick_interval(&self) -> Duration {
        let base = self.state.difficulty.base_interval();
        if self.effects.is_active(EffectKind::SlowMotion) {
            let stretched = base.as_millis() as f64 * self.config.slow_motion_factor;
            Duration::from_millis(stretched.round() as u64)
        } else {
            base
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &dyn ScoreStore {
        self.store.as_ref()
    }

    pub fn high_score(&self) -> u32 {
        self.store.high_score()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut RoundState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn activate_effect(&mut self, kind: EffectKind) {
        self.effects.activate(kind);
        self.state.effects = self.effects.snapshot();
    }

    fn end_round(&mut self, reason: OverReason) {
        self.state.phase = Phase::Over;
        self.state.over_reason = Some(reason);
    }

    fn record_best_score(&mut self) {
        if !ModePolicy::new(self.state.mode).tracks_best_score() {
            return;
        }
        let score = self.state.top_score();
        if score <= self.store.high_score() {
            return;
        }
        match self.store.set_high_score(score) {
            Ok(()) => tracing::info!(score, "new high score"),
            Err(error) => tracing::warn!(?error, "failed to persist high score"),
        }
    }
}
