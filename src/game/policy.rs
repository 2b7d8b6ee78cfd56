//! Per-mode rules: wraparound, collisions, scoring and round outcome

use std::collections::BTreeSet;

use super::grid::{Grid, Position};
use super::state::{CollisionType, Difficulty, Mode, Snake};

/// Fixed award per food item in two-player rounds
pub const MULTIPLAYER_POINTS: u32 = 10;

/// Effect flags that bend the collision rules for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionModifiers {
    pub phase: bool,
    pub invulnerable: bool,
}

/// What happens to one agent this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Move(Position),
    /// Invulnerable agent blocked by a wall, obstacle or body; it stays put
    Hold,
    Fatal(CollisionType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    mode: Mode,
}

impl ModePolicy {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn wraps(&self, modifiers: CollisionModifiers) -> bool {
        modifiers.phase || self.mode == Mode::NoWalls
    }

    pub fn has_obstacles(&self) -> bool {
        self.mode == Mode::Maze
    }

    pub fn has_countdown(&self) -> bool {
        self.mode == Mode::Timed
    }

    /// Only single-agent, untimed rounds compete for the stored best score
    pub fn tracks_best_score(&self) -> bool {
        matches!(self.mode, Mode::Classic | Mode::Maze | Mode::NoWalls)
    }

    pub fn food_points(&self, difficulty: Difficulty, double_points: bool) -> u32 {
        match self.mode {
            Mode::Multiplayer => MULTIPLAYER_POINTS,
            _ if double_points => difficulty.base_points() * 2,
            _ => difficulty.base_points(),
        }
    }

    /// Candidate head for `snake` along its committed direction, wrapped
    /// when the rules allow it
    pub fn candidate_head(
        &self,
        snake: &Snake,
        grid: &Grid,
        modifiers: CollisionModifiers,
    ) -> Position {
        snake.next_head(grid, self.wraps(modifiers))
    }

    /// Judge agent `agent` moving to `candidates[agent]`. Every slice holds
    /// the pre-tick snapshot, so the verdict does not depend on which agent
    /// is judged first. An invulnerable agent never dies: whatever would have
    /// killed it makes it hold its cell for the tick instead.
    pub fn judge(
        &self,
        grid: &Grid,
        obstacles: &BTreeSet<Position>,
        snakes: &[Snake],
        candidates: &[Position],
        agent: usize,
        modifiers: CollisionModifiers,
    ) -> Verdict {
        match self.collision(grid, obstacles, snakes, candidates, agent) {
            None => Verdict::Move(candidates[agent]),
            Some(_) if modifiers.invulnerable => Verdict::Hold,
            Some(collision) => Verdict::Fatal(collision),
        }
    }

    fn collision(
        &self,
        grid: &Grid,
        obstacles: &BTreeSet<Position>,
        snakes: &[Snake],
        candidates: &[Position],
        agent: usize,
    ) -> Option<CollisionType> {
        let head = candidates[agent];

        if !grid.in_bounds(head) {
            return Some(CollisionType::Wall);
        }

        if self.has_obstacles() && obstacles.contains(&head) {
            return Some(CollisionType::Obstacle);
        }

        if snakes[agent].will_collide_self(head) {
            return Some(CollisionType::SelfCollision);
        }

        if self.mode == Mode::Multiplayer {
            // The other agent's whole pre-tick body counts, so a held agent
            // is never walked into
            let hits_opponent = snakes
                .iter()
                .zip(candidates)
                .enumerate()
                .filter(|(other, _)| *other != agent)
                .any(|(_, (snake, &other_head))| {
                    snake.body.contains(&head) || other_head == head
                });
            if hits_opponent {
                return Some(CollisionType::Opponent);
            }
        }

        None
    }

    /// Winner after the agents in `crashed` died in the same tick. A lone
    /// crash hands the round to the other agent; a mutual crash has none.
    pub fn winner(&self, agent_count: usize, crashed: &[usize]) -> Option<usize> {
        if self.mode != Mode::Multiplayer || crashed.len() != 1 {
            return None;
        }
        (0..agent_count).find(|agent| !crashed.contains(agent))
    }
}
