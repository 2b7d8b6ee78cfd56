use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;

use super::action::Direction;
use super::effects::EffectKind;
use super::grid::{Grid, Position};

/// Ruleset chosen at round start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Mode {
    /// Walls and food
    Classic,
    /// Classic with random obstacles
    Maze,
    /// Sixty seconds on the clock
    Timed,
    /// Edges wrap around
    NoWalls,
    /// Two players on one keyboard
    Multiplayer,
}

impl Mode {
    pub fn agent_count(&self) -> usize {
        match self {
            Mode::Multiplayer => 2,
            _ => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Classic => "Classic",
            Mode::Maze => "Maze",
            Mode::Timed => "Timed",
            Mode::NoWalls => "No Walls",
            Mode::Multiplayer => "Two Player",
        }
    }
}

/// Speed tier; also decides points per food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn base_interval(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(200),
            Difficulty::Normal => Duration::from_millis(150),
            Difficulty::Hard => Duration::from_millis(100),
        }
    }

    pub fn base_points(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 10,
            Difficulty::Hard => 15,
        }
    }

    /// The next tier, wrapping from hard back to easy
    pub fn next(&self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    Over,
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Agent left the grid with no wraparound available
    Wall,
    /// Agent hit a maze obstacle
    Obstacle,
    /// Agent hit itself
    SelfCollision,
    /// Agent hit the other agent
    Opponent,
}

/// Why a round reached [`Phase::Over`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverReason {
    Collision(CollisionType),
    TimeUp,
    /// The grid ran out of free cells for placement
    Capacity,
}

/// The snake: body segments, head at index 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub body: Vec<Position>,
    /// Direction used by the next tick
    pub direction: Direction,
    /// Latest accepted input, promoted to `direction` at the tick boundary
    pub pending: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self {
            body,
            direction,
            pending: direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Record a requested turn. A 180-degree reversal of the committed
    /// direction is refused; returns whether the request was kept.
    pub fn steer(&mut self, requested: Direction) -> bool {
        if self.direction.is_opposite(requested) {
            return false;
        }
        self.pending = requested;
        true
    }

    /// Promote the pending direction for the coming tick
    pub fn committed(&self) -> Snake {
        Snake {
            body: self.body.clone(),
            direction: self.pending,
            pending: self.pending,
        }
    }

    /// Candidate head one step along the committed direction
    pub fn next_head(&self, grid: &Grid, wrap: bool) -> Position {
        let head = self.head().moved_in_direction(self.direction);
        if wrap {
            grid.wrap(head)
        } else {
            head
        }
    }

    /// Checked against the body before the tail is dropped, so moving onto
    /// the cell the tail is vacating still counts
    pub fn will_collide_self(&self, new_head: Position) -> bool {
        self.body_segments().contains(&new_head)
    }

    /// New snapshot with `new_head` prepended; the tail stays only when growing
    pub fn advanced(&self, new_head: Position, grow: bool) -> Snake {
        let mut body = Vec::with_capacity(self.body.len() + 1);
        body.push(new_head);
        body.extend_from_slice(&self.body);
        if !grow {
            body.pop();
        }
        Snake {
            body,
            direction: self.direction,
            pending: self.pending,
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Power-up waiting on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub position: Position,
    pub kind: EffectKind,
    /// Round-clock time of the spawn, in milliseconds
    pub spawned_at_ms: u64,
}

/// Complete round state, the simulation truth handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub grid: Grid,
    pub snakes: Vec<Snake>,
    pub food: Position,
    pub power_up: Option<PowerUp>,
    pub obstacles: BTreeSet<Position>,
    pub scores: Vec<u32>,
    /// Seconds left; only set in timed mode
    pub time_left: Option<u32>,
    pub effects: BTreeMap<EffectKind, bool>,
    pub phase: Phase,
    pub winner: Option<usize>,
    /// Agents that suffered a fatal collision
    pub crashed: Vec<usize>,
    pub over_reason: Option<OverReason>,
    pub ticks: u64,
}

impl RoundState {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn effect_active(&self, kind: EffectKind) -> bool {
        self.effects.get(&kind).copied().unwrap_or(false)
    }

    /// Every cell a new entity must avoid
    pub fn occupied_cells(&self) -> HashSet<Position> {
        let mut cells: HashSet<Position> = self
            .snakes
            .iter()
            .flat_map(|snake| snake.body.iter().copied())
            .collect();
        cells.extend(self.obstacles.iter().copied());
        cells.insert(self.food);
        if let Some(power_up) = self.power_up {
            cells.insert(power_up.position);
        }
        cells
    }

    /// Highest single score, used for best-score bookkeeping
    pub fn top_score(&self) -> u32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_names() {
        assert_eq!(Mode::from_str("no-walls", false), Ok(Mode::NoWalls));
        assert_eq!(Mode::from_str("Maze", true), Ok(Mode::Maze));
        assert_eq!(Difficulty::from_str("hard", false), Ok(Difficulty::Hard));
        assert!(Difficulty::from_str("insane", false).is_err());
    }

    #[test]
    fn test_difficulty_tiers() {
        assert_eq!(Difficulty::default(), Difficulty::Normal);
        assert_eq!(Difficulty::Easy.base_points(), 5);
        assert_eq!(Difficulty::Hard.base_interval(), Duration::from_millis(100));
        assert_eq!(Difficulty::Normal.next(), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.body[1], Position::new(4, 5));
        assert_eq!(snake.body[2], Position::new(3, 5));
    }

    #[test]
    fn test_snake_advanced() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);

        let moved = snake.advanced(Position::new(6, 5), false);
        assert_eq!(moved.len(), 3);
        assert_eq!(moved.head(), Position::new(6, 5));
        assert_eq!(moved.body[2], Position::new(4, 5));

        let grown = moved.advanced(Position::new(7, 5), true);
        assert_eq!(grown.len(), 4);
        assert_eq!(grown.body[3], Position::new(4, 5));

        // The original snapshot is untouched
        assert_eq!(snake.head(), Position::new(5, 5));
    }

    #[test]
    fn test_steer_rejects_reversal() {
        let mut snake = Snake::new(Position::new(8, 8), Direction::Right, 1);

        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.pending, Direction::Right);

        assert!(snake.steer(Direction::Down));
        assert_eq!(snake.pending, Direction::Down);
        assert_eq!(snake.direction, Direction::Right);

        assert!(snake.steer(Direction::Right));
        assert_eq!(snake.pending, Direction::Right);
    }

    #[test]
    fn test_steer_checks_committed_direction() {
        let mut snake = Snake::new(Position::new(8, 8), Direction::Right, 3);

        // Up then Left within one tick must not fold the snake back on itself
        assert!(snake.steer(Direction::Up));
        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.committed().direction, Direction::Up);
    }

    #[test]
    fn test_next_head_wraps_when_enabled() {
        let grid = Grid::new(20);
        let snake = Snake::new(Position::new(19, 4), Direction::Right, 1);

        assert_eq!(snake.next_head(&grid, false), Position::new(20, 4));
        assert_eq!(snake.next_head(&grid, true), Position::new(0, 4));
    }

    #[test]
    fn test_self_collision_includes_tail() {
        // Body: (5,5) (5,6) (4,6) (4,5); head can step left onto the tail
        let snake = Snake {
            body: vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(4, 6),
                Position::new(4, 5),
            ],
            direction: Direction::Left,
            pending: Direction::Left,
        };

        assert!(snake.will_collide_self(Position::new(4, 5)));
        assert!(!snake.will_collide_self(Position::new(5, 4)));
        assert!(!snake.will_collide_self(Position::new(5, 5)));
    }
}
