//! Placement of food, power-ups, obstacles and starting agents

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

use super::action::Direction;
use super::config::GameConfig;
use super::error::EngineError;
use super::grid::{Grid, Position};
use super::state::Mode;

/// Draw uniformly until a free cell turns up. After `attempts` misses the
/// free cells are scanned directly, so a saturated grid fails instead of
/// spinning forever.
pub fn place_random<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    exclusions: &HashSet<Position>,
    attempts: usize,
) -> Result<Position, EngineError> {
    let size = grid.size() as i32;
    for _ in 0..attempts {
        let pos = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if !exclusions.contains(&pos) {
            return Ok(pos);
        }
    }

    let free: Vec<Position> = grid.cells().filter(|c| !exclusions.contains(c)).collect();
    free.choose(rng)
        .copied()
        .ok_or(EngineError::CapacityExhausted {
            occupied: exclusions.iter().filter(|c| grid.in_bounds(**c)).count(),
            total: grid.cell_count(),
        })
}

/// Head positions and headings for the agents of a round
pub fn spawn_points(mode: Mode, grid: &Grid) -> Vec<(Position, Direction)> {
    let size = grid.size() as i32;
    match mode {
        Mode::Multiplayer => {
            let near = size / 4;
            let far = size - 1 - near;
            vec![
                (Position::new(near, near), Direction::Right),
                (Position::new(far, far), Direction::Left),
            ]
        }
        _ => {
            let start = size * 2 / 5;
            vec![(Position::new(start, start), Direction::Right)]
        }
    }
}

/// The 3x3 block centred on `center`
pub fn starting_zone(center: Position) -> impl Iterator<Item = Position> {
    (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| center.moved_by(dx, dy)))
}

/// Clustered maze walls: a handful of rectangular blobs, each cell kept at
/// random, minus the starting zones. Expects a config that passed
/// [`GameConfig::validate`].
pub fn generate_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    config: &GameConfig,
    starts: &[Position],
) -> BTreeSet<Position> {
    let size = grid.size() as i32;
    let (min_side, max_side) = (config.maze_min_blob_side, config.maze_max_blob_side);

    let mut obstacles = BTreeSet::new();
    let blob_count = rng.gen_range(config.maze_min_blobs..=config.maze_max_blobs);
    for _ in 0..blob_count {
        let width = rng.gen_range(min_side..=max_side);
        let height = rng.gen_range(min_side..=max_side);
        if width > size || height > size {
            continue;
        }
        let left = rng.gen_range(0..=size - width);
        let top = rng.gen_range(0..=size - height);
        for y in top..top + height {
            for x in left..left + width {
                if rng.gen_bool(config.maze_cell_keep_probability) {
                    obstacles.insert(Position::new(x, y));
                }
            }
        }
    }

    for &start in starts {
        for cell in starting_zone(start) {
            obstacles.remove(&cell);
        }
    }
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_random_avoids_exclusions() {
        let mut rng = rand::thread_rng();
        let grid = Grid::new(5);
        let exclusions: HashSet<Position> = grid.cells().filter(|c| c.x < 4).collect();

        for _ in 0..50 {
            let pos = place_random(&mut rng, &grid, &exclusions, 100).unwrap();
            assert_eq!(pos.x, 4);
        }
    }

    #[test]
    fn test_place_random_falls_back_to_scan() {
        let mut rng = rand::thread_rng();
        let grid = Grid::new(20);
        let free = Position::new(13, 7);
        let exclusions: HashSet<Position> = grid.cells().filter(|&c| c != free).collect();

        // Zero random attempts forces the linear scan
        assert_eq!(place_random(&mut rng, &grid, &exclusions, 0), Ok(free));
    }

    #[test]
    fn test_place_random_reports_capacity() {
        let mut rng = rand::thread_rng();
        let grid = Grid::new(3);
        let exclusions: HashSet<Position> = grid.cells().collect();

        assert_eq!(
            place_random(&mut rng, &grid, &exclusions, 10),
            Err(EngineError::CapacityExhausted {
                occupied: 9,
                total: 9
            })
        );
    }

    #[test]
    fn test_spawn_points() {
        let grid = Grid::new(20);
        assert_eq!(
            spawn_points(Mode::Classic, &grid),
            vec![(Position::new(8, 8), Direction::Right)]
        );
        assert_eq!(
            spawn_points(Mode::Multiplayer, &grid),
            vec![
                (Position::new(5, 5), Direction::Right),
                (Position::new(14, 14), Direction::Left),
            ]
        );
    }

    #[test]
    fn test_obstacles_leave_starting_zones_clear() {
        let mut rng = rand::thread_rng();
        let grid = Grid::new(20);
        let config = GameConfig::default();
        let starts = [Position::new(5, 5), Position::new(14, 14)];

        for _ in 0..20 {
            let obstacles = generate_obstacles(&mut rng, &grid, &config, &starts);
            assert!(obstacles.iter().all(|&c| grid.in_bounds(c)));
            for &start in &starts {
                assert!(starting_zone(start).all(|c| !obstacles.contains(&c)));
            }
        }
    }

    #[test]
    fn test_obstacle_volume_bounded_by_blobs() {
        let mut rng = rand::thread_rng();
        let grid = Grid::new(20);
        let config = GameConfig {
            maze_min_blobs: 5,
            maze_max_blobs: 5,
            maze_cell_keep_probability: 1.0,
            ..GameConfig::default()
        };

        let obstacles = generate_obstacles(&mut rng, &grid, &config, &[]);
        assert!(!obstacles.is_empty());
        assert!(obstacles.len() <= 5 * 16);
    }
}
