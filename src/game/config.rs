use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use super::effects::EffectKind;
use super::error::EngineError;

/// Smallest board that fits both starting positions
pub const MIN_GRID_SIZE: usize = 4;

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,

    /// How often a power-up is offered while none is on the board
    pub power_up_spawn_ms: u64,
    /// How long an uncollected power-up stays on the board
    pub power_up_lifetime_ms: u64,

    /// Starting value of the timed-mode countdown, in seconds
    pub timed_round_secs: u32,
    /// Cadence of the timed-mode countdown
    pub countdown_period_ms: u64,

    /// Tick interval multiplier while slow motion is active
    pub slow_motion_factor: f64,

    // Effect durations
    pub double_points_ms: u64,
    pub slow_motion_ms: u64,
    pub invulnerable_ms: u64,
    pub phase_ms: u64,

    /// Random draws before placement falls back to scanning free cells
    pub placement_attempts: usize,

    // Maze generation
    pub maze_min_blobs: usize,
    pub maze_max_blobs: usize,
    pub maze_min_blob_side: i32,
    pub maze_max_blob_side: i32,
    pub maze_cell_keep_probability: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            power_up_spawn_ms: 15_000,
            power_up_lifetime_ms: 7_000,
            timed_round_secs: 60,
            countdown_period_ms: 1_000,
            slow_motion_factor: 1.5,
            double_points_ms: 10_000,
            slow_motion_ms: 8_000,
            invulnerable_ms: 5_000,
            phase_ms: 6_000,
            placement_attempts: 1_000,
            maze_min_blobs: 5,
            maze_max_blobs: 10,
            maze_min_blob_side: 2,
            maze_max_blob_side: 4,
            maze_cell_keep_probability: 0.7,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |reason: String| -> Result<(), EngineError> {
            Err(EngineError::InvalidConfig(reason))
        };

        if self.grid_size < MIN_GRID_SIZE || i32::try_from(self.grid_size).is_err() {
            return invalid(format!(
                "grid_size must be at least {}, got {}",
                MIN_GRID_SIZE, self.grid_size
            ));
        }
        if self.power_up_spawn_ms == 0 || self.countdown_period_ms == 0 {
            return invalid("power-up spawn and countdown periods must be positive".into());
        }
        if !self.slow_motion_factor.is_finite() || self.slow_motion_factor < 1.0 {
            return invalid(format!(
                "slow_motion_factor must be a finite value of at least 1, got {}",
                self.slow_motion_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.maze_cell_keep_probability) {
            return invalid(format!(
                "maze_cell_keep_probability must lie in [0, 1], got {}",
                self.maze_cell_keep_probability
            ));
        }
        if self.maze_min_blobs > self.maze_max_blobs {
            return invalid("maze_min_blobs exceeds maze_max_blobs".into());
        }
        if self.maze_min_blob_side < 1 || self.maze_min_blob_side > self.maze_max_blob_side {
            return invalid("maze blob sides must satisfy 1 <= min <= max".into());
        }
        Ok(())
    }

    pub fn effect_duration(&self, kind: EffectKind) -> Duration {
        let ms = match kind {
            EffectKind::DoublePoints => self.double_points_ms,
            EffectKind::SlowMotion => self.slow_motion_ms,
            EffectKind::Invulnerable => self.invulnerable_ms,
            EffectKind::Phase => self.phase_ms,
        };
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.power_up_spawn_ms, 15_000);
        assert_eq!(config.power_up_lifetime_ms, 7_000);
        assert_eq!(config.timed_round_secs, 60);
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15);
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.countdown_period_ms, 1_000);
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid_size": 12, "phase_ms": 2000 }}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_size, 12);
        assert_eq!(config.effect_duration(EffectKind::Phase), Duration::from_secs(2));
        assert_eq!(config.timed_round_secs, 60);
    }

    #[test]
    fn test_validate() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
        assert_eq!(GameConfig::new(MIN_GRID_SIZE).validate(), Ok(()));

        let bad = [
            GameConfig::new(0),
            GameConfig::new(3),
            GameConfig {
                maze_cell_keep_probability: f64::NAN,
                ..GameConfig::default()
            },
            GameConfig {
                maze_cell_keep_probability: 1.5,
                ..GameConfig::default()
            },
            GameConfig {
                slow_motion_factor: f64::INFINITY,
                ..GameConfig::default()
            },
            GameConfig {
                countdown_period_ms: 0,
                ..GameConfig::default()
            },
            GameConfig {
                maze_min_blob_side: 5,
                ..GameConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(EngineError::InvalidConfig(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid_size": 2 }}"#).unwrap();

        assert!(GameConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(GameConfig::load(Path::new("/nonexistent/snake.json")).is_err());
    }
}
