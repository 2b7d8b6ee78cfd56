//! Core simulation for the snake game
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The presentation layer drives a [`Session`] (or a bare [`GameEngine`]) and reads
//! the resulting [`RoundState`] snapshots.

pub mod action;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod grid;
pub mod policy;
pub mod schedule;
pub mod session;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::GameConfig;
pub use effects::{EffectKind, EffectRegistry};
pub use engine::{resolve_tick, GameEngine, TickInfo};
pub use error::EngineError;
pub use grid::{Grid, Position};
pub use policy::{ModePolicy, Verdict};
pub use schedule::{Task, Timers};
pub use session::{AdvanceReport, Session};
pub use state::{
    CollisionType, Difficulty, Mode, OverReason, Phase, PowerUp, RoundState, Snake,
};
