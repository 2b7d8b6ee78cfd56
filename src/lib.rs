//! Snake Arena - a tick-driven, multi-mode snake game
//!
//! This library provides:
//! - Core simulation (game module): grid, agents, power-up effects, per-mode
//!   rules, the tick engine and its round scheduler
//! - Persistence port for the best score and chosen difficulty
//! - Terminal front end (input, render, metrics, modes)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
