use thiserror::Error;

/// Internal failures of the simulation core.
///
/// Rejected input and calls made outside a running round are not errors;
/// they are ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no free cell left on the grid ({occupied} of {total} cells occupied)")]
    CapacityExhausted { occupied: usize, total: usize },

    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),
}
