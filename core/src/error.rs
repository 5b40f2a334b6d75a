//! Error type shared by every fallible operation in the core.

/// Failures surfaced by the engine, spawner and session.
///
/// No-op moves, clearing the board and losing are ordinary outcomes and
/// are reported through [`crate::MoveResult`], never through this type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid direction: {0:?} (expected Up, Down, Left or Right)")]
    InvalidDirection(String),
    #[error("no empty cell left to spawn a tile into")]
    NoSpace,
    #[error("session is over; start a new session to keep playing")]
    SessionTerminated,
    #[error("continue requested but the session has not been cleared")]
    NotCleared,
    #[error("invalid tile value {0}: tiles are powers of two >= 2")]
    InvalidTileValue(u32),
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Whether `value` may sit in a non-empty cell.
pub fn is_tile_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}
