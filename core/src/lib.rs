//! # Sliding-tile puzzle core
//!
//! The grid move/merge engine behind a 2048-style game: an R x C grid of
//! power-of-two tiles that the player shifts in one of four directions,
//! merging equal neighbours and spawning a new tile after every move that
//! changes something.
//!
//! Randomness comes from a seedable source, so a session replays exactly
//! from its seed.
//!
//! ## Example
//!
//! ```rust
//! use slide2048_core::{Direction, Session, SessionConfig};
//!
//! let mut session = Session::start(SessionConfig::default()).unwrap();
//! let result = session.apply_move(Direction::Left).unwrap();
//! println!("Score: {}, Changed: {}", session.score(), result.changed);
//! ```

pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod grid;
pub mod session;
pub mod spawner;
pub mod state;

pub use config::{SessionConfig, WIN_VALUE};
pub use direction::Direction;
pub use engine::{can_move, compact_line, compute_move, legal_moves, LineStep, MoveDescriptor, MoveOutcome};
pub use error::{GameError, Result};
pub use grid::{EmptyPositions, Grid, Position, MAX_TILE};
pub use session::{MoveResult, Session};
pub use spawner::{Spawn, Spawner};
pub use state::{GameState, Status};
