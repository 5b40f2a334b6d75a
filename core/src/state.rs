//! Turn, score and the win/loss state machine.
//!
//! ```text
//! Playing --clear--> Cleared --continue--> Playing (continued) --loss--> Over
//! Playing --loss--> Over
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Playing,
    /// The win tile was reached; moves are held until the player continues.
    Cleared,
    /// No move can change the grid. Terminal.
    Over,
}

/// Scoreboard and flags for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) turn: u32,
    pub(crate) score: u64,
    pub(crate) high_score: u64,
    pub(crate) largest_value: u32,
    pub(crate) stopped: bool,
    pub(crate) continued: bool,
    pub(crate) status: Status,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(0)
    }
}

impl GameState {
    pub fn new(high_score: u64) -> Self {
        GameState {
            turn: 1,
            score: 0,
            high_score,
            largest_value: 0,
            stopped: false,
            continued: false,
            status: Status::Playing,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn largest_value(&self) -> u32 {
        self.largest_value
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn continued(&self) -> bool {
        self.continued
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == Status::Over
    }

    /// Add `points` to the score, raising the high score when beaten.
    /// Returns true if the high score moved.
    pub fn add_points(&mut self, points: u64) -> bool {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
            return true;
        }
        false
    }

    pub fn record_tile(&mut self, value: u32) {
        self.largest_value = self.largest_value.max(value);
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Enter `Cleared` if `win_value` has been produced and the player has
    /// not already chosen to continue. Returns true on the transition.
    pub fn check_clear(&mut self, win_value: u32) -> bool {
        if self.continued || self.status != Status::Playing || self.largest_value != win_value {
            return false;
        }
        self.status = Status::Cleared;
        self.stopped = true;
        true
    }

    pub fn mark_over(&mut self) {
        self.status = Status::Over;
        self.stopped = true;
    }

    /// Leave `Cleared` and keep playing; the clear event never fires
    /// again for this session.
    pub fn continue_game(&mut self) -> Result<()> {
        match self.status {
            Status::Cleared => {
                self.status = Status::Playing;
                self.stopped = false;
                self.continued = true;
                Ok(())
            }
            Status::Over => Err(GameError::SessionTerminated),
            Status::Playing => Err(GameError::NotCleared),
        }
    }
}
