//! New-tile placement.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{is_tile_value, GameError, Result};
use crate::grid::{EmptyPositions, Grid, Position};

/// A tile placed by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

impl Spawn {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Places new tiles on uniformly random empty cells.
///
/// The random source is injected so whole sessions replay exactly from a
/// seed.
#[derive(Debug, Clone)]
pub struct Spawner<R = SmallRng> {
    rng: R,
    four_probability: f64,
}

impl Spawner<SmallRng> {
    pub fn seeded(seed: u64, four_probability: f64) -> Self {
        Spawner::new(SmallRng::seed_from_u64(seed), four_probability)
    }
}

impl<R: Rng> Spawner<R> {
    pub fn new(rng: R, four_probability: f64) -> Self {
        Spawner {
            rng,
            four_probability: four_probability.clamp(0.0, 1.0),
        }
    }

    /// Place one tile on a random empty cell.
    ///
    /// With `value == None` the tile is a 4 with probability
    /// `four_probability` and a 2 otherwise. Fails with
    /// [`GameError::NoSpace`] when `empty` has no members.
    pub fn spawn(&mut self, grid: &mut Grid, empty: &mut EmptyPositions, value: Option<u32>) -> Result<Spawn> {
        if let Some(v) = value {
            if !is_tile_value(v) {
                return Err(GameError::InvalidTileValue(v));
            }
        }
        let pos = empty.choose(&mut self.rng).ok_or(GameError::NoSpace)?;
        let value = value.unwrap_or_else(|| self.roll_value());

        empty.remove(pos);
        grid.set(pos.row, pos.col, value);

        Ok(Spawn {
            row: pos.row,
            col: pos.col,
            value,
        })
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    fn roll_value(&mut self) -> u32 {
        if self.rng.gen_bool(self.four_probability) {
            4
        } else {
            2
        }
    }
}
