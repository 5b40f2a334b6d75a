use serde::{Deserialize, Serialize};

use crate::error::{is_tile_value, GameError, Result};

/// Tile value that clears the game.
pub const WIN_VALUE: u32 = 2048;

/// Parameters for a session. Missing fields take their defaults when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    pub win_value: u32,
    /// Chance that a randomly spawned tile is a 4 rather than a 2.
    pub four_probability: f64,
    /// Tiles placed before the first move.
    pub initial_tiles: usize,
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            rows: 4,
            cols: 4,
            win_value: WIN_VALUE,
            four_probability: 0.5,
            initial_tiles: 2,
            seed: 42,
        }
    }
}

impl SessionConfig {
    pub fn with_size(rows: usize, cols: usize) -> Self {
        SessionConfig {
            rows,
            cols,
            initial_tiles: (rows * cols).min(2),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !is_tile_value(self.win_value) || self.win_value < 4 {
            return Err(GameError::InvalidConfig(format!(
                "win_value must be a power of two >= 4, got {}",
                self.win_value
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidConfig(format!(
                "four_probability must be within [0, 1], got {}",
                self.four_probability
            )));
        }
        if self.initial_tiles > self.rows * self.cols {
            return Err(GameError::InvalidConfig(format!(
                "{} initial tiles do not fit a {}x{} grid",
                self.initial_tiles, self.rows, self.cols
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert_eq!((config.rows, config.cols), (4, 4));
        assert_eq!(config.win_value, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SessionConfig::with_size(0, 4).validate(),
            Err(GameError::InvalidDimensions { .. })
        ));
        let bad_win = SessionConfig {
            win_value: 1000,
            ..Default::default()
        };
        assert!(matches!(bad_win.validate(), Err(GameError::InvalidConfig(_))));
        let bad_prob = SessionConfig {
            four_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad_prob.validate(), Err(GameError::InvalidConfig(_))));
        let nan_prob = SessionConfig {
            four_probability: f64::NAN,
            ..Default::default()
        };
        assert!(nan_prob.validate().is_err());
        let crowded = SessionConfig {
            rows: 1,
            cols: 1,
            ..Default::default()
        };
        assert!(crowded.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"rows": 5, "seed": 7}"#).unwrap();
        assert_eq!(config.rows, 5);
        assert_eq!(config.cols, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.win_value, WIN_VALUE);
    }
}
