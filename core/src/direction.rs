//! Move directions and the geometric transforms that reduce every
//! direction to the canonical one: compacting each line toward its
//! high-index end.
//!
//! | Direction | forward                    | inverse                    |
//! |-----------|----------------------------|----------------------------|
//! | Right     | identity                   | identity                   |
//! | Left      | reverse rows               | reverse rows               |
//! | Down      | transpose                  | transpose                  |
//! | Up        | transpose, reverse rows    | reverse rows, transpose    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::grid::{Grid, Position};

/// The four possible move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Get all four directions.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }

    /// Reorient `grid` so that moving in this direction becomes
    /// "compact every row toward its last index".
    pub fn to_canonical(self, grid: &Grid) -> Grid {
        match self {
            Direction::Right => grid.clone(),
            Direction::Left => grid.reverse_rows(),
            Direction::Down => grid.transpose(),
            Direction::Up => grid.transpose().reverse_rows(),
        }
    }

    /// Inverse of [`Direction::to_canonical`].
    pub fn from_canonical(self, canonical: &Grid) -> Grid {
        match self {
            Direction::Right => canonical.clone(),
            Direction::Left => canonical.reverse_rows(),
            Direction::Down => canonical.transpose(),
            Direction::Up => canonical.reverse_rows().transpose(),
        }
    }

    /// Map `(line, index)` in canonical space back to a cell of the
    /// original `rows` x `cols` grid.
    pub fn canonical_to_grid(self, rows: usize, cols: usize, line: usize, index: usize) -> Position {
        match self {
            Direction::Right => Position::new(line, index),
            Direction::Left => Position::new(line, cols - 1 - index),
            Direction::Down => Position::new(index, line),
            Direction::Up => Position::new(rows - 1 - index, line),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Direction::from_u8(value).ok_or_else(|| GameError::InvalidDirection(value.to_string()))
    }
}

impl FromStr for Direction {
    type Err = GameError;

    /// Accepts direction names in any case, DOM-style `Arrow*` key names
    /// and WASD.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix("Arrow").unwrap_or(trimmed);
        match name.to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(GameError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_3x2() -> Grid {
        Grid::from_rows(vec![vec![2, 4], vec![8, 16], vec![32, 64]]).unwrap()
    }

    #[test]
    fn test_direction_from_u8() {
        assert_eq!(Direction::from_u8(0), Some(Direction::Up));
        assert_eq!(Direction::from_u8(1), Some(Direction::Down));
        assert_eq!(Direction::from_u8(2), Some(Direction::Left));
        assert_eq!(Direction::from_u8(3), Some(Direction::Right));
        assert_eq!(Direction::from_u8(4), None);
        assert_eq!(
            Direction::try_from(9u8),
            Err(GameError::InvalidDirection("9".into()))
        );
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("ArrowUp".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!("A".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(" Right ".parse::<Direction>(), Ok(Direction::Right));
        assert!(matches!(
            "Diagonal".parse::<Direction>(),
            Err(GameError::InvalidDirection(_))
        ));
        for dir in Direction::all() {
            assert_eq!(dir.to_string().parse::<Direction>(), Ok(dir));
        }
    }

    #[test]
    fn test_canonical_shapes() {
        let grid = grid_3x2();
        assert_eq!(Direction::Right.to_canonical(&grid).to_rows(), grid.to_rows());
        assert_eq!(
            Direction::Left.to_canonical(&grid).to_rows(),
            vec![vec![4, 2], vec![16, 8], vec![64, 32]]
        );
        assert_eq!(
            Direction::Down.to_canonical(&grid).to_rows(),
            vec![vec![2, 8, 32], vec![4, 16, 64]]
        );
        assert_eq!(
            Direction::Up.to_canonical(&grid).to_rows(),
            vec![vec![32, 8, 2], vec![64, 16, 4]]
        );
    }

    #[test]
    fn test_canonical_coordinates_point_at_same_cell() {
        let grid = grid_3x2();
        for dir in Direction::all() {
            let canonical = dir.to_canonical(&grid);
            for line in 0..canonical.rows() {
                for index in 0..canonical.cols() {
                    let pos = dir.canonical_to_grid(grid.rows(), grid.cols(), line, index);
                    assert_eq!(canonical.get(line, index), grid.get(pos.row, pos.col), "{dir}");
                }
            }
        }
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(prop_oneof![Just(0u32), (1u32..12).prop_map(|e| 1u32 << e)], rows * cols)
                .prop_map(move |cells| {
                    let rows_vec = cells.chunks(cols).map(|c| c.to_vec()).collect();
                    Grid::from_rows(rows_vec).unwrap()
                })
        })
    }

    proptest! {
        #[test]
        fn transform_round_trips(grid in arb_grid()) {
            for dir in Direction::all() {
                let back = dir.from_canonical(&dir.to_canonical(&grid));
                prop_assert_eq!(&back, &grid);
            }
        }
    }
}
