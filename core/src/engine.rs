//! The move/merge engine.
//!
//! A move reorients the grid so that it becomes "compact every row toward
//! its last index" (see [`Direction::to_canonical`]), runs the anchor/probe
//! scan over each line, maps every step back to grid coordinates and
//! finally undoes the reorientation.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::grid::{Grid, Position, MAX_TILE};

/// The fate of one physical tile during a move.
///
/// - slide: the tile moved from `prev` to `next` keeping its value;
/// - collapsed: the tile was absorbed in place by an incoming equal tile
///   and is gone (`prev == next`, `prev_value == next_value`);
/// - merge survivor: the incoming tile moved from `prev` to `next` and now
///   shows `next_value == 2 * prev_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDescriptor {
    pub prev_row: usize,
    pub prev_col: usize,
    pub next_row: usize,
    pub next_col: usize,
    pub prev_value: u32,
    pub next_value: u32,
    pub is_collapsed: bool,
    pub direction: Direction,
}

impl MoveDescriptor {
    pub fn source(&self) -> Position {
        Position::new(self.prev_row, self.prev_col)
    }

    pub fn destination(&self) -> Position {
        Position::new(self.next_row, self.next_col)
    }

    /// Whether this is the surviving half of a merge.
    pub fn is_merge(&self) -> bool {
        !self.is_collapsed && self.next_value != self.prev_value
    }

    /// Score earned by this descriptor: a collapse of two `v` tiles is
    /// worth `2v`, everything else is worth nothing.
    pub fn points(&self) -> u64 {
        if self.is_collapsed {
            2 * self.next_value as u64
        } else {
            0
        }
    }

    fn new(direction: Direction, from: Position, to: Position, prev_value: u32, next_value: u32, is_collapsed: bool) -> Self {
        MoveDescriptor {
            prev_row: from.row,
            prev_col: from.col,
            next_row: to.row,
            next_col: to.col,
            prev_value,
            next_value,
            is_collapsed,
            direction,
        }
    }
}

/// One step of the canonical scan, in line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStep {
    /// A tile of `value` moved from `from` into the empty anchor `to`.
    Slide { from: usize, to: usize, value: u32 },
    /// The tile at `from` merged into the equal tile at `into`; `value`
    /// is the pre-merge value of each.
    Merge { from: usize, into: usize, value: u32 },
}

/// Result of [`compute_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    /// Empty when the move is blocked.
    pub descriptors: Vec<MoveDescriptor>,
    /// Largest tile produced by a merge during this move, 0 if none.
    pub largest_merge: u32,
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Compact `line` toward its last index, merging equal tiles at most once
/// each.
///
/// The anchor walks from the last index down to 1; for every anchor the
/// probe walks left from the anchor. Empty probe cells are skipped. An
/// equal probe merges into the anchor and ends that anchor. A non-empty
/// probe slides into an empty anchor and probing continues, so the slid
/// tile may still find a partner. Two unequal tiles block the anchor, and
/// so do two tiles at [`MAX_TILE`].
pub fn compact_line(line: &mut [u32]) -> Vec<LineStep> {
    let mut steps = Vec::new();
    for anchor in (1..line.len()).rev() {
        for probe in (0..anchor).rev() {
            if line[probe] == 0 {
                continue;
            }
            if line[probe] == line[anchor] && line[anchor] < MAX_TILE {
                let value = line[anchor];
                line[probe] = 0;
                line[anchor] = value * 2;
                steps.push(LineStep::Merge {
                    from: probe,
                    into: anchor,
                    value,
                });
                break;
            } else if line[anchor] == 0 {
                line.swap(anchor, probe);
                steps.push(LineStep::Slide {
                    from: probe,
                    to: anchor,
                    value: line[anchor],
                });
            } else {
                break;
            }
        }
    }
    steps
}

/// Compute the effect of moving `grid` in `direction`.
///
/// Pure: the input grid is untouched. Descriptors come out line by line in
/// scan order, and each merge yields the collapsed descriptor before the
/// survivor.
pub fn compute_move(grid: &Grid, direction: Direction) -> MoveOutcome {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut canonical = direction.to_canonical(grid);
    let mut descriptors = Vec::new();
    let mut largest_merge = 0u32;

    for line in 0..canonical.rows() {
        let at = |index: usize| direction.canonical_to_grid(rows, cols, line, index);
        for step in compact_line(canonical.row_mut(line)) {
            match step {
                LineStep::Slide { from, to, value } => {
                    descriptors.push(MoveDescriptor::new(direction, at(from), at(to), value, value, false));
                }
                LineStep::Merge { from, into, value } => {
                    descriptors.push(MoveDescriptor::new(direction, at(into), at(into), value, value, true));
                    descriptors.push(MoveDescriptor::new(direction, at(from), at(into), value, value * 2, false));
                    largest_merge = largest_merge.max(value * 2);
                }
            }
        }
    }

    MoveOutcome {
        grid: direction.from_canonical(&canonical),
        descriptors,
        largest_merge,
    }
}

/// Check if a move in the given direction would change the grid.
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    let mut canonical = direction.to_canonical(grid);
    (0..canonical.rows()).any(|line| !compact_line(canonical.row_mut(line)).is_empty())
}

/// Legal directions as a boolean array [Up, Down, Left, Right].
pub fn legal_moves(grid: &Grid) -> [bool; 4] {
    Direction::all().map(|dir| can_move(grid, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(rows: Vec<Vec<u32>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    fn desc(dir: Direction, prev: (usize, usize), next: (usize, usize), pv: u32, nv: u32, collapsed: bool) -> MoveDescriptor {
        MoveDescriptor::new(dir, Position::new(prev.0, prev.1), Position::new(next.0, next.1), pv, nv, collapsed)
    }

    // -------------------------------------------------------------------------
    // Line scan
    // -------------------------------------------------------------------------

    #[test]
    fn test_line_simple_slide() {
        let mut line = [2, 0, 0, 0];
        let steps = compact_line(&mut line);
        assert_eq!(line, [0, 0, 0, 2]);
        assert_eq!(steps, vec![LineStep::Slide { from: 0, to: 3, value: 2 }]);
    }

    #[test]
    fn test_line_max_tiles_do_not_merge() {
        let mut line = [MAX_TILE, MAX_TILE];
        assert!(compact_line(&mut line).is_empty());
        assert_eq!(line, [MAX_TILE, MAX_TILE]);

        let mut line = [MAX_TILE, 0, MAX_TILE];
        let steps = compact_line(&mut line);
        assert_eq!(line, [0, MAX_TILE, MAX_TILE]);
        assert_eq!(steps, vec![LineStep::Slide { from: 0, to: 1, value: MAX_TILE }]);
    }

    #[test]
    fn test_max_tile_grid_is_stuck() {
        let g = grid(vec![vec![MAX_TILE, MAX_TILE]]);
        assert!(compute_move(&g, Direction::Right).is_noop());
        assert_eq!(legal_moves(&g), [false; 4]);
        assert!(!g.has_adjacent_equal());

        let out = compute_move(&grid(vec![vec![MAX_TILE >> 1, MAX_TILE >> 1]]), Direction::Right);
        assert_eq!(out.grid.to_rows(), vec![vec![0, MAX_TILE]]);
        assert_eq!(out.largest_merge, MAX_TILE);
    }

    #[test]
    fn test_line_simple_merge() {
        let mut line = [2, 2, 0, 0];
        let steps = compact_line(&mut line);
        assert_eq!(line, [0, 0, 0, 4]);
        assert_eq!(
            steps,
            vec![
                LineStep::Slide { from: 1, to: 3, value: 2 },
                LineStep::Merge { from: 0, into: 3, value: 2 },
            ]
        );
    }

    #[test]
    fn test_line_blocked() {
        let mut line = [2, 4, 2, 4];
        assert!(compact_line(&mut line).is_empty());
        assert_eq!(line, [2, 4, 2, 4]);
    }

    #[test]
    fn test_line_no_double_merge() {
        let mut line = [0, 2, 2, 4];
        compact_line(&mut line);
        assert_eq!(line, [0, 0, 4, 4]);

        let mut line = [2, 2, 2, 2];
        compact_line(&mut line);
        assert_eq!(line, [0, 0, 4, 4]);

        let mut line = [8, 0, 4, 4];
        compact_line(&mut line);
        assert_eq!(line, [0, 0, 8, 8]);
    }

    #[test]
    fn test_line_merge_with_gaps() {
        let mut line = [2, 0, 2, 0];
        compact_line(&mut line);
        assert_eq!(line, [0, 0, 0, 4]);

        let mut line = [4, 0, 0, 4, 2];
        compact_line(&mut line);
        assert_eq!(line, [0, 0, 0, 8, 2]);
    }

    #[test]
    fn test_line_slide_then_blocked() {
        let mut line = [2, 0, 4, 0];
        let steps = compact_line(&mut line);
        assert_eq!(line, [0, 0, 2, 4]);
        assert_eq!(
            steps,
            vec![
                LineStep::Slide { from: 2, to: 3, value: 4 },
                LineStep::Slide { from: 0, to: 2, value: 2 },
            ]
        );
    }

    #[test]
    fn test_line_single_cell() {
        let mut line = [2];
        assert!(compact_line(&mut line).is_empty());
    }

    // -------------------------------------------------------------------------
    // Whole-grid moves with full descriptor coordinates
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_right_descriptors() {
        let g = grid(vec![vec![2, 2, 0, 0], vec![0, 0, 0, 0], vec![0, 4, 0, 0]]);
        let out = compute_move(&g, Direction::Right);
        assert_eq!(out.grid.to_rows(), vec![vec![0, 0, 0, 4], vec![0, 0, 0, 0], vec![0, 0, 0, 4]]);
        let d = Direction::Right;
        assert_eq!(
            out.descriptors,
            vec![
                desc(d, (0, 1), (0, 3), 2, 2, false),
                desc(d, (0, 3), (0, 3), 2, 2, true),
                desc(d, (0, 0), (0, 3), 2, 4, false),
                desc(d, (2, 1), (2, 3), 4, 4, false),
            ]
        );
        assert_eq!(out.largest_merge, 4);
    }

    #[test]
    fn test_move_left_descriptors() {
        let g = grid(vec![vec![0, 0, 2, 2], vec![0, 8, 0, 0]]);
        let out = compute_move(&g, Direction::Left);
        assert_eq!(out.grid.to_rows(), vec![vec![4, 0, 0, 0], vec![8, 0, 0, 0]]);
        let d = Direction::Left;
        assert_eq!(
            out.descriptors,
            vec![
                desc(d, (0, 2), (0, 0), 2, 2, false),
                desc(d, (0, 0), (0, 0), 2, 2, true),
                desc(d, (0, 3), (0, 0), 2, 4, false),
                desc(d, (1, 1), (1, 0), 8, 8, false),
            ]
        );
    }

    #[test]
    fn test_move_down_descriptors() {
        let g = grid(vec![vec![2, 0], vec![2, 4], vec![0, 0]]);
        let out = compute_move(&g, Direction::Down);
        assert_eq!(out.grid.to_rows(), vec![vec![0, 0], vec![0, 0], vec![4, 4]]);
        let d = Direction::Down;
        assert_eq!(
            out.descriptors,
            vec![
                desc(d, (1, 0), (2, 0), 2, 2, false),
                desc(d, (2, 0), (2, 0), 2, 2, true),
                desc(d, (0, 0), (2, 0), 2, 4, false),
                desc(d, (1, 1), (2, 1), 4, 4, false),
            ]
        );
    }

    #[test]
    fn test_move_up_descriptors() {
        let g = grid(vec![vec![0, 0], vec![2, 4], vec![2, 0]]);
        let out = compute_move(&g, Direction::Up);
        assert_eq!(out.grid.to_rows(), vec![vec![4, 4], vec![0, 0], vec![0, 0]]);
        let d = Direction::Up;
        assert_eq!(
            out.descriptors,
            vec![
                desc(d, (1, 0), (0, 0), 2, 2, false),
                desc(d, (0, 0), (0, 0), 2, 2, true),
                desc(d, (2, 0), (0, 0), 2, 4, false),
                desc(d, (1, 1), (0, 1), 4, 4, false),
            ]
        );
    }

    #[test]
    fn test_four_directions_match_reference_boards() {
        let g = grid(vec![
            vec![2, 0, 2, 8],
            vec![2, 4, 0, 8],
            vec![0, 4, 2, 8],
            vec![0, 0, 0, 8],
        ]);
        assert_eq!(
            compute_move(&g, Direction::Up).grid.to_rows(),
            vec![vec![4, 8, 4, 16], vec![0, 0, 0, 16], vec![0, 0, 0, 0], vec![0, 0, 0, 0]]
        );
        assert_eq!(
            compute_move(&g, Direction::Down).grid.to_rows(),
            vec![vec![0, 0, 0, 0], vec![0, 0, 0, 0], vec![0, 0, 0, 16], vec![4, 8, 4, 16]]
        );
        assert_eq!(
            compute_move(&g, Direction::Left).grid.to_rows(),
            vec![vec![4, 8, 0, 0], vec![2, 4, 8, 0], vec![4, 2, 8, 0], vec![8, 0, 0, 0]]
        );
        assert_eq!(
            compute_move(&g, Direction::Right).grid.to_rows(),
            vec![vec![0, 0, 4, 8], vec![0, 2, 4, 8], vec![0, 4, 2, 8], vec![0, 0, 0, 8]]
        );
    }

    #[test]
    fn test_blocked_move_is_noop() {
        let g = grid(vec![vec![2, 4, 2, 4]]);
        let out = compute_move(&g, Direction::Right);
        assert!(out.is_noop());
        assert_eq!(out.grid, g);
        assert_eq!(out.largest_merge, 0);
    }

    #[test]
    fn test_legal_moves() {
        let g = grid(vec![vec![2, 0], vec![4, 0]]);
        assert_eq!(legal_moves(&g), [false, false, false, true]);
        let stuck = grid(vec![vec![2, 4], vec![4, 2]]);
        assert_eq!(legal_moves(&stuck), [false; 4]);
    }

    #[test]
    fn test_descriptor_points() {
        let d = Direction::Right;
        assert_eq!(desc(d, (0, 3), (0, 3), 8, 8, true).points(), 16);
        assert_eq!(desc(d, (0, 0), (0, 3), 8, 16, false).points(), 0);
        assert!(desc(d, (0, 0), (0, 3), 8, 16, false).is_merge());
        assert!(!desc(d, (0, 0), (0, 3), 8, 8, false).is_merge());
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let json = serde_json::to_value(desc(Direction::Up, (1, 0), (0, 0), 2, 4, false)).unwrap();
        assert_eq!(json["prevRow"], 1);
        assert_eq!(json["nextValue"], 4);
        assert_eq!(json["isCollapsed"], false);
        assert_eq!(json["direction"], "Up");
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(prop_oneof![2 => Just(0u32), 3 => (1u32..6).prop_map(|e| 1u32 << e)], rows * cols)
                .prop_map(move |cells| Grid::from_rows(cells.chunks(cols).map(|c| c.to_vec()).collect()).unwrap())
        })
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        (0u8..4).prop_map(|v| Direction::from_u8(v).unwrap())
    }

    proptest! {
        #[test]
        fn move_conserves_tile_sum(g in arb_grid(), dir in arb_direction()) {
            let out = compute_move(&g, dir);
            prop_assert_eq!(out.grid.tile_sum(), g.tile_sum());
        }

        #[test]
        fn move_keeps_powers_of_two(g in arb_grid(), dir in arb_direction()) {
            let out = compute_move(&g, dir);
            prop_assert!(out.grid.cells().iter().all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())));
        }

        #[test]
        fn tiles_merge_at_most_once(g in arb_grid(), dir in arb_direction()) {
            let out = compute_move(&g, dir);
            let mut collapsed: Vec<Position> = out.descriptors.iter().filter(|d| d.is_collapsed).map(|d| d.source()).collect();
            let total = collapsed.len();
            collapsed.sort();
            collapsed.dedup();
            prop_assert_eq!(collapsed.len(), total);
        }

        #[test]
        fn noop_leaves_grid_untouched(g in arb_grid(), dir in arb_direction()) {
            let out = compute_move(&g, dir);
            if out.is_noop() {
                prop_assert_eq!(&out.grid, &g);
            } else {
                prop_assert_ne!(&out.grid, &g);
            }
            prop_assert_eq!(can_move(&g, dir), !out.is_noop());
        }

        #[test]
        fn replaying_descriptors_rebuilds_grid(g in arb_grid(), dir in arb_direction()) {
            let out = compute_move(&g, dir);
            let mut replay = g.clone();
            for d in &out.descriptors {
                if d.is_collapsed {
                    continue;
                }
                prop_assert_eq!(replay.get(d.prev_row, d.prev_col), d.prev_value);
                replay.set(d.prev_row, d.prev_col, 0);
                replay.set(d.next_row, d.next_col, d.next_value);
            }
            prop_assert_eq!(replay, out.grid);
        }
    }
}
