//! One game from the first spawn to the final loss.

use std::fmt;

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::SessionConfig;
use crate::direction::Direction;
use crate::engine::{compute_move, legal_moves, MoveDescriptor};
use crate::error::{GameError, Result};
use crate::grid::{EmptyPositions, Grid};
use crate::spawner::{Spawn, Spawner};
use crate::state::{GameState, Status};

/// Everything a turn changed, returned by [`Session::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub direction: Direction,
    /// Per-tile transitions, empty when the move changed nothing.
    pub descriptors: Vec<MoveDescriptor>,
    pub changed: bool,
    /// Score gained this turn.
    pub points: u64,
    pub turn: u32,
    pub score: u64,
    pub high_score: u64,
    pub spawned: Option<Spawn>,
    /// The win tile is on the board and the player has not continued yet.
    /// Also set alongside `over` when the winning move filled the board.
    pub cleared: bool,
    pub over: bool,
}

/// A single game. Owns the grid, its empty-cell set, the spawner and the
/// scoreboard; nothing is shared between sessions.
#[derive(Clone)]
pub struct Session<R = SmallRng> {
    config: SessionConfig,
    grid: Grid,
    empty: EmptyPositions,
    spawner: Spawner<R>,
    state: GameState,
    previous: Option<Grid>,
}

impl Session<SmallRng> {
    /// Create an empty `rows` x `cols` session seeded with `seed`.
    pub fn new(rows: usize, cols: usize, seed: u64) -> Result<Self> {
        Session::from_config(SessionConfig {
            seed,
            ..SessionConfig::with_size(rows, cols)
        })
    }

    /// Create an empty session; no tiles are placed yet.
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        let rng = SmallRng::seed_from_u64(config.seed);
        Session::with_rng(config, rng)
    }

    /// Create a session and place `config.initial_tiles` tiles.
    pub fn start(config: SessionConfig) -> Result<Self> {
        let tiles = config.initial_tiles;
        let mut session = Session::from_config(config)?;
        session.spawn_initial_tiles(tiles)?;
        Ok(session)
    }

    /// A fresh started session with the same configuration and a new
    /// seed. The high score carries over.
    pub fn replay(&self, seed: u64) -> Result<Self> {
        let config = SessionConfig {
            seed,
            ..self.config.clone()
        };
        let tiles = config.initial_tiles;
        let mut session = Session::from_config(config)?.with_high_score(self.state.high_score);
        session.spawn_initial_tiles(tiles)?;
        Ok(session)
    }
}

impl<R: Rng> Session<R> {
    /// Create an empty session drawing randomness from `rng`.
    pub fn with_rng(config: SessionConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.rows, config.cols)?;
        let empty = EmptyPositions::full(config.rows, config.cols);
        let spawner = Spawner::new(rng, config.four_probability);
        Ok(Session {
            config,
            grid,
            empty,
            spawner,
            state: GameState::default(),
            previous: None,
        })
    }

    /// Replace the grid, e.g. to resume a saved position or set up a
    /// scenario. The largest value seen grows to the grid's largest tile.
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.config.rows = grid.rows();
        self.config.cols = grid.cols();
        self.empty = EmptyPositions::from_grid(&grid);
        self.state.record_tile(grid.max_tile());
        self.grid = grid;
        self.previous = None;
        self.check_loss();
        self
    }

    /// Seed the high score from external storage.
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.state.high_score = self.state.high_score.max(high_score);
        self
    }

    /// Place `count` random tiles before the first move.
    pub fn spawn_initial_tiles(&mut self, count: usize) -> Result<Vec<Spawn>> {
        let spawns = (0..count)
            .map(|_| self.place_tile(None))
            .collect::<Result<Vec<_>>>()?;
        self.check_loss();
        Ok(spawns)
    }

    /// Place one tile, random unless `value` is given.
    pub fn spawn_tile(&mut self, value: Option<u32>) -> Result<Spawn> {
        let spawn = self.place_tile(value)?;
        self.check_loss();
        Ok(spawn)
    }

    /// Play one turn.
    ///
    /// A move that changes nothing returns `changed == false` and leaves
    /// the turn, score and grid alone. While the session is cleared and
    /// waiting for [`Session::continue_after_win`], moves are ignored the
    /// same way. Once the session is over every move is rejected with
    /// [`GameError::SessionTerminated`].
    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveResult> {
        match self.state.status {
            Status::Over => {
                warn!("move {direction} rejected: session is over");
                return Err(GameError::SessionTerminated);
            }
            Status::Cleared => {
                debug!("move {direction} ignored until the player continues");
                return Ok(self.unchanged(direction));
            }
            Status::Playing => {}
        }

        let outcome = compute_move(&self.grid, direction);
        if outcome.is_noop() {
            debug!("move {direction} is blocked");
            return Ok(self.unchanged(direction));
        }

        self.previous = Some(std::mem::replace(&mut self.grid, outcome.grid));
        let mut points = 0;
        for d in &outcome.descriptors {
            if d.is_collapsed {
                points += d.points();
                self.state.add_points(d.points());
            } else {
                self.empty.remove(d.destination());
            }
            self.empty.insert(d.source());
        }
        debug_assert!(self.empty.matches(&self.grid), "empty set out of sync with grid");
        self.state.record_tile(outcome.largest_merge);
        self.state.advance_turn();

        let cleared_now = self.state.check_clear(self.config.win_value);
        if cleared_now {
            info!(
                "cleared: reached {} on turn {} with score {}",
                self.config.win_value, self.state.turn, self.state.score
            );
        }

        let spawned = self.place_tile(None).map_err(|err| {
            error!("no room to spawn after a successful move: {err}");
            err
        })?;
        self.check_loss();

        debug!(
            "turn {}: {direction} moved {} tiles, +{points} points, spawned {} at ({}, {})",
            self.state.turn,
            outcome.descriptors.len(),
            spawned.value,
            spawned.row,
            spawned.col
        );

        Ok(MoveResult {
            direction,
            descriptors: outcome.descriptors,
            changed: true,
            points,
            turn: self.state.turn,
            score: self.state.score,
            high_score: self.state.high_score,
            spawned: Some(spawned),
            cleared: cleared_now || self.state.status == Status::Cleared,
            over: self.state.is_over(),
        })
    }

    /// Keep playing after reaching the win tile.
    pub fn continue_after_win(&mut self) -> Result<()> {
        self.state.continue_game()?;
        info!("continuing past the win tile on turn {}", self.state.turn);
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The grid as it was before the last successful move.
    pub fn previous_grid(&self) -> Option<&Grid> {
        self.previous.as_ref()
    }

    pub fn empty_positions(&self) -> &EmptyPositions {
        &self.empty
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    pub fn largest_value(&self) -> u32 {
        self.state.largest_value
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Directions that would change the grid, as [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        legal_moves(&self.grid)
    }

    fn place_tile(&mut self, value: Option<u32>) -> Result<Spawn> {
        if self.state.is_over() {
            return Err(GameError::SessionTerminated);
        }
        self.spawner.spawn(&mut self.grid, &mut self.empty, value)
    }

    fn check_loss(&mut self) -> bool {
        if self.state.is_over() {
            return true;
        }
        if self.empty.is_empty() && !self.grid.has_adjacent_equal() {
            self.state.mark_over();
            info!(
                "game over on turn {} with score {} (largest tile {})",
                self.state.turn, self.state.score, self.state.largest_value
            );
            return true;
        }
        false
    }

    fn unchanged(&self, direction: Direction) -> MoveResult {
        MoveResult {
            direction,
            descriptors: Vec::new(),
            changed: false,
            points: 0,
            turn: self.state.turn,
            score: self.state.score,
            high_score: self.state.high_score,
            spawned: None,
            cleared: self.state.status == Status::Cleared,
            over: self.state.is_over(),
        }
    }
}

impl<R> fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Session {{ turn: {}, score: {}, status: {:?} }}",
            self.state.turn, self.state.score, self.state.status
        )?;
        write!(f, "{:?}", self.grid)
    }
}

impl<R> fmt::Display for Session<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Score: {}  Best: {}  Turn: {}",
            self.state.score, self.state.high_score, self.state.turn
        )?;
        write!(f, "{}", self.grid)
    }
}
