//! # slide2048 WebAssembly Bindings
//!
//! JavaScript-friendly bindings to the session engine using wasm-bindgen.
//! The browser side only translates keys, swipes and clicks into a
//! direction and animates tiles from the returned move descriptors.

use serde::Serialize;
use slide2048_core::{Direction, Session, SessionConfig, Status};
use wasm_bindgen::prelude::*;

/// Snapshot of the session for rendering, serialized for JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsSnapshot {
    /// Row-major cell values.
    pub grid: Vec<u32>,
    pub rows: usize,
    pub cols: usize,
    pub score: u64,
    pub high_score: u64,
    pub turn: u32,
    pub cleared: bool,
    pub over: bool,
}

/// WebAssembly wrapper for one game session.
#[wasm_bindgen]
pub struct WasmSession {
    session: Session,
}

#[wasm_bindgen]
impl WasmSession {
    /// Start a default 4x4 session with the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<WasmSession, JsError> {
        let config = SessionConfig {
            seed,
            ..Default::default()
        };
        Ok(WasmSession {
            session: Session::start(config)?,
        })
    }

    /// Start a session from a settings object, e.g.
    /// `{ rows: 5, cols: 5, seed: 7 }`. Missing fields take defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmSession, JsError> {
        let config: SessionConfig =
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(WasmSession {
            session: Session::start(config)?,
        })
    }

    /// Throw the current game away and start a new one. The high score
    /// carries over.
    pub fn replay(&mut self, seed: u64) -> Result<(), JsError> {
        self.session = self.session.replay(seed)?;
        Ok(())
    }

    /// Seed the high score from storage (e.g. `localStorage`).
    #[wasm_bindgen(js_name = setHighScore)]
    pub fn set_high_score(&mut self, high_score: f64) {
        self.session = self.session.clone().with_high_score(high_score.max(0.0) as u64);
    }

    /// Execute a move.
    ///
    /// Direction values:
    /// - 0 = Up
    /// - 1 = Down
    /// - 2 = Left
    /// - 3 = Right
    ///
    /// Returns an object with `direction`, `descriptors` (one per moving
    /// tile: `prevRow`, `prevCol`, `nextRow`, `nextCol`, `prevValue`,
    /// `nextValue`, `isCollapsed`, `direction`), `changed`, `points`,
    /// `turn`, `score`, `highScore`, `spawned`, `cleared` and `over`.
    pub fn step(&mut self, direction: u8) -> Result<JsValue, JsError> {
        let direction = Direction::try_from(direction)?;
        let result = self.session.apply_move(direction)?;
        to_js(&result)
    }

    /// Execute a move named by a key, e.g. `"ArrowLeft"` or `"w"`.
    #[wasm_bindgen(js_name = stepKey)]
    pub fn step_key(&mut self, key: &str) -> Result<JsValue, JsError> {
        let direction: Direction = key.parse()?;
        let result = self.session.apply_move(direction)?;
        to_js(&result)
    }

    /// Keep playing after the win tile; only valid while cleared.
    #[wasm_bindgen(js_name = continueGame)]
    pub fn continue_game(&mut self) -> Result<(), JsError> {
        self.session.continue_after_win()?;
        Ok(())
    }

    /// Current grid and scoreboard.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.js_snapshot())
    }

    /// Get the current grid as a row-major Uint32Array.
    #[wasm_bindgen(js_name = getGrid)]
    pub fn get_grid(&self) -> Vec<u32> {
        self.session.grid().cells().to_vec()
    }

    /// The grid before the last successful move, if any.
    #[wasm_bindgen(js_name = getPreviousGrid)]
    pub fn get_previous_grid(&self) -> Option<Vec<u32>> {
        self.session.previous_grid().map(|g| g.cells().to_vec())
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> f64 {
        self.session.score() as f64
    }

    #[wasm_bindgen(js_name = getHighScore)]
    pub fn get_high_score(&self) -> f64 {
        self.session.high_score() as f64
    }

    #[wasm_bindgen(js_name = getTurn)]
    pub fn get_turn(&self) -> u32 {
        self.session.turn()
    }

    #[wasm_bindgen(js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    /// Get legal moves as an array of 4 flags [Up, Down, Left, Right].
    #[wasm_bindgen(js_name = getLegalMoves)]
    pub fn get_legal_moves(&self) -> Vec<u8> {
        self.session.legal_moves().iter().map(|&b| u8::from(b)).collect()
    }

    fn js_snapshot(&self) -> JsSnapshot {
        let state = self.session.state();
        JsSnapshot {
            grid: self.get_grid(),
            rows: self.session.grid().rows(),
            cols: self.session.grid().cols(),
            score: state.score(),
            high_score: state.high_score(),
            turn: state.turn(),
            cleared: state.status() == Status::Cleared,
            over: state.is_over(),
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}
