//! Best-score persistence: a text file holding a single integer.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

/// Read the stored high score; a missing file counts as 0.
pub fn load(path: &Path) -> Result<u64> {
    match fs::read_to_string(path) {
        Ok(text) => text
            .trim()
            .parse()
            .with_context(|| format!("malformed high score in {}", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

/// Write `score` if it beats what is stored. Returns true when written.
pub fn save_if_higher(path: &Path, score: u64) -> Result<bool> {
    if score <= load(path)? {
        return Ok(false);
    }
    fs::write(path, format!("{score}\n")).with_context(|| format!("writing {}", path.display()))?;
    log::info!("new high score {score} saved to {}", path.display());
    Ok(true)
}
