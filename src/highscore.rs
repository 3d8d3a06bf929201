//! High-score persistence: a single non-negative integer in a text file.
//!
//! Single local user, so plain read/write with no locking. Reads default
//! to 0 when the file is missing or unparsable; write failures are logged
//! and swallowed so a bad disk never breaks the results screen.

use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Clone, Debug)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current high score, 0 if the file is absent or malformed.
    pub fn read(&self) -> u32 {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => match s.trim().parse::<u32>() {
                Ok(n) => n,
                Err(e) => {
                    warn!(target: "mathquiz_backend", path = %self.path.display(), error = %e, "Malformed high score file; treating as 0");
                    0
                }
            },
            Err(_) => 0,
        }
    }

    /// Persist a new high score. Best-effort: failures are logged only.
    pub fn write(&self, score: u32) {
        if let Err(e) = std::fs::write(&self.path, score.to_string()) {
            error!(target: "mathquiz_backend", path = %self.path.display(), error = %e, "Failed to write high score");
        }
    }

    /// Record `score` if it beats the stored record; returns the previous
    /// record and whether it was beaten.
    pub fn record_if_beaten(&self, score: u32) -> (u32, bool) {
        let previous = self.read();
        if score > previous {
            self.write(score);
            (previous, true)
        } else {
            (previous, false)
        }
    }
}
