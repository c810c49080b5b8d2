// Game recorder writing one JSON line per decision
//
// Several games may share one recorder when they run in parallel, so the file
// sits behind a mutex and every entry carries the game it belongs to.

use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::board::GameSnapshot;
use crate::solver::Algorithm;
use crate::types::Direction;

/// Represents a single recorded decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordEntry {
    /// Seed of the game the decision was made in
    pub game: u64,
    pub tick: u32,
    pub algorithm: Algorithm,
    pub chosen_move: Direction,
    pub snapshot: GameSnapshot,
    pub timestamp: String,
}

/// Shared recorder state. Cloning shares the same file.
#[derive(Clone)]
pub struct GameRecorder {
    file: Arc<Mutex<Option<BufWriter<File>>>>,
    enabled: bool,
}

impl GameRecorder {
    /// Creates a new recorder
    /// If enabled is true, initializes the record file (truncating if it exists)
    pub fn new<P: AsRef<Path>>(enabled: bool, path: P) -> Self {
        if !enabled {
            return GameRecorder::disabled();
        }

        let path = path.as_ref();
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
        {
            Ok(file) => {
                log::info!("Recording decisions to {}", path.display());
                GameRecorder {
                    file: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create record file '{}': {}", path.display(), e);
                GameRecorder::disabled()
            }
        }
    }

    /// Creates a disabled recorder (no-op)
    pub fn disabled() -> Self {
        GameRecorder {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one decision. Write failures are logged, never raised.
    pub fn record(
        &self,
        game: u64,
        tick: u32,
        algorithm: Algorithm,
        chosen_move: Direction,
        snapshot: GameSnapshot,
    ) {
        if !self.enabled {
            return;
        }

        let entry = RecordEntry {
            game,
            tick,
            algorithm,
            chosen_move,
            snapshot,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let json_line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize record entry: {}", e);
                return;
            }
        };

        let mut guard = self.file.lock();
        if let Some(writer) = guard.as_mut() {
            if let Err(e) = writeln!(writer, "{}", json_line) {
                error!("Failed to write record entry: {}", e);
            }
        }
    }

    /// Pushes buffered entries to disk
    pub fn flush(&self) {
        if let Some(writer) = self.file.lock().as_mut() {
            if let Err(e) = writer.flush() {
                error!("Failed to flush record file: {}", e);
            }
        }
    }
}

impl Drop for GameRecorder {
    fn drop(&mut self) {
        // Only the last handle flushes
        if Arc::strong_count(&self.file) == 1 {
            self.flush();
        }
    }
}
