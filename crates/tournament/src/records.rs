//! JSON-lines export of finished games

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TournamentError;
use crate::match_runner::GameRecord;

/// Append-only log with one JSON object per game.
pub struct GameLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl GameLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TournamentError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one game. The line is flushed immediately.
    pub fn append(&mut self, record: &GameRecord) -> Result<(), TournamentError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// All games stored in a log file
    pub fn read_all(path: &Path) -> Result<Vec<GameRecord>, TournamentError> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
