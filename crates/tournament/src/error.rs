//! Tournament error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uci_client::EngineError;

#[derive(Debug, Error)]
pub enum TournamentError {
    /// An engine failed and forfeits were disabled
    #[error("engine `{engine}` failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },

    #[error("invalid start position `{fen}`: {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("no participant with index {0}")]
    UnknownParticipant(usize),

    #[error("participant {0} cannot play against itself")]
    SelfPairing(usize),

    #[error("the tournament has been closed")]
    Closed,

    #[error(transparent)]
    Standings(#[from] StandingsError),

    #[error("game record I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid game record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StandingsError {
    #[error("failed to access standings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("standings line {line}: {reason}")]
    BadRow { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("engine `{engine}`: {reason}")]
    Invalid { engine: String, reason: String },

    #[error("variant `{0}` uses movetime_percent but no calibration result is available")]
    MissingCalibration(String),
}
