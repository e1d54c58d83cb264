//! Launch and behaviour settings for one engine session

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::LaunchCommand;
use crate::error::EngineError;
use crate::search::{SearchMode, StartPosition};

/// Rating assigned to an engine that has never been rated
pub const DEFAULT_RATING: i32 = 1600;

/// How long we wait for `uciok`
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long we wait for `bestmove` on top of any requested movetime
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a process gets to exit on its own after `quit` before it is killed
pub const DEFAULT_EXIT_GRACE: Duration = Duration::from_millis(500);

/// How the engine binary is started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationKind {
    /// Run the command directly
    #[default]
    Native,
    /// Run the command through `<runtime> -jar`
    Jar,
}

/// Configuration for an engine session.
///
/// Cloning gives a fully independent copy; nothing is shared afterwards.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine binary (or jar) with any embedded arguments
    pub command: String,
    pub kind: ApplicationKind,
    /// Program used to run jars
    pub runtime_launcher: String,
    pub name: String,
    /// Our own rating of this engine, updated by tournaments
    pub rating: i32,
    /// Sent as `UCI_LimitStrength` + `UCI_Elo` when set
    pub strength_cap: Option<u32>,
    /// Sent as `Threads` when set
    pub max_threads: Option<u32>,
    pub mode: SearchMode,
    pub position: StartPosition,
    /// Append every protocol line to `output_log`
    pub log_engine_output: bool,
    pub output_log: PathBuf,
    /// Receives the engine's stderr
    pub error_log: PathBuf,
    /// Start the process on the first move request
    pub auto_start: bool,
    /// Repeat the `uci` handshake before every move
    pub handshake_every_move: bool,
    pub handshake_timeout: Duration,
    pub response_timeout: Duration,
    pub exit_grace: Duration,
}

impl EngineConfig {
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            name: command.clone(),
            command,
            kind: ApplicationKind::Native,
            runtime_launcher: "java".to_string(),
            rating: DEFAULT_RATING,
            strength_cap: None,
            max_threads: None,
            mode: SearchMode::default(),
            position: StartPosition::StartPos,
            log_engine_output: true,
            output_log: PathBuf::from("log/output.log"),
            error_log: PathBuf::from("log/error.log"),
            auto_start: true,
            handshake_every_move: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            exit_grace: DEFAULT_EXIT_GRACE,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: ApplicationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strength_cap(mut self, elo: u32) -> Self {
        self.strength_cap = Some(elo);
        self
    }

    pub fn with_max_threads(mut self, threads: u32) -> Self {
        self.max_threads = Some(threads);
        self
    }

    pub fn with_position(mut self, position: StartPosition) -> Self {
        self.position = position;
        self
    }

    /// Enable the protocol log and send both logs to the given files.
    pub fn with_logs(mut self, output_log: impl Into<PathBuf>, error_log: impl Into<PathBuf>) -> Self {
        self.log_engine_output = true;
        self.output_log = output_log.into();
        self.error_log = error_log.into();
        self
    }

    pub fn without_output_log(mut self) -> Self {
        self.log_engine_output = false;
        self
    }

    pub fn with_timeouts(mut self, handshake: Duration, response: Duration) -> Self {
        self.handshake_timeout = handshake;
        self.response_timeout = response;
        self
    }

    pub fn launch_command(&self) -> Result<LaunchCommand, EngineError> {
        LaunchCommand::build(&self.command, self.kind, &self.runtime_launcher)
    }

    /// Upper bound for the `bestmove` wait of one search.
    pub fn search_timeout(&self) -> Duration {
        match self.mode {
            SearchMode::MoveTime(millis) => self.response_timeout + Duration::from_millis(millis),
            _ => self.response_timeout,
        }
    }
}
