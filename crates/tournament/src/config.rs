//! Tournament description files
//!
//! ```toml
//! [tournament]
//! runs = 100
//! standings = "standings.csv"
//!
//! [calibration]
//! command = "engines/stockfish"
//! mode = "nodes"
//! value = 1000000
//!
//! [[engine]]
//! name = "Rival"
//! command = "engines/rival.jar"
//! kind = "jar"
//! mode = "movetime"
//!
//! [[engine.variant]]
//! name = "Rival 50%"
//! movetime_percent = 50
//! ```
//!
//! An engine with variants is fielded only through its variants, each a
//! clone of the engine's session with its own overrides.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use uci_client::{
    ApplicationKind, EngineConfig, EngineSession, ModeKind, SearchMode, StartPosition,
};

use crate::calibration::percent_of;
use crate::error::ConfigError;
use crate::match_runner::MatchConfig;

/// A whole tournament file
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentFile {
    #[serde(default)]
    pub tournament: TournamentSettings,
    pub calibration: Option<CalibrationSettings>,
    #[serde(default, rename = "engine")]
    pub engines: Vec<EngineEntry>,
}

/// The `[tournament]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub runs: u32,
    /// Half-moves before a game is declared drawn
    pub max_moves: u32,
    pub shuffle: bool,
    pub seed: Option<u64>,
    /// `startpos` or a FEN
    pub start_position: String,
    pub standings: PathBuf,
    /// JSON-lines file receiving every finished game
    pub games_log: Option<PathBuf>,
    /// Per-engine protocol and stderr logs go here
    pub log_dir: PathBuf,
    pub forfeit_on_error: bool,
    pub handshake_timeout_ms: u64,
    pub response_timeout_ms: u64,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            runs: 1,
            max_moves: 400,
            shuffle: false,
            seed: None,
            start_position: "startpos".to_string(),
            standings: PathBuf::from("standings.csv"),
            games_log: None,
            log_dir: PathBuf::from("log"),
            forfeit_on_error: true,
            handshake_timeout_ms: uci_client::DEFAULT_HANDSHAKE_TIMEOUT.as_millis() as u64,
            response_timeout_ms: uci_client::DEFAULT_RESPONSE_TIMEOUT.as_millis() as u64,
        }
    }
}

/// The reference engine timed before the tournament starts
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationSettings {
    pub command: String,
    #[serde(default)]
    pub kind: ApplicationKind,
    #[serde(default = "default_calibration_mode")]
    pub mode: ModeKind,
    #[serde(default = "default_calibration_value")]
    pub value: u64,
}

fn default_calibration_mode() -> ModeKind {
    ModeKind::Nodes
}

fn default_calibration_value() -> u64 {
    1_000_000
}

/// One `[[engine]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct EngineEntry {
    /// Defaults to the command
    pub name: Option<String>,
    pub command: String,
    #[serde(default)]
    pub kind: ApplicationKind,
    /// Program used to run jars, `java` when unset
    pub runtime: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: ModeKind,
    pub value: Option<u64>,
    pub rating: Option<i32>,
    pub strength_cap: Option<u32>,
    pub threads: Option<u32>,
    /// Write the protocol log
    #[serde(default = "default_true")]
    pub log: bool,
    /// Repeat the handshake before every move
    #[serde(default = "default_true")]
    pub handshake_every_move: bool,
    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantEntry>,
}

/// One `[[engine.variant]]` entry; unset fields keep the engine's values
#[derive(Debug, Clone, Deserialize)]
pub struct VariantEntry {
    pub name: String,
    pub mode: Option<ModeKind>,
    pub value: Option<u64>,
    /// Movetime as a share of the calibration search
    pub movetime_percent: Option<u32>,
    pub rating: Option<i32>,
    pub strength_cap: Option<u32>,
    pub threads: Option<u32>,
}

fn default_mode() -> ModeKind {
    ModeKind::Depth
}

fn default_true() -> bool {
    true
}

impl TournamentFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn start_position(&self) -> StartPosition {
        StartPosition::parse(&self.tournament.start_position)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            max_moves: self.tournament.max_moves,
            start_position: self.start_position(),
            forfeit_on_error: self.tournament.forfeit_on_error,
        }
    }

    /// True if some variant is timed relative to the calibration engine.
    pub fn needs_calibration(&self) -> bool {
        self.engines
            .iter()
            .flat_map(|e| &e.variants)
            .any(|v| v.movetime_percent.is_some())
    }

    /// Session for the calibration engine, if one is configured.
    pub fn calibration_session(&self) -> Option<EngineSession> {
        let calibration = self.calibration.as_ref()?;
        let value = calibration.value;
        let mut config = self
            .base_config(&calibration.command, "calibration")
            .with_kind(calibration.kind)
            .with_mode(SearchMode::new(calibration.mode, value));
        config.handshake_every_move = false;
        Some(EngineSession::new(config))
    }

    /// One session per participant. `reference` is the calibration search
    /// time, required when a variant uses `movetime_percent`.
    pub fn build_sessions(&self, reference: Option<Duration>) -> Result<Vec<EngineSession>, ConfigError> {
        let mut sessions = Vec::new();
        for entry in &self.engines {
            let base = self.entry_session(entry)?;
            if entry.variants.is_empty() {
                sessions.push(base);
                continue;
            }
            for variant in &entry.variants {
                sessions.push(self.variant_session(&base, variant, reference)?);
            }
        }

        let mut names = HashSet::new();
        for session in &sessions {
            if !names.insert(session.name()) {
                return Err(ConfigError::Invalid {
                    engine: session.name().to_string(),
                    reason: "name is used more than once".to_string(),
                });
            }
        }
        Ok(sessions)
    }

    fn base_config(&self, command: &str, name: &str) -> EngineConfig {
        let (output_log, error_log) = self.log_paths(name);
        EngineConfig::new(command)
            .with_name(name)
            .with_position(self.start_position())
            .with_logs(output_log, error_log)
            .with_timeouts(
                Duration::from_millis(self.tournament.handshake_timeout_ms),
                Duration::from_millis(self.tournament.response_timeout_ms),
            )
    }

    fn log_paths(&self, name: &str) -> (PathBuf, PathBuf) {
        let slug = slug(name);
        (
            self.tournament.log_dir.join(format!("{}.log", slug)),
            self.tournament.log_dir.join(format!("{}.err", slug)),
        )
    }

    fn entry_session(&self, entry: &EngineEntry) -> Result<EngineSession, ConfigError> {
        let name = entry.name.clone().unwrap_or_else(|| entry.command.clone());
        let invalid = |reason: &str| ConfigError::Invalid {
            engine: name.clone(),
            reason: reason.to_string(),
        };
        if entry.command.trim().is_empty() {
            return Err(invalid("command is empty"));
        }

        let mut config = self.base_config(&entry.command, &name).with_kind(entry.kind);
        if let Some(runtime) = &entry.runtime {
            config.runtime_launcher = runtime.clone();
        }
        // Variants may supply the value themselves
        if entry.variants.is_empty() || entry.value.is_some() {
            config.mode = mode_of(entry.mode, entry.value).map_err(invalid)?;
        } else {
            config.mode = SearchMode::new(entry.mode, 0);
        }
        config.rating = entry.rating.unwrap_or(config.rating);
        config.strength_cap = entry.strength_cap;
        config.max_threads = entry.threads;
        config.log_engine_output = entry.log;
        config.handshake_every_move = entry.handshake_every_move;

        // Fails early on commands that cannot be launched at all
        config.launch_command().map_err(|e| invalid(&e.to_string()))?;
        Ok(EngineSession::new(config))
    }

    fn variant_session(
        &self,
        base: &EngineSession,
        variant: &VariantEntry,
        reference: Option<Duration>,
    ) -> Result<EngineSession, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            engine: variant.name.clone(),
            reason: reason.to_string(),
        };

        let mut session = base.clone();
        session.set_name(variant.name.as_str());
        let (output_log, error_log) = self.log_paths(&variant.name);
        session.set_log_paths(output_log, error_log);

        let mode = match variant.movetime_percent {
            Some(percent) => {
                let reference = reference.ok_or_else(|| ConfigError::MissingCalibration(variant.name.clone()))?;
                SearchMode::MoveTime(percent_of(reference, percent))
            }
            None => {
                let kind = variant.mode.unwrap_or(base.mode().kind());
                let value = variant.value.or_else(|| mode_value(base.mode()));
                mode_of(kind, value).map_err(invalid)?
            }
        };
        session.set_mode(mode);

        if let Some(rating) = variant.rating {
            session.set_rating(rating);
        }
        if variant.strength_cap.is_some() {
            session.set_strength_cap(variant.strength_cap);
        }
        if variant.threads.is_some() {
            session.set_max_threads(variant.threads);
        }
        Ok(session)
    }
}

fn mode_of(kind: ModeKind, value: Option<u64>) -> Result<SearchMode, &'static str> {
    match (kind, value) {
        (ModeKind::Infinite, _) => Ok(SearchMode::Infinite),
        (ModeKind::Depth, Some(depth)) if depth > u32::MAX as u64 => Err("search depth is too large"),
        (kind, Some(value)) => Ok(SearchMode::new(kind, value)),
        (_, None) => Err("search mode needs a value"),
    }
}

/// Value of a mode, `None` for placeholders and `infinite`
fn mode_value(mode: SearchMode) -> Option<u64> {
    match mode {
        SearchMode::Depth(0) | SearchMode::MoveTime(0) | SearchMode::Nodes(0) => None,
        SearchMode::Depth(depth) => Some(depth as u64),
        SearchMode::MoveTime(millis) => Some(millis),
        SearchMode::Nodes(nodes) => Some(nodes),
        SearchMode::Infinite => None,
    }
}

/// File-name friendly version of an engine name
fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if slug.is_empty() {
        "engine".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
