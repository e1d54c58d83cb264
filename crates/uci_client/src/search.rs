//! Search requests sent to an engine and the best-move replies we get back

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Name of a search mode, as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Depth,
    #[serde(alias = "time", alias = "time-millis")]
    MoveTime,
    Nodes,
    Infinite,
}

/// How the engine is told to stop searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Fixed depth in plies
    Depth(u32),
    /// Fixed time per move in milliseconds
    MoveTime(u64),
    /// Fixed node budget
    Nodes(u64),
    /// Search until told to stop
    Infinite,
}

impl SearchMode {
    /// Combine a mode name with its value. `Infinite` has no value and
    /// ignores whatever is passed.
    pub fn new(kind: ModeKind, value: u64) -> Self {
        match kind {
            ModeKind::Depth => SearchMode::Depth(u32::try_from(value).unwrap_or(u32::MAX)),
            ModeKind::MoveTime => SearchMode::MoveTime(value),
            ModeKind::Nodes => SearchMode::Nodes(value),
            ModeKind::Infinite => SearchMode::Infinite,
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            SearchMode::Depth(_) => ModeKind::Depth,
            SearchMode::MoveTime(_) => ModeKind::MoveTime,
            SearchMode::Nodes(_) => ModeKind::Nodes,
            SearchMode::Infinite => ModeKind::Infinite,
        }
    }

    /// The argument list of the `go` command, e.g. `movetime 250`.
    pub fn criterion(&self) -> String {
        self.to_string()
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Depth(8)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Depth(depth) => write!(f, "depth {}", depth),
            SearchMode::MoveTime(millis) => write!(f, "movetime {}", millis),
            SearchMode::Nodes(nodes) => write!(f, "nodes {}", nodes),
            SearchMode::Infinite => write!(f, "infinite"),
        }
    }
}

/// Base position the move list is applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartPosition {
    #[default]
    StartPos,
    Fen(String),
}

impl StartPosition {
    /// `"startpos"` (any case) is the sentinel for the initial position,
    /// anything else is taken as a FEN, with or without a leading `fen`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("startpos") {
            return StartPosition::StartPos;
        }
        let fen = match text.split_once(char::is_whitespace) {
            Some((keyword, rest)) if keyword.eq_ignore_ascii_case("fen") => rest.trim_start(),
            _ => text,
        };
        StartPosition::Fen(fen.to_string())
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPosition::StartPos => write!(f, "startpos"),
            StartPosition::Fen(fen) => write!(f, "fen {}", fen),
        }
    }
}

/// A position plus the criterion that ends the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub position: StartPosition,
    pub moves: Vec<String>,
    pub mode: SearchMode,
}

impl SearchRequest {
    pub fn new<S: AsRef<str>>(position: StartPosition, moves: &[S], mode: SearchMode) -> Self {
        Self {
            position,
            moves: moves
                .iter()
                .map(|m| m.as_ref().trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            mode,
        }
    }

    /// `position startpos moves e2e4 e7e5`
    pub fn position_command(&self) -> String {
        let mut command = format!("position {}", self.position);
        if !self.moves.is_empty() {
            command.push_str(" moves ");
            command.push_str(&self.moves.join(" "));
        }
        command
    }

    /// `go depth 10`
    pub fn go_command(&self) -> String {
        format!("go {}", self.mode.criterion())
    }
}

/// The engine's final answer to a `go` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    pub mv: String,
    pub ponder: Option<String>,
}

impl BestMove {
    /// Parse `bestmove <move> [ponder <move>]`.
    pub fn parse(line: &str) -> Result<Self, EngineError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(EngineError::MalformedResponse(line.to_string()));
        }
        let ponder = match parts.get(2..4) {
            Some(["ponder", mv]) => Some((*mv).to_string()),
            _ => None,
        };
        Ok(Self {
            mv: parts[1].to_string(),
            ponder,
        })
    }
}

impl fmt::Display for BestMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ponder {
            Some(ponder) => write!(f, "{} (ponder {})", self.mv, ponder),
            None => write!(f, "{}", self.mv),
        }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
