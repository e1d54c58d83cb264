//! Scripted players for exercising the scheduler without engine processes

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cozy_chess::util::{display_uci_move, parse_uci_move};
use cozy_chess::Board;
use uci_client::{EngineError, StartPosition};

use crate::player::Player;

pub(crate) struct ScriptedPlayer {
    pub name: String,
    pub rating: i32,
    /// Moves played in order; once empty the player picks its first legal move
    pub script: VecDeque<String>,
    /// Fail every request with a timeout
    pub broken: bool,
    pub start: StartPosition,
    pub games: usize,
    pub shutdowns: Arc<AtomicUsize>,
}

impl ScriptedPlayer {
    pub fn new(name: &str, rating: i32) -> Self {
        Self {
            name: name.to_string(),
            rating,
            script: VecDeque::new(),
            broken: false,
            start: StartPosition::StartPos,
            games: 0,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_script(mut self, moves: &[&str]) -> Self {
        self.script = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    fn first_legal_move(&self, moves: &[String]) -> Option<String> {
        let mut board = match &self.start {
            StartPosition::StartPos => Board::default(),
            StartPosition::Fen(fen) => Board::from_fen(fen, false).ok()?,
        };
        for mv in moves {
            let mv = parse_uci_move(&board, mv).ok()?;
            board.try_play(mv).ok()?;
        }
        let mut first = None;
        board.generate_moves(|piece_moves| {
            first = piece_moves.into_iter().next();
            first.is_some()
        });
        first.map(|mv| display_uci_move(&board, mv).to_string())
    }
}

impl Player for ScriptedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn rating(&self) -> i32 {
        self.rating
    }

    fn set_rating(&mut self, rating: i32) {
        self.rating = rating;
    }

    fn new_game(&mut self, position: &StartPosition) {
        self.start = position.clone();
        self.games += 1;
    }

    fn request_move(&mut self, moves: &[String]) -> Result<String, EngineError> {
        if self.broken {
            return Err(EngineError::Timeout {
                engine: self.name.clone(),
                expected: "bestmove",
                waited: Duration::from_millis(1),
            });
        }
        if let Some(mv) = self.script.pop_front() {
            return Ok(mv);
        }
        self.first_legal_move(moves)
            .ok_or_else(|| EngineError::MalformedResponse("bestmove (none)".to_string()))
    }

    fn is_running(&self) -> bool {
        self.shutdown_count() == 0
    }

    fn shutdown(&mut self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
