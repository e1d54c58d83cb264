//! Match runner for playing games between engines
//!
//! The runner is also the referee: every move an engine sends is checked
//! with `cozy-chess` before it is passed on to the opponent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cozy_chess::{util::parse_uci_move, Board, Color, GameStatus, Piece};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uci_client::StartPosition;

use crate::elo::GameResult;
use crate::error::TournamentError;
use crate::player::Player;

/// Configuration for playing games
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Maximum half-moves per game before declaring a draw
    pub max_moves: u32,
    /// Position every game starts from
    pub start_position: StartPosition,
    /// Score a failing engine as a loss instead of aborting the tournament
    pub forfeit_on_error: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_moves: 400,
            start_position: StartPosition::StartPos,
            forfeit_on_error: true,
        }
    }
}

/// Why a game ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    Repetition,
    InsufficientMaterial,
    MoveLimit,
    /// The side to move answered with an illegal or unreadable move
    IllegalMove { mv: String },
    /// The side to move crashed, hung or broke the protocol
    EngineFailure { error: String },
}

/// A finished game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub white: String,
    pub black: String,
    pub result: GameResult,
    pub termination: Termination,
    pub moves: Vec<String>,
    pub played_at: DateTime<Utc>,
}

/// Plays single games between two players
pub struct MatchRunner {
    config: MatchConfig,
}

impl MatchRunner {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    fn start_board(&self) -> Result<Board, TournamentError> {
        match &self.config.start_position {
            StartPosition::StartPos => Ok(Board::default()),
            StartPosition::Fen(fen) => {
                Board::from_fen(fen, false).map_err(|e| TournamentError::InvalidPosition {
                    fen: fen.clone(),
                    reason: format!("{:?}", e),
                })
            }
        }
    }

    /// Play a single game, returns the result from white's perspective
    pub fn play_game(
        &self,
        white: &mut dyn Player,
        black: &mut dyn Player,
    ) -> Result<GameRecord, TournamentError> {
        let mut board = self.start_board()?;
        white.new_game(&self.config.start_position);
        black.new_game(&self.config.start_position);

        let mut moves: Vec<String> = Vec::new();
        let mut seen: HashMap<u64, u32> = HashMap::new();
        seen.insert(board.hash(), 1);

        let white_name = white.name().to_string();
        let black_name = black.name().to_string();
        let finish = |result: GameResult, termination: Termination, moves: Vec<String>| {
            debug!(?termination, "game over: {}", result.as_pgn());
            GameRecord {
                white: white_name.clone(),
                black: black_name.clone(),
                result,
                termination,
                moves,
                played_at: Utc::now(),
            }
        };
        // Result when the side to move loses
        let mover_loses = |side: Color| match side {
            Color::White => GameResult::Loss,
            Color::Black => GameResult::Win,
        };

        for _ply in 0..self.config.max_moves {
            let side = board.side_to_move();
            let (reply, mover) = match side {
                Color::White => (white.request_move(&moves), &white_name),
                Color::Black => (black.request_move(&moves), &black_name),
            };

            let reply = match reply {
                Ok(reply) => reply,
                Err(e) => {
                    if !self.config.forfeit_on_error {
                        return Err(TournamentError::Engine {
                            engine: mover.clone(),
                            source: e,
                        });
                    }
                    warn!(engine = %mover, "forfeits: {}", e);
                    let termination = Termination::EngineFailure {
                        error: e.to_string(),
                    };
                    return Ok(finish(mover_loses(side), termination, moves));
                }
            };

            let legal = parse_uci_move(&board, &reply)
                .ok()
                .filter(|&mv| board.try_play(mv).is_ok());
            if legal.is_none() {
                warn!(engine = %mover, "played illegal move `{}`", reply);
                let termination = Termination::IllegalMove { mv: reply };
                return Ok(finish(mover_loses(side), termination, moves));
            }
            moves.push(reply);

            match board.status() {
                GameStatus::Won => {
                    // The side that just moved delivered mate.
                    return Ok(finish(mover_loses(side).flip(), Termination::Checkmate, moves));
                }
                GameStatus::Drawn if board.halfmove_clock() >= 100 => {
                    return Ok(finish(GameResult::Draw, Termination::FiftyMoveRule, moves));
                }
                GameStatus::Drawn => {
                    return Ok(finish(GameResult::Draw, Termination::Stalemate, moves));
                }
                GameStatus::Ongoing => {}
            }

            if board.halfmove_clock() >= 100 {
                return Ok(finish(GameResult::Draw, Termination::FiftyMoveRule, moves));
            }

            let count = seen.entry(board.hash()).or_insert(0);
            *count += 1;
            if *count >= 3 {
                return Ok(finish(GameResult::Draw, Termination::Repetition, moves));
            }

            if insufficient_material(&board) {
                return Ok(finish(GameResult::Draw, Termination::InsufficientMaterial, moves));
            }
        }

        // Max moves reached
        Ok(finish(GameResult::Draw, Termination::MoveLimit, moves))
    }
}

/// Neither side can possibly mate: bare kings, or a single minor piece left.
fn insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    let minors = board.pieces(Piece::Knight) | board.pieces(Piece::Bishop);
    heavy.is_empty() && minors.len() <= 1
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
