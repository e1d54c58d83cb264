//! What the scheduler needs from a participant

use uci_client::{EngineError, EngineSession, StartPosition};

/// A tournament participant.
///
/// [`EngineSession`] is the real implementation; tests plug in scripted
/// players so games can be played without external processes.
pub trait Player: Send {
    fn name(&self) -> &str;

    fn rating(&self) -> i32;

    fn set_rating(&mut self, rating: i32);

    /// Called before every game with the position the game starts from.
    fn new_game(&mut self, _position: &StartPosition) {}

    /// Best move after `moves` have been played from the start position.
    fn request_move(&mut self, moves: &[String]) -> Result<String, EngineError>;

    fn is_running(&self) -> bool;

    fn shutdown(&mut self);
}

impl Player for EngineSession {
    fn name(&self) -> &str {
        EngineSession::name(self)
    }

    fn rating(&self) -> i32 {
        EngineSession::rating(self)
    }

    fn set_rating(&mut self, rating: i32) {
        EngineSession::set_rating(self, rating);
    }

    fn new_game(&mut self, position: &StartPosition) {
        self.set_position(position.clone());
    }

    fn request_move(&mut self, moves: &[String]) -> Result<String, EngineError> {
        EngineSession::request_move(self, moves)
    }

    fn is_running(&self) -> bool {
        EngineSession::is_running(self)
    }

    fn shutdown(&mut self) {
        EngineSession::shutdown(self);
    }
}
