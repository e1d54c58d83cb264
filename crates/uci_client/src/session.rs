//! A named, rated engine that can be cloned into sibling configurations

use std::fmt;
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::driver::{DriverState, UciDriver};
use crate::error::EngineError;
use crate::search::{BestMove, SearchMode, StartPosition};
use crate::transport::AbortHandle;

/// One configured instance of an engine binary.
///
/// Several sessions can share a binary and differ only in strength, name and
/// rating. Cloning copies the configuration and nothing else: the clone
/// starts its own process when it first needs one.
///
/// The engine process is shut down when the session is dropped.
pub struct EngineSession {
    driver: UciDriver,
}

impl EngineSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            driver: UciDriver::new(config),
        }
    }

    /// Wrap an existing driver, e.g. one built over a custom transport.
    pub fn from_driver(driver: UciDriver) -> Self {
        Self { driver }
    }

    pub fn config(&self) -> &EngineConfig {
        self.driver.config()
    }

    pub fn name(&self) -> &str {
        &self.config().name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.driver.config_mut().name = name.into();
    }

    pub fn rating(&self) -> i32 {
        self.config().rating
    }

    pub fn set_rating(&mut self, rating: i32) {
        self.driver.config_mut().rating = rating;
    }

    pub fn strength_cap(&self) -> Option<u32> {
        self.config().strength_cap
    }

    /// Takes effect from the next move request.
    pub fn set_strength_cap(&mut self, elo: Option<u32>) {
        self.driver.config_mut().strength_cap = elo;
    }

    pub fn set_max_threads(&mut self, threads: Option<u32>) {
        self.driver.config_mut().max_threads = threads;
    }

    pub fn mode(&self) -> SearchMode {
        self.config().mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.driver.config_mut().mode = mode;
    }

    pub fn set_position(&mut self, position: StartPosition) {
        self.driver.config_mut().position = position;
    }

    pub fn set_log_engine_output(&mut self, enabled: bool) {
        self.driver.config_mut().log_engine_output = enabled;
    }

    /// Applies to the next process launch; a running engine keeps its files.
    pub fn set_log_paths(&mut self, output_log: impl Into<PathBuf>, error_log: impl Into<PathBuf>) {
        let config = self.driver.config_mut();
        config.output_log = output_log.into();
        config.error_log = error_log.into();
    }

    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        self.driver.ensure_started()
    }

    pub fn request_move<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<String, EngineError> {
        self.driver.request_move(moves)
    }

    pub fn request_best_move<S: AsRef<str>>(
        &mut self,
        moves: &[S],
    ) -> Result<BestMove, EngineError> {
        self.driver.request_best_move(moves)
    }

    pub fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        self.driver.send_command(command)
    }

    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.driver.abort_handle()
    }

    pub fn shutdown(&mut self) {
        self.driver.shutdown();
    }
}

impl Clone for EngineSession {
    fn clone(&self) -> Self {
        Self::new(self.config().clone())
    }
}

impl fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("name", &self.name())
            .field("rating", &self.rating())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
