//! The UCI state machine
//!
//! ```text
//! NotStarted -> Handshaking -> Ready -> Searching -> Ready ... -> Stopped
//! ```
//!
//! One driver owns at most one engine process. Commands are strictly
//! request/response: nothing new is sent while a reply is outstanding.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::search::{BestMove, SearchRequest};
use crate::transport::{AbortHandle, ProcessTransport, Received, Transport};

/// Where the driver is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    /// `uci` sent, `uciok` not seen yet
    Handshaking,
    Ready,
    /// `go` sent, `bestmove` not seen yet
    Searching,
    /// Shut down for good
    Stopped,
}

/// Append-only `>> sent` / `<< received` log.
struct ProtocolLog {
    file: File,
}

impl ProtocolLog {
    fn open(config: &EngineConfig) -> Result<Option<Self>, EngineError> {
        if !config.log_engine_output {
            return Ok(None);
        }
        if let Some(dir) = config.output_log.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.output_log)?;
        Ok(Some(Self { file }))
    }

    fn record(&mut self, prefix: &str, line: &str) -> Result<(), EngineError> {
        writeln!(self.file, "{} {}", prefix, line)?;
        Ok(())
    }
}

/// Drives one engine through the UCI protocol.
pub struct UciDriver {
    config: EngineConfig,
    state: DriverState,
    transport: Option<Box<dyn Transport>>,
    log: Option<ProtocolLog>,
    /// A process has been attached at some point
    launched: bool,
}

impl UciDriver {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: DriverState::NotStarted,
            transport: None,
            log: None,
            launched: false,
        }
    }

    /// Drive an engine over an already connected transport.
    ///
    /// The `uci` greeting is sent immediately, exactly as if the driver had
    /// launched the process itself.
    pub fn with_transport(
        config: EngineConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, EngineError> {
        let mut driver = Self::new(config);
        driver.attach(transport)?;
        Ok(driver)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// True iff a process is attached and its input stream is open.
    pub fn is_running(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    /// Handle for killing the engine from another thread while a request is
    /// blocked waiting for it.
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.transport.as_ref().and_then(|t| t.abort_handle())
    }

    /// Launch the engine unless one is already attached.
    pub fn ensure_started(&mut self) -> Result<(), EngineError> {
        match self.state {
            DriverState::Stopped => return Err(self.not_running()),
            _ if self.transport.is_some() => return Ok(()),
            _ => {}
        }

        let command = self.config.launch_command()?;
        info!(engine = %self.config.name, "launching `{}`", command);
        let transport =
            ProcessTransport::start(&command, &self.config.error_log, self.config.exit_grace)?;
        self.attach(Box::new(transport))
    }

    fn attach(&mut self, transport: Box<dyn Transport>) -> Result<(), EngineError> {
        self.log = ProtocolLog::open(&self.config)?;
        self.transport = Some(transport);
        self.launched = true;
        if let Err(e) = self.send_command("uci") {
            self.discard_process();
            return Err(e);
        }
        self.state = DriverState::Handshaking;
        Ok(())
    }

    /// Ask the engine for a move in the configured position after `moves`.
    pub fn request_move<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<String, EngineError> {
        self.request_best_move(moves).map(|best| best.mv)
    }

    /// Like [`Self::request_move`] but keeps the ponder move.
    pub fn request_best_move<S: AsRef<str>>(
        &mut self,
        moves: &[S],
    ) -> Result<BestMove, EngineError> {
        if self.transport.is_none() {
            if !self.config.auto_start {
                return Err(self.not_running());
            }
            self.ensure_started()?;
        }

        let request = SearchRequest::new(self.config.position.clone(), moves, self.config.mode);
        let result = self.exchange(&request);
        if let Err(e) = &result {
            if e.requires_restart() {
                warn!(engine = %self.config.name, "{}; engine will be restarted on next request", e);
                self.discard_process();
            }
        }
        result
    }

    fn exchange(&mut self, request: &SearchRequest) -> Result<BestMove, EngineError> {
        self.handshake()?;

        if let Some(elo) = self.config.strength_cap {
            self.send_command("setoption name UCI_LimitStrength value true")?;
            self.send_command(&format!("setoption name UCI_Elo value {}", elo))?;
        }
        if let Some(threads) = self.config.max_threads {
            self.send_command(&format!("setoption name Threads value {}", threads))?;
        }

        self.send_command(&request.position_command())?;
        self.send_command(&request.go_command())?;
        self.state = DriverState::Searching;

        let line = self.wait_for("bestmove", self.config.search_timeout())?;
        self.state = DriverState::Ready;
        BestMove::parse(&line)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        if self.state == DriverState::Handshaking {
            // The greeting sent on launch is still unanswered.
        } else if self.config.handshake_every_move {
            self.send_command("uci")?;
            self.state = DriverState::Handshaking;
        } else {
            return Ok(());
        }
        self.wait_for("uciok", self.config.handshake_timeout)?;
        self.state = DriverState::Ready;
        Ok(())
    }

    /// Send one raw command line.
    pub fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| EngineError::NotRunning(self.config.name.clone()))?;
        if !transport.is_open() {
            // The process behind it is gone; forget it so a request can relaunch.
            self.discard_process();
            return Err(self.not_running());
        }
        debug!(engine = %self.config.name, ">> {}", command);
        if let Some(log) = self.log.as_mut() {
            log.record(">>", command)?;
        }
        transport.write_line(command)
    }

    /// Read lines until one starts with `prefix`; every other line is logged
    /// and dropped.
    fn wait_for(&mut self, prefix: &'static str, timeout: Duration) -> Result<String, EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let transport = self
                .transport
                .as_mut()
                .ok_or_else(|| EngineError::NotRunning(self.config.name.clone()))?;
            let line = match transport.read_line(remaining) {
                Received::Line(line) => line,
                Received::EndOfStream => {
                    return Err(EngineError::Exited {
                        engine: self.config.name.clone(),
                        expected: prefix,
                    })
                }
                Received::TimedOut => {
                    return Err(EngineError::Timeout {
                        engine: self.config.name.clone(),
                        expected: prefix,
                        waited: timeout,
                    })
                }
            };

            let line = line.trim();
            if !line.is_empty() {
                debug!(engine = %self.config.name, "<< {}", line);
                if let Some(log) = self.log.as_mut() {
                    log.record("<<", line)?;
                }
            }
            if line.starts_with(prefix) {
                return Ok(line.to_string());
            }
        }
    }

    /// Send `quit` and close the process. Safe to call any number of times and
    /// never fails; problems are only logged.
    pub fn shutdown(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            // A discarded process still counts: no relaunch after shutdown.
            if self.launched {
                self.state = DriverState::Stopped;
            }
            return;
        };

        if transport.is_open() {
            debug!(engine = %self.config.name, ">> quit");
            if let Some(log) = self.log.as_mut() {
                if let Err(e) = log.record(">>", "quit") {
                    warn!(engine = %self.config.name, "could not write protocol log: {}", e);
                }
            }
            if let Err(e) = transport.write_line("quit") {
                debug!(engine = %self.config.name, "quit not delivered: {}", e);
            }
        }
        transport.close();
        self.log = None;
        self.state = DriverState::Stopped;
        info!(engine = %self.config.name, "engine stopped");
    }

    /// Throw away a process that can no longer be trusted. The next request
    /// launches a fresh one.
    fn discard_process(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.log = None;
        self.state = DriverState::NotStarted;
    }

    fn not_running(&self) -> EngineError {
        EngineError::NotRunning(self.config.name.clone())
    }
}

impl Drop for UciDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;
