//! Errors raised while controlling an engine

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between us and an engine process.
///
/// None of these are retried by the driver. Callers decide whether to
/// relaunch (see [`crate::UciDriver::is_running`]) or give up.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The OS could not create the process or hand us its pipes.
    #[error("failed to launch engine `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A command was issued against a session without a live process, either
    /// never started, shut down, or with its input already closed.
    #[error("engine `{0}` is not running")]
    NotRunning(String),

    /// The expected response prefix did not arrive in time.
    #[error("engine `{engine}` did not answer `{expected}` within {waited:?}")]
    Timeout {
        engine: String,
        expected: &'static str,
        waited: Duration,
    },

    /// The engine closed its output while we were waiting for a response.
    #[error("engine `{engine}` exited while we were waiting for `{expected}`")]
    Exited {
        engine: String,
        expected: &'static str,
    },

    /// A terminal response line that cannot be interpreted.
    #[error("malformed response from engine: `{0}`")]
    MalformedResponse(String),

    /// The input stream broke during the write itself.
    #[error("engine input stream is closed")]
    TransportClosed,

    /// The configured command line could not be split into a program and args.
    #[error("invalid engine command line `{command}`: {reason}")]
    InvalidCommand { command: String, reason: &'static str },

    #[error("engine I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// True when the process behind the session can no longer be trusted and
    /// the next request has to start a fresh one.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            EngineError::Timeout { .. } | EngineError::Exited { .. } | EngineError::TransportClosed
        )
    }
}
