//! Raw line transport to an engine process
//!
//! The transport knows nothing about UCI. It starts the process, writes
//! lines to its stdin and hands back lines from its stdout. Reads go through
//! a channel fed by a reader thread so every wait can be bounded.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::command::LaunchCommand;
use crate::error::EngineError;

/// Result of waiting for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Line(String),
    /// The engine closed its output (usually because it exited)
    EndOfStream,
    TimedOut,
}

/// A bidirectional line channel to an engine.
///
/// [`ProcessTransport`] is the real thing; anything else that can exchange
/// lines (tests, a socket) can drive a [`crate::UciDriver`] as well.
pub trait Transport: Send {
    /// Write `text` followed by a newline and flush it.
    fn write_line(&mut self, text: &str) -> Result<(), EngineError>;

    /// Wait at most `timeout` for the next line.
    fn read_line(&mut self, timeout: Duration) -> Received;

    /// True while the input side can still be written to.
    fn is_open(&self) -> bool;

    /// Close both streams and make sure the peer is gone. Must not block for
    /// long and must be safe to call more than once.
    fn close(&mut self);

    /// A handle that can tear the transport down from another thread.
    fn abort_handle(&self) -> Option<AbortHandle> {
        None
    }
}

/// Kills the engine process from outside the thread that drives it.
///
/// A read blocked on the killed process then sees end-of-stream.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    child: Arc<Mutex<Child>>,
}

impl AbortHandle {
    pub fn abort(&self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = child.kill() {
            debug!("abort: kill failed (process probably gone): {}", e);
        }
    }
}

/// An engine running as a child process.
pub struct ProcessTransport {
    child: Arc<Mutex<Child>>,
    stdin: Option<BufWriter<ChildStdin>>,
    lines: Receiver<String>,
    exit_grace: Duration,
    closed: bool,
}

impl ProcessTransport {
    /// Spawn `command` with piped stdin/stdout and stderr appended to
    /// `error_log`.
    pub fn start(
        command: &LaunchCommand,
        error_log: &Path,
        exit_grace: Duration,
    ) -> Result<Self, EngineError> {
        let launch_error = |source| EngineError::Launch {
            command: command.to_string(),
            source,
        };

        if let Some(dir) = error_log.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(launch_error)?;
        }
        let stderr = OpenOptions::new()
            .create(true)
            .append(true)
            .open(error_log)
            .map_err(launch_error)?;

        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(launch_error)?;

        let missing_pipe = |name: &str| {
            launch_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("engine {} is not available", name),
            ))
        };
        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(missing_pipe("stdin"));
            }
        };
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(missing_pipe("stdout"));
            }
        };

        let (tx, rx) = mpsc::channel::<String>();
        thread::Builder::new()
            .name(format!("uci-reader-{}", child.id()))
            .spawn(move || read_lines(BufReader::new(stdout), tx))
            .map_err(launch_error)?;

        debug!(pid = child.id(), "started `{}`", command);

        Ok(Self {
            child: Arc::new(Mutex::new(child)),
            stdin: Some(BufWriter::new(stdin)),
            lines: rx,
            exit_grace,
            closed: false,
        })
    }

    fn wait_or_kill(&mut self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.exit_grace;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(pid = child.id(), "engine exited with {}", status);
                    return;
                }
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(e) => {
                    warn!(pid = child.id(), "could not poll engine process: {}", e);
                    break;
                }
            }
        }
        debug!(pid = child.id(), "engine did not exit in {:?}, killing it", self.exit_grace);
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Forward every output line until the stream ends. Engines are not bound to
/// UTF-8, so undecodable bytes are replaced rather than ending the stream.
fn read_lines(mut reader: impl BufRead, tx: Sender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("engine output unreadable: {}", e);
                break;
            }
        }
    }
}

impl Transport for ProcessTransport {
    fn write_line(&mut self, text: &str) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::TransportClosed)?;
        let written = stdin
            .write_all(text.as_bytes())
            .and_then(|_| stdin.write_all(b"\n"))
            .and_then(|_| stdin.flush());
        match written {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                // The engine is gone, so is our input stream.
                self.stdin = None;
                Err(EngineError::TransportClosed)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_line(&mut self, timeout: Duration) -> Received {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Received::Line(line),
            Err(RecvTimeoutError::Timeout) => Received::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Received::EndOfStream,
        }
    }

    fn is_open(&self) -> bool {
        !self.closed && self.stdin.is_some()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Dropping stdin sends EOF, which most engines treat like `quit`.
        self.stdin = None;
        self.wait_or_kill();
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        Some(AbortHandle {
            child: Arc::clone(&self.child),
        })
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod transport_tests;
