//! UCI engine controller for ML-chess
//!
//! This crate drives external chess engines that speak the Universal Chess
//! Interface over stdin/stdout:
//! - Launching the engine process (native binary or jar via a JVM)
//! - Handshake, strength and thread options, position and search commands
//! - Bounded waits so a frozen engine fails with a timeout instead of hanging
//! - Per-session protocol logs (`>> sent` / `<< received`)
//!
//! # Usage
//!
//! ```no_run
//! use uci_client::{EngineConfig, EngineSession, SearchMode};
//!
//! let config = EngineConfig::new("/usr/local/bin/stockfish")
//!     .with_name("Stockfish 1500")
//!     .with_mode(SearchMode::MoveTime(200))
//!     .with_strength_cap(1500);
//! let mut session = EngineSession::new(config);
//! let reply = session.request_move(&["e2e4", "e7e5"])?;
//! println!("{} plays {}", session.name(), reply);
//! # Ok::<(), uci_client::EngineError>(())
//! ```

mod command;
mod config;
mod driver;
mod error;
mod search;
mod session;
mod transport;

pub use command::*;
pub use config::*;
pub use driver::*;
pub use error::*;
pub use search::*;
pub use session::*;
pub use transport::*;
