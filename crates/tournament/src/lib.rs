//! Tournament Runner for ML-chess
//!
//! This crate provides infrastructure for:
//! - Round-robin tournaments between external UCI engines
//! - Fielding many "virtual opponents" from one binary by cloning sessions
//! - Tracking Elo ratings across repeated runs in a CSV standings report
//!
//! # Usage
//!
//! ```bash
//! # Run the tournament described in a TOML file
//! cargo run -p tournament -- run --config tournament.toml
//!
//! # Show the current standings
//! cargo run -p tournament -- standings --standings standings.csv
//!
//! # Check that engines answer and how long they take
//! cargo run -p tournament -- check --engine engines/stockfish --depth 12
//! ```

mod calibration;
mod config;
mod elo;
mod error;
mod match_runner;
mod player;
mod records;
mod round_robin;
mod standings;

#[cfg(test)]
mod test_support;

pub use calibration::*;
pub use config::*;
pub use elo::*;
pub use error::*;
pub use match_runner::*;
pub use player::*;
pub use records::*;
pub use round_robin::*;
pub use standings::*;
