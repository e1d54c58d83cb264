//! Measuring how fast engines search
//!
//! Timed opponents are given a share of the time a reference engine needs
//! for a fixed amount of work, so strength settings carry over between
//! machines.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use uci_client::{EngineError, EngineSession};

/// Wall time of one search from the start position.
///
/// The process is started before the clock runs so launch cost is not
/// counted, and shut down afterwards.
pub fn time_search(session: &mut EngineSession) -> Result<Duration, EngineError> {
    let result = session.start().and_then(|()| {
        let started = Instant::now();
        session.request_move::<&str>(&[])?;
        Ok(started.elapsed())
    });
    session.shutdown();

    match &result {
        Ok(elapsed) => info!(
            engine = session.name(),
            mode = %session.mode(),
            "search took {} ms",
            elapsed.as_millis()
        ),
        Err(e) => warn!(engine = session.name(), "calibration failed: {}", e),
    }
    result
}

/// Time several engines at once, one thread each.
pub fn time_searches(sessions: &mut [EngineSession]) -> Vec<Result<Duration, EngineError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = sessions
            .iter_mut()
            .map(|session| scope.spawn(move || time_search(session)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

/// `percent` of `reference`, in whole milliseconds rounded up.
pub fn percent_of(reference: Duration, percent: u32) -> u64 {
    let scaled = reference.as_millis() * percent as u128;
    scaled.div_ceil(100).try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "calibration_tests.rs"]
mod calibration_tests;
