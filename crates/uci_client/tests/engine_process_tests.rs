//! Tests against a real child process (the bundled mock engine)
//!
//! These cover what the in-memory tests cannot:
//! - Spawning, pipes and stderr redirection
//! - Bounded waits against a live but unresponsive process
//! - Tearing the process down, including from another thread

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use uci_client::{
    ApplicationKind, DriverState, EngineConfig, EngineError, EngineSession, SearchMode,
};

const MOCK: &str = env!("CARGO_BIN_EXE_mock_uci_engine");

fn mock_config(dir: &Path, args: &str) -> EngineConfig {
    EngineConfig::new(format!("\"{}\" {}", MOCK, args))
        .with_name("Mock")
        .with_mode(SearchMode::MoveTime(10))
        .with_logs(dir.join("output.log"), dir.join("error.log"))
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn test_request_move_from_live_engine() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(
        mock_config(dir.path(), "--move g1f3 --ponder d7d5").with_strength_cap(1400),
    );

    let best = session.request_best_move(&["e2e4", "e7e5"]).unwrap();

    assert_eq!(best.mv, "g1f3");
    assert_eq!(best.ponder.as_deref(), Some("d7d5"));
    assert!(session.is_running());
    assert_eq!(session.state(), DriverState::Ready);

    // The same process serves the next request.
    assert_eq!(session.request_move(&["e2e4", "e7e5", "g1f3", "b8c6"]).unwrap(), "g1f3");
    session.shutdown();

    let log = std::fs::read_to_string(dir.path().join("output.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    let elo = lines.iter().position(|l| *l == ">> setoption name UCI_Elo value 1400").unwrap();
    let position = lines
        .iter()
        .position(|l| *l == ">> position startpos moves e2e4 e7e5")
        .unwrap();
    assert!(elo < position);
    assert!(lines.contains(&"<< uciok"));
    assert!(lines.contains(&"<< bestmove g1f3 ponder d7d5"));
    assert_eq!(lines.last(), Some(&">> quit"));
}

#[test]
fn test_stderr_goes_to_error_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(mock_config(dir.path(), "--stderr warming-up"));

    session.request_move::<&str>(&[]).unwrap();
    session.shutdown();

    let errors = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
    assert!(errors.contains("warming-up"));
}

#[test]
fn test_non_utf8_output_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(mock_config(dir.path(), "--latin1 --move d2d4"));

    assert_eq!(session.request_move::<&str>(&[]).unwrap(), "d2d4");
    // Still the same process on the second move.
    assert_eq!(session.request_move(&["d2d4", "d7d5"]).unwrap(), "d2d4");
    session.shutdown();

    let log = std::fs::read_to_string(dir.path().join("output.log")).unwrap();
    assert!(log.contains("<< id author J\u{FFFD}r\u{FFFD}me"));
    assert_eq!(log.matches(">> uci\n").count(), 2);
}

#[test]
fn test_jar_kind_runs_through_launcher() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = mock_config(dir.path(), "")
        .with_kind(ApplicationKind::Jar);
    // The mock ignores `-jar engine.jar`, so it can play the JVM.
    config.command = "engine.jar --move a2a3".to_string();
    config.runtime_launcher = format!("\"{}\"", MOCK);
    let mut session = EngineSession::new(config);

    assert_eq!(session.request_move::<&str>(&[]).unwrap(), "a2a3");
}

#[test]
fn test_clone_gets_its_own_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut original = EngineSession::new(mock_config(dir.path(), "--move c2c4"));
    original.request_move::<&str>(&[]).unwrap();

    let mut clone = original.clone();
    assert!(!clone.is_running());
    clone.set_name("Mock clone");
    assert_eq!(clone.request_move::<&str>(&[]).unwrap(), "c2c4");

    original.shutdown();
    assert!(!original.is_running());
    assert!(clone.is_running());
    clone.shutdown();
}

// =============================================================================
// Misbehaving engines
// =============================================================================

#[test]
fn test_silent_engine_times_out_within_bound() {
    let dir = tempfile::tempdir().unwrap();
    let config = mock_config(dir.path(), "--mode silent")
        .with_timeouts(Duration::from_secs(5), Duration::from_millis(300));
    let mut session = EngineSession::new(config);

    let start = Instant::now();
    let err = session.request_move::<&str>(&[]).unwrap_err();

    assert!(matches!(err, EngineError::Timeout { expected: "bestmove", .. }));
    assert!(start.elapsed() < Duration::from_secs(4));
    assert!(!session.is_running());
    assert_eq!(session.state(), DriverState::NotStarted);
}

#[test]
fn test_engine_without_uciok_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let config = mock_config(dir.path(), "--mode no-uciok")
        .with_timeouts(Duration::from_millis(300), Duration::from_secs(5));
    let mut session = EngineSession::new(config);

    let err = session.request_move::<&str>(&[]).unwrap_err();
    assert!(matches!(err, EngineError::Timeout { expected: "uciok", .. }));
}

#[test]
fn test_malformed_bestmove() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(mock_config(dir.path(), "--mode malformed"));

    let err = session.request_move::<&str>(&[]).unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse(_)));
    assert!(session.is_running());
}

#[test]
fn test_engine_exit_during_search() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(mock_config(dir.path(), "--mode exit-on-go"));

    let err = session.request_move::<&str>(&[]).unwrap_err();
    assert!(matches!(err, EngineError::Exited { .. }));
    assert!(!session.is_running());

    // The session relaunches on the next request.
    let err = session.request_move::<&str>(&[]).unwrap_err();
    assert!(matches!(err, EngineError::Exited { .. }));
}

#[test]
fn test_missing_binary_is_a_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(
        EngineConfig::new(dir.path().join("no-such-engine").display().to_string())
            .with_logs(dir.path().join("output.log"), dir.path().join("error.log")),
    );

    let err = session.request_move::<&str>(&[]).unwrap_err();
    assert!(matches!(err, EngineError::Launch { .. }));
    assert!(!session.is_running());
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_explicit_start_without_auto_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = mock_config(dir.path(), "");
    config.auto_start = false;
    let mut session = EngineSession::new(config);

    assert!(matches!(
        session.request_move::<&str>(&[]),
        Err(EngineError::NotRunning(_))
    ));

    session.start().unwrap();
    assert_eq!(session.state(), DriverState::Handshaking);
    assert!(session.is_running());
    assert_eq!(session.request_move::<&str>(&[]).unwrap(), "e2e4");
}

#[test]
fn test_shutdown_twice() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EngineSession::new(mock_config(dir.path(), ""));
    session.request_move::<&str>(&[]).unwrap();

    session.shutdown();
    assert!(!session.is_running());
    session.shutdown();
    assert!(!session.is_running());
    assert_eq!(session.state(), DriverState::Stopped);
}

#[test]
fn test_abort_unblocks_pending_search() {
    let dir = tempfile::tempdir().unwrap();
    let config = mock_config(dir.path(), "--mode silent")
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(30));
    let mut session = EngineSession::new(config);
    session.start().unwrap();
    let abort = session.abort_handle().unwrap();

    let killer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        abort.abort();
    });

    let start = Instant::now();
    let err = session.request_move::<&str>(&[]).unwrap_err();
    killer.join().unwrap();

    assert!(matches!(err, EngineError::Exited { .. }));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_sessions_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let handles: Vec<_> = ["a2a4", "b2b4", "c2c4"]
        .iter()
        .enumerate()
        .map(|(i, mv)| {
            let sub = dir.path().join(i.to_string());
            let mut session = EngineSession::new(mock_config(&sub, &format!("--move {}", mv)));
            thread::spawn(move || session.request_move::<&str>(&[]).unwrap())
        })
        .collect();

    let moves: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(moves, vec!["a2a4", "b2b4", "c2c4"]);
}
