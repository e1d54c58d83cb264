use super::*;

fn rival() -> EngineSession {
    EngineSession::new(
        EngineConfig::new("engines/RivalChess.jar")
            .with_name("Rival 50%")
            .with_rating(1450)
            .with_mode(SearchMode::Nodes(500_000))
            .without_output_log(),
    )
}

#[test]
fn test_clone_does_not_share_configuration() {
    let mut original = rival();
    let mut clone = original.clone();

    clone.set_name("Rival 100%");
    clone.set_rating(1900);
    clone.set_strength_cap(Some(2000));
    clone.set_mode(SearchMode::Nodes(1_000_000));

    assert_eq!(original.name(), "Rival 50%");
    assert_eq!(original.rating(), 1450);
    assert_eq!(original.strength_cap(), None);
    assert_eq!(original.mode(), SearchMode::Nodes(500_000));

    original.set_rating(1300);
    original.set_strength_cap(Some(1200));
    assert_eq!(clone.rating(), 1900);
    assert_eq!(clone.strength_cap(), Some(2000));
}

#[test]
fn test_clone_keeps_launch_command() {
    let original = rival();
    let clone = original.clone();
    assert_eq!(clone.config().command, original.config().command);
    assert_eq!(clone.config().kind, original.config().kind);
}

#[test]
fn test_clone_starts_without_a_process() {
    let original = rival();
    let clone = original.clone();
    assert_eq!(clone.state(), DriverState::NotStarted);
    assert!(!clone.is_running());
}

#[test]
fn test_shutdown_of_unstarted_session_is_a_no_op() {
    let mut session = rival();
    session.shutdown();
    session.shutdown();
    assert!(!session.is_running());
    assert_eq!(session.state(), DriverState::NotStarted);
}

#[test]
fn test_clone_gets_its_own_log_files() {
    let original = rival();
    let mut clone = original.clone();
    clone.set_log_paths("log/clone.log", "log/clone.err");

    assert_eq!(clone.config().output_log, PathBuf::from("log/clone.log"));
    assert_eq!(clone.config().error_log, PathBuf::from("log/clone.err"));
    assert_eq!(original.config().output_log, PathBuf::from("log/output.log"));
}
