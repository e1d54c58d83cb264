use super::*;

#[test]
fn test_parse_minimal_seed_file() {
    let store = StandingsStore::parse("Engine,Elo\nRival,1712\nOther,1400.6\n").unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.rating_of("Rival"), Some(1712));
    assert_eq!(store.rating_of("Other"), Some(1401));
    assert_eq!(store.get("Rival").unwrap().record.total_games(), 0);
}

#[test]
fn test_parse_full_rows() {
    let text = "Engine,Elo,Played,Won,Drawn,Lost\n\"Rival, 50%\",1650,10,5,3,2\n\n";
    let store = StandingsStore::parse(text).unwrap();

    let row = store.get("Rival, 50%").unwrap();
    assert_eq!(row.rating, 1650);
    assert_eq!(row.record, MatchResult { wins: 5, losses: 2, draws: 3 });
}

#[test]
fn test_parse_rejects_bad_rows() {
    let err = StandingsStore::parse("Engine,Elo\nRival\n").unwrap_err();
    assert!(matches!(err, StandingsError::BadRow { line: 2, .. }));

    let err = StandingsStore::parse("Engine,Elo\nRival,strong\n").unwrap_err();
    assert!(matches!(err, StandingsError::BadRow { line: 2, .. }));

    let err = StandingsStore::parse("Engine,Elo\nRival,1600,1,x\n").unwrap_err();
    assert!(matches!(err, StandingsError::BadRow { .. }));
}

#[test]
fn test_header_only_is_empty() {
    let store = StandingsStore::parse(STANDINGS_HEADER).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_record_game_updates_both_sides() {
    let mut store = StandingsStore::new();
    store.record_game(("A", 1616), ("B", 1584), GameResult::Win);
    store.record_game(("B", 1590), ("A", 1610), GameResult::Draw);

    let a = store.get("A").unwrap();
    assert_eq!(a.rating, 1610);
    assert_eq!(a.record, MatchResult { wins: 1, losses: 0, draws: 1 });
    let b = store.get("B").unwrap();
    assert_eq!(b.rating, 1590);
    assert_eq!(b.record, MatchResult { wins: 0, losses: 1, draws: 1 });
}

#[test]
fn test_csv_is_ranked_and_quoted() {
    let mut store = StandingsStore::new();
    store.entry("Weak").rating = 1200;
    store.entry("Strong, fast").rating = 2000;

    let csv = store.to_csv();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines[0], STANDINGS_HEADER);
    assert_eq!(lines[1], "\"Strong, fast\",2000,0,0,0,0");
    assert_eq!(lines[2], "Weak,1200,0,0,0,0");
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("standings.csv");

    let mut store = StandingsStore::new();
    store.record_game(("A", 1616), ("B", 1584), GameResult::Loss);
    store.save(&path).unwrap();

    let loaded = StandingsStore::load(&path).unwrap();
    assert_eq!(loaded.rating_of("A"), Some(1616));
    assert_eq!(loaded.get("A").unwrap().record.losses, 1);
    assert_eq!(loaded.get("B").unwrap().record.wins, 1);
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StandingsStore::load_or_default(&dir.path().join("none.csv")).unwrap();
    assert!(store.is_empty());

    let err = StandingsStore::load(&dir.path().join("none.csv")).unwrap_err();
    assert!(matches!(err, StandingsError::Io { .. }));
}

#[test]
fn test_render_table() {
    let mut store = StandingsStore::new();
    store.record_game(("A", 1616), ("B", 1584), GameResult::Win);

    let table = store.render_table();
    let lines: Vec<_> = table.lines().collect();

    assert!(lines[0].contains("Engine"));
    assert!(lines[2].starts_with("1") && lines[2].contains("A") && lines[2].contains("100.0%"));
    assert!(lines[3].starts_with("2") && lines[3].contains("0.0%"));
}
