use super::*;

#[test]
fn test_elo_calculation() {
    // Equal ratings should give 50% expected score
    let expected = expected_score(1500, 1500);
    assert!((expected - 0.5).abs() < 0.001);

    // 400 points is roughly 10:1 odds
    assert!((expected_score(1900, 1500) - 0.909).abs() < 0.001);
}

#[test]
fn test_elo_update() {
    let (white, black) = rate_game(DEFAULT_ELO, DEFAULT_ELO, GameResult::Win);
    assert_eq!(white, DEFAULT_ELO + 16);
    assert_eq!(black, DEFAULT_ELO - 16);
}

#[test]
fn test_draw_moves_ratings_towards_each_other() {
    let (white, black) = rate_game(1800, 1400, GameResult::Draw);
    assert!(white < 1800);
    assert!(black > 1400);
    assert_eq!(white + black, 3200);
}

#[test]
fn test_expected_win_barely_moves_ratings() {
    let (white, black) = rate_game(2400, 1200, GameResult::Win);
    assert_eq!((white, black), (2400, 1200));
}

#[test]
fn test_match_result_tally() {
    let mut tally = MatchResult::new();
    for result in [GameResult::Win, GameResult::Draw, GameResult::Loss, GameResult::Win] {
        tally.record(result);
    }
    assert_eq!(tally.total_games(), 4);
    assert!((tally.score() - 0.625).abs() < 1e-9);
    assert_eq!(GameResult::Win.flip(), GameResult::Loss);
}
