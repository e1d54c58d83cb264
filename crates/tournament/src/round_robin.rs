//! Round-robin scheduling
//!
//! Every participant plays every other participant twice per run, once
//! with each colour. Ratings move after every game and are mirrored into a
//! [`StandingsStore`] that outlives the tournament.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use uci_client::EngineSession;

use crate::elo::rate_game;
use crate::error::TournamentError;
use crate::match_runner::{GameRecord, MatchRunner};
use crate::player::Player;
use crate::standings::StandingsStore;

/// One scheduled game, by participant index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub run: u32,
    pub white: usize,
    pub black: usize,
}

/// Lazily produced schedule of a whole tournament.
///
/// The pairings of a run are only generated once the previous run is
/// exhausted.
#[derive(Debug, Clone)]
pub struct Pairings {
    participants: usize,
    runs: u32,
    seed: Option<u64>,
    current_run: u32,
    next_run: u32,
    pending: Vec<(usize, usize)>,
}

impl Pairings {
    pub fn new(participants: usize, runs: u32, seed: Option<u64>) -> Self {
        Self {
            participants,
            runs,
            seed,
            current_run: 0,
            next_run: 0,
            pending: Vec::new(),
        }
    }

    /// Number of games in one run
    pub fn games_per_run(&self) -> usize {
        self.participants * self.participants.saturating_sub(1)
    }

    fn schedule_run(&mut self) {
        let n = self.participants;
        let mut pairs: Vec<_> = (0..n)
            .flat_map(|white| (0..n).map(move |black| (white, black)))
            .filter(|(white, black)| white != black)
            .collect();
        if let Some(seed) = self.seed {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.current_run as u64));
            pairs.shuffle(&mut rng);
        }
        // Consumed with pop()
        pairs.reverse();
        self.pending = pairs;
    }
}

impl Iterator for Pairings {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            if let Some((white, black)) = self.pending.pop() {
                return Some(Match {
                    run: self.current_run,
                    white,
                    black,
                });
            }
            if self.next_run >= self.runs || self.games_per_run() == 0 {
                return None;
            }
            self.current_run = self.next_run;
            self.next_run += 1;
            self.schedule_run();
        }
    }
}

/// Round-robin tournament between players.
///
/// Participants are owned by the tournament and shut down exactly once,
/// either by [`RoundRobin::close`] or when the tournament is dropped.
pub struct RoundRobin<P: Player = EngineSession> {
    participants: Vec<P>,
    runs: u32,
    shuffle_seed: Option<u64>,
    runner: MatchRunner,
    standings: StandingsStore,
    closed: bool,
}

impl<P: Player> RoundRobin<P> {
    /// Ratings of known participants are taken from `standings`.
    pub fn new(runner: MatchRunner, standings: StandingsStore) -> Self {
        Self {
            participants: Vec::new(),
            runs: 1,
            shuffle_seed: None,
            runner,
            standings,
            closed: false,
        }
    }

    pub fn set_number_of_runs(&mut self, runs: u32) {
        self.runs = runs;
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Shuffle the game order of every run, reproducibly
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Register a participant and return its index.
    ///
    /// A participant already present in the standings continues from its
    /// stored rating, a new one is added with its own.
    pub fn add_participant(&mut self, mut player: P) -> usize {
        match self.standings.rating_of(player.name()) {
            Some(rating) => player.set_rating(rating),
            None => self.standings.entry(player.name()).rating = player.rating(),
        }
        info!(engine = player.name(), rating = player.rating(), "participant added");
        self.participants.push(player);
        self.participants.len() - 1
    }

    pub fn participants(&self) -> &[P] {
        &self.participants
    }

    pub fn next_matches(&self) -> Pairings {
        Pairings::new(self.participants.len(), self.runs, self.shuffle_seed)
    }

    /// Play one game and update both players' ratings.
    pub fn play(&mut self, game: &Match) -> Result<GameRecord, TournamentError> {
        if self.closed {
            return Err(TournamentError::Closed);
        }
        for idx in [game.white, game.black] {
            if idx >= self.participants.len() {
                return Err(TournamentError::UnknownParticipant(idx));
            }
        }
        if game.white == game.black {
            return Err(TournamentError::SelfPairing(game.white));
        }

        let (white, black) = pair_mut(&mut self.participants, game.white, game.black);
        let record = self.runner.play_game(white, black)?;

        let (white_rating, black_rating) = rate_game(white.rating(), black.rating(), record.result);
        white.set_rating(white_rating);
        black.set_rating(black_rating);
        self.standings.record_game(
            (white.name(), white_rating),
            (black.name(), black_rating),
            record.result,
        );

        info!(
            run = game.run,
            "{} {} {} ({:?}, {} plies)",
            record.white,
            record.result.as_pgn(),
            record.black,
            record.termination,
            record.moves.len()
        );
        Ok(record)
    }

    /// Current standings as a CSV report
    pub fn standings_table(&self) -> String {
        self.standings.to_csv()
    }

    pub fn standings(&self) -> &StandingsStore {
        &self.standings
    }

    /// Close the tournament and hand back the final standings.
    pub fn into_standings(mut self) -> StandingsStore {
        self.close();
        std::mem::take(&mut self.standings)
    }

    /// Shut every participant down. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for player in &mut self.participants {
            player.shutdown();
        }
    }
}

impl<P: Player> Drop for RoundRobin<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
#[path = "round_robin_tests.rs"]
mod round_robin_tests;
