//! Standings storage and reporting
//!
//! The standings report is a small CSV file:
//!
//! ```text
//! Engine,Elo,Played,Won,Drawn,Lost
//! Rival 100%,1712,40,21,9,10
//! ```
//!
//! Only the first two columns are required when reading, so hand-written
//! seed files with just names and ratings work.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::elo::{GameResult, MatchResult};
use crate::error::StandingsError;

pub const STANDINGS_HEADER: &str = "Engine,Elo,Played,Won,Drawn,Lost";

/// One participant's line in the standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub name: String,
    pub rating: i32,
    pub record: MatchResult,
}

/// Ratings and results of every participant, carried between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsStore {
    rows: Vec<StandingsRow>,
}

impl StandingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a standings report. The first line is a header and is skipped.
    pub fn parse(text: &str) -> Result<Self, StandingsError> {
        let mut store = Self::new();
        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let bad = |reason: String| StandingsError::BadRow {
                line: line_no,
                reason,
            };

            let fields = split_csv_line(line);
            if fields.len() < 2 {
                return Err(bad(format!("expected at least 2 columns, got {}", fields.len())));
            }
            let name = fields[0].trim().to_string();
            if name.is_empty() {
                return Err(bad("empty engine name".to_string()));
            }
            let rating = parse_rating(&fields[1]).ok_or_else(|| bad(format!("bad rating `{}`", fields[1])))?;
            let count = |i: usize| -> Result<u32, StandingsError> {
                match fields.get(i).map(|f| f.trim()) {
                    None | Some("") => Ok(0),
                    Some(f) => f.parse().map_err(|_| bad(format!("bad count `{}`", f))),
                }
            };
            // Column 2 (played) is derived from the others
            let record = MatchResult {
                wins: count(3)?,
                draws: count(4)?,
                losses: count(5)?,
            };

            let row = store.entry(&name);
            row.rating = rating;
            row.record = record;
        }
        Ok(store)
    }

    pub fn load(path: &Path) -> Result<Self, StandingsError> {
        let text = fs::read_to_string(path).map_err(|source| StandingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Like [`Self::load`], but a missing file is an empty store.
    pub fn load_or_default(path: &Path) -> Result<Self, StandingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StandingsError> {
        let io_err = |source| StandingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(path, self.to_csv()).map_err(io_err)
    }

    pub fn rating_of(&self, name: &str) -> Option<i32> {
        self.get(name).map(|row| row.rating)
    }

    pub fn get(&self, name: &str) -> Option<&StandingsRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// The row for `name`, created with the default rating if missing.
    pub fn entry(&mut self, name: &str) -> &mut StandingsRow {
        let idx = match self.rows.iter().position(|row| row.name == name) {
            Some(idx) => idx,
            None => {
                self.rows.push(StandingsRow {
                    name: name.to_string(),
                    rating: crate::elo::DEFAULT_ELO,
                    record: MatchResult::new(),
                });
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx]
    }

    /// Store the outcome of one game and both players' new ratings.
    pub fn record_game(
        &mut self,
        white: (&str, i32),
        black: (&str, i32),
        result: GameResult,
    ) {
        let row = self.entry(white.0);
        row.rating = white.1;
        row.record.record(result);

        let row = self.entry(black.0);
        row.rating = black.1;
        row.record.record(result.flip());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by rating, best first
    pub fn ranked(&self) -> Vec<&StandingsRow> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
        rows
    }

    /// The report as CSV, ranked by rating
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(STANDINGS_HEADER);
        csv.push('\n');
        for row in self.ranked() {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                escape_csv(&row.name),
                row.rating,
                row.record.total_games(),
                row.record.wins,
                row.record.draws,
                row.record.losses
            ));
        }
        csv
    }

    /// Human readable leaderboard
    pub fn render_table(&self) -> String {
        let mut table = String::new();
        table.push_str(&format!(
            "{:<4} {:<30} {:>6} {:>6} {:>5} {:>5} {:>5} {:>7}\n",
            "#", "Engine", "Elo", "Games", "W", "D", "L", "Score"
        ));
        table.push_str(&"-".repeat(76));
        table.push('\n');
        for (rank, row) in self.ranked().into_iter().enumerate() {
            table.push_str(&format!(
                "{:<4} {:<30} {:>6} {:>6} {:>5} {:>5} {:>5} {:>6.1}%\n",
                rank + 1,
                row.name,
                row.rating,
                row.record.total_games(),
                row.record.wins,
                row.record.draws,
                row.record.losses,
                row.record.score() * 100.0
            ));
        }
        table
    }
}

/// Ratings may have been written as decimals by other tools
fn parse_rating(field: &str) -> Option<i32> {
    let field = field.trim();
    field
        .parse::<i32>()
        .ok()
        .or_else(|| field.parse::<f64>().ok().filter(|r| r.is_finite()).map(|r| r.round() as i32))
}

/// Split one CSV line, honouring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
#[path = "standings_tests.rs"]
mod standings_tests;
