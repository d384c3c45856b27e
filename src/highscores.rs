//! High score leaderboards
//!
//! One small table per game, persisted to key/value storage under
//! `arcade_cabinet.scores.<slug>`. Timed and move-counted puzzles rank lower
//! results first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::games::GameId;
use crate::platform::storage::{KeyValueStore, StorageError, load_json, save_json};

/// Maximum number of entries kept per game
pub const MAX_ENTRIES: usize = 5;

const STORAGE_PREFIX: &str = "arcade_cabinet.scores.";

/// Which direction of result is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScoreOrder {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl ScoreOrder {
    /// Strictly better; equal results never beat each other
    pub fn beats(&self, a: u64, b: u64) -> bool {
        match self {
            ScoreOrder::HigherIsBetter => a > b,
            ScoreOrder::LowerIsBetter => a < b,
        }
    }
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best results for one game, sorted best-first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub order: ScoreOrder,
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn new(order: ScoreOrder) -> Self {
        Self {
            order,
            entries: Vec::new(),
        }
    }

    /// Check if a result would make the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 && self.order == ScoreOrder::HigherIsBetter {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries
            .last()
            .map(|e| self.order.beats(score, e.score))
            .unwrap_or(true)
    }

    /// Rank a result would get (1-indexed), without inserting it
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        Some(self.insertion_index(score) + 1)
    }

    /// Insert a result if it qualifies, returning its rank (1-indexed)
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let index = self.insertion_index(score);
        self.entries.insert(index, ScoreEntry { score, timestamp });
        self.entries.truncate(MAX_ENTRIES);
        Some(index + 1)
    }

    // Ties go after existing entries so the earlier result keeps its place
    fn insertion_index(&self, score: u64) -> usize {
        self.entries
            .iter()
            .position(|e| self.order.beats(score, e.score))
            .unwrap_or(self.entries.len())
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Every game's leaderboard
#[derive(Debug, Clone, Default)]
pub struct ScoreBook {
    boards: HashMap<GameId, Leaderboard>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_key(id: GameId) -> String {
        format!("{}{}", STORAGE_PREFIX, id.slug())
    }

    /// Load all boards. Unreadable entries start empty and are overwritten on
    /// the next save.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut book = Self::new();
        for id in GameId::ALL {
            match load_json::<Leaderboard>(store, &Self::storage_key(id)) {
                Ok(Some(mut board)) => {
                    // The catalog decides ordering, not whatever was stored
                    board.order = id.score_order();
                    board.entries.truncate(MAX_ENTRIES);
                    book.boards.insert(id, board);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Ignoring stored scores for {}: {}", id.slug(), e),
            }
        }
        log::info!("Loaded high scores for {} games", book.boards.len());
        book
    }

    /// The board for a game (empty if nothing recorded yet)
    pub fn board(&self, id: GameId) -> Leaderboard {
        self.boards
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Leaderboard::new(id.score_order()))
    }

    pub fn best(&self, id: GameId) -> Option<u64> {
        self.boards.get(&id).and_then(Leaderboard::best)
    }

    /// Record a finished run and persist that game's board if it changed
    pub fn record(
        &mut self,
        store: &mut impl KeyValueStore,
        id: GameId,
        score: u64,
        timestamp: f64,
    ) -> Result<Option<usize>, StorageError> {
        let board = self
            .boards
            .entry(id)
            .or_insert_with(|| Leaderboard::new(id.score_order()));
        let Some(rank) = board.add_score(score, timestamp) else {
            return Ok(None);
        };
        save_json(store, &Self::storage_key(id), board)?;
        log::info!("{} score {} ranked #{}", id.slug(), score, rank);
        Ok(Some(rank))
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let diff_mins = (js_sys::Date::now() - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 7.0 {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    } else if diff_days >= 2.0 {
        format!("{} days ago", diff_days.floor() as i32)
    } else if diff_days >= 1.0 {
        "Yesterday".to_string()
    } else if diff_hours >= 1.0 {
        format!("{}h ago", diff_hours.floor() as i32)
    } else if diff_mins >= 1.0 {
        format!("{}m ago", diff_mins.floor() as i32)
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn zero_never_qualifies_when_higher_is_better() {
        let board = Leaderboard::new(ScoreOrder::HigherIsBetter);
        assert!(!board.qualifies(0));
        let timed = Leaderboard::new(ScoreOrder::LowerIsBetter);
        assert!(timed.qualifies(0));
    }

    #[test]
    fn ties_keep_earlier_entry_first() {
        let mut board = Leaderboard::new(ScoreOrder::HigherIsBetter);
        assert_eq!(board.add_score(100, 1.0), Some(1));
        assert_eq!(board.add_score(100, 2.0), Some(2));
        assert_eq!(board.entries[0].timestamp, 1.0);
    }

    #[test]
    fn full_board_rejects_worse_and_trims() {
        let mut board = Leaderboard::new(ScoreOrder::LowerIsBetter);
        for s in [30, 40, 50, 60, 70] {
            board.add_score(s, 0.0);
        }
        assert!(!board.qualifies(70));
        assert_eq!(board.potential_rank(10), Some(1));
        assert_eq!(board.add_score(45, 0.0), Some(3));
        assert_eq!(board.len(), MAX_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(60));
    }

    #[test]
    fn record_persists_and_reloads() {
        let mut store = MemoryStore::new();
        let mut book = ScoreBook::new();
        let rank = book.record(&mut store, GameId::Snake, 120, 5.0).unwrap();
        assert_eq!(rank, Some(1));
        assert_eq!(book.record(&mut store, GameId::Snake, 0, 6.0).unwrap(), None);

        let reloaded = ScoreBook::load(&store);
        assert_eq!(reloaded.best(GameId::Snake), Some(120));
        assert_eq!(reloaded.best(GameId::Pong), None);
    }

    #[test]
    fn corrupt_board_is_ignored() {
        let mut store = MemoryStore::new();
        store
            .set(&ScoreBook::storage_key(GameId::Tetris), "{not json")
            .unwrap();
        let book = ScoreBook::load(&store);
        assert!(book.board(GameId::Tetris).is_empty());
        assert_eq!(book.board(GameId::Minesweeper).order, ScoreOrder::LowerIsBetter);
    }

    proptest! {
        #[test]
        fn board_stays_sorted_and_bounded(
            scores in proptest::collection::vec(0u64..1000, 0..40),
            lower in any::<bool>(),
        ) {
            let order = if lower { ScoreOrder::LowerIsBetter } else { ScoreOrder::HigherIsBetter };
            let mut board = Leaderboard::new(order);
            for (i, s) in scores.iter().enumerate() {
                let predicted = board.potential_rank(*s);
                prop_assert_eq!(board.add_score(*s, i as f64), predicted);
            }
            prop_assert!(board.len() <= MAX_ENTRIES);
            for pair in board.entries.windows(2) {
                prop_assert!(!order.beats(pair[1].score, pair[0].score));
            }
        }
    }
}
