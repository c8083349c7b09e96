use aim_core::rating::clamp_rating;
use aim_core::{Leaderboard, LeaderboardEntry, PlayerStats, MIN_RATING};

use crate::error::StoreError;
use crate::store::KeyValueStore;

pub const RATING_KEY: &str = "rating";
pub const STATS_KEY: &str = "player_stats";
pub const LEADERBOARD_KEY: &str = "leaderboard";

/// Stored rating, or the floor when missing or unreadable.
pub async fn load_rating<S: KeyValueStore>(store: &S) -> Result<i32, StoreError> {
    let Some(raw) = store.get(RATING_KEY).await? else {
        return Ok(MIN_RATING);
    };
    match raw.trim().parse::<i32>() {
        Ok(rating) => Ok(clamp_rating(rating)),
        Err(e) => {
            log::warn!("discarding stored rating {:?}: {}", raw, e);
            Ok(MIN_RATING)
        }
    }
}

pub async fn save_rating<S: KeyValueStore>(store: &S, rating: i32) -> Result<(), StoreError> {
    store
        .set(RATING_KEY, &clamp_rating(rating).to_string())
        .await
}

/// Stored stats, or zeroed stats when missing or unreadable.
pub async fn load_stats<S: KeyValueStore>(store: &S) -> Result<PlayerStats, StoreError> {
    let Some(raw) = store.get(STATS_KEY).await? else {
        return Ok(PlayerStats::default());
    };
    match serde_json::from_str(&raw) {
        Ok(stats) => Ok(stats),
        Err(e) => {
            log::warn!("discarding stored player stats: {}", e);
            Ok(PlayerStats::default())
        }
    }
}

pub async fn save_stats<S: KeyValueStore>(store: &S, stats: &PlayerStats) -> Result<(), StoreError> {
    store.set(STATS_KEY, &serde_json::to_string(stats)?).await
}

/// Save a settled match: rating and stats land together or not at all.
pub async fn save_progress<S: KeyValueStore>(
    store: &S,
    rating: i32,
    stats: &PlayerStats,
) -> Result<(), StoreError> {
    store
        .set_many(&[
            (RATING_KEY, clamp_rating(rating).to_string()),
            (STATS_KEY, serde_json::to_string(stats)?),
        ])
        .await
}

/// Stored population, normalised to `capacity`. `None` when missing,
/// unreadable or empty, so the caller can seed a fresh one.
pub async fn load_leaderboard<S: KeyValueStore>(
    store: &S,
    capacity: usize,
) -> Result<Option<Leaderboard>, StoreError> {
    let Some(raw) = store.get(LEADERBOARD_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
        Ok(entries) if !entries.is_empty() => Ok(Some(Leaderboard::from_entries(entries, capacity))),
        Ok(_) => {
            log::warn!("stored leaderboard is empty, reseeding");
            Ok(None)
        }
        Err(e) => {
            log::warn!("discarding stored leaderboard: {}", e);
            Ok(None)
        }
    }
}

pub async fn save_leaderboard<S: KeyValueStore>(
    store: &S,
    board: &Leaderboard,
) -> Result<(), StoreError> {
    save_entries(store, board.entries()).await
}

pub async fn save_entries<S: KeyValueStore>(
    store: &S,
    entries: &[LeaderboardEntry],
) -> Result<(), StoreError> {
    store
        .set(LEADERBOARD_KEY, &serde_json::to_string(entries)?)
        .await
}
