use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use aim_core::{EngineConfig, Leaderboard};

use crate::error::StoreError;
use crate::profile;
use crate::store::KeyValueStore;

/// Load (or seed) the stored population, drift it once and write it back.
pub async fn tick<S: KeyValueStore, R: RngExt + ?Sized>(
    store: &S,
    capacity: usize,
    rng: &mut R,
) -> Result<Leaderboard, StoreError> {
    let mut board = match profile::load_leaderboard(store, capacity).await? {
        Some(board) => board,
        None => Leaderboard::generate(capacity, rng),
    };
    board.drift(rng);
    profile::save_leaderboard(store, &board).await?;
    Ok(board)
}

/// Seed for drift randomness: derived from the configured seed, fresh otherwise.
fn drift_seed(config: &EngineConfig) -> u64 {
    config
        .seed
        .map(|s| s.wrapping_add(1))
        .unwrap_or_else(|| rand::rng().random())
}

/// A single drift tick with its own rng, as the timer would run it.
pub async fn tick_once<S: KeyValueStore>(
    store: &S,
    config: &EngineConfig,
) -> Result<Leaderboard, StoreError> {
    let mut rng = StdRng::seed_from_u64(drift_seed(config));
    tick(store, config.leaderboard_capacity, &mut rng).await
}

/// Background drift timer. One task, so ticks never overlap.
pub struct DriftTimer {
    handle: JoinHandle<()>,
}

impl DriftTimer {
    /// Start ticking every `config.drift_interval_ms`. The first tick fires
    /// one full interval after the call.
    pub fn spawn<S: KeyValueStore + 'static>(store: Arc<S>, config: &EngineConfig) -> Self {
        let period = Duration::from_millis(config.drift_interval_ms.max(1));
        let capacity = config.leaderboard_capacity;
        let seed = drift_seed(config);

        let handle = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                match tick(store.as_ref(), capacity, &mut rng).await {
                    Ok(board) => log::info!(
                        "leaderboard refreshed, top rating {:?}",
                        board.entries().first().map(|e| e.rating)
                    ),
                    Err(e) => log::warn!("leaderboard drift failed: {}", e),
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn unseeded_ticks_differ() {
        let config = EngineConfig::default();
        let a = tick_once(&MemoryStore::new(), &config).await.unwrap();
        let b = tick_once(&MemoryStore::new(), &config).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn seeded_ticks_repeat() {
        let config = EngineConfig {
            seed: Some(42),
            ..EngineConfig::default()
        };
        let a = tick_once(&MemoryStore::new(), &config).await.unwrap();
        let b = tick_once(&MemoryStore::new(), &config).await.unwrap();
        assert_eq!(a, b);
    }
}
