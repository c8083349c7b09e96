use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::opponent::bot_name;
use crate::rating::{clamp_rating, rank_with_ceiling, RankTier, MIN_RATING};

/// Lowest rating a freshly seeded bot can get.
const SEED_RATING_FLOOR: i32 = MIN_RATING + 100;
/// Seeded ratings span this many points above the seed floor.
const SEED_RATING_RANGE: f64 = 2000.0;
/// Exponent > 1 skews seeded ratings toward the low end.
const SEED_SKEW: f64 = 1.2;

const JOLT_CHANCE: f64 = 0.04;
const JOLT_SPAN: f64 = 400.0;
const REACTION_NUDGE_CHANCE: f64 = 0.5;
const REACTION_NUDGE_SPAN: f64 = 20.0;
const MIN_AVERAGE_REACTION_MS: u32 = 80;

/// Display name of the live player's transient row.
pub const PLAYER_NAME: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    #[serde(alias = "elo")]
    pub rating: i32,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default, alias = "avgReaction")]
    pub average_reaction_ms: u32,
    #[serde(default)]
    pub wins: u32,
}

/// One row of the merged, display-ready board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position.
    pub position: u32,
    pub name: String,
    pub rating: i32,
    pub tier: RankTier,
    pub is_player: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Seed a new population of `capacity` bots.
    pub fn generate<R: RngExt + ?Sized>(capacity: usize, rng: &mut R) -> Self {
        let entries = (0..capacity)
            .map(|i| {
                let skewed = rng.random::<f64>().powf(SEED_SKEW);
                let games = 50 + (rng.random::<f64>() * 800.0).round() as u32;
                let average_reaction_ms = 200 + (rng.random::<f64>() * 400.0).round() as u32;
                let win_rate = 0.3 + rng.random::<f64>() * 0.5;
                LeaderboardEntry {
                    name: bot_name(i, rng),
                    rating: SEED_RATING_FLOOR + (skewed * SEED_RATING_RANGE).round() as i32,
                    games_played: games,
                    average_reaction_ms,
                    wins: (games as f64 * win_rate).round() as u32,
                }
            })
            .collect();
        log::info!("seeded leaderboard with {} bots", capacity);
        Self::from_entries(entries, capacity)
    }

    /// Adopt a stored population, restoring the size and order invariants.
    pub fn from_entries(entries: Vec<LeaderboardEntry>, capacity: usize) -> Self {
        let mut board = Self { capacity, entries };
        for entry in &mut board.entries {
            entry.rating = clamp_rating(entry.rating);
            entry.wins = entry.wins.min(entry.games_played);
        }
        board.normalize();
        board
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.rating.cmp(&a.rating));
        self.entries.truncate(self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Lowest rating on the board, if any.
    pub fn min_rating(&self) -> Option<i32> {
        self.entries.last().map(|e| e.rating)
    }

    pub fn find(&self, name: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// One drift tick over the whole population.
    pub fn drift<R: RngExt + ?Sized>(&mut self, rng: &mut R) {
        for entry in &mut self.entries {
            let mood = rng.random::<f64>() - 0.5;
            let volatility = 20.0 + rng.random::<f64>() * 80.0;
            let mut change = (mood * volatility).round() as i32;
            if rng.random_bool(JOLT_CHANCE) {
                change += ((rng.random::<f64>() - 0.5) * JOLT_SPAN).round() as i32;
            }
            entry.rating = clamp_rating(entry.rating.saturating_add(change));
            entry.games_played = entry
                .games_played
                .saturating_add((rng.random::<f64>() * 3.0).round() as u32);
            if rng.random_bool(REACTION_NUDGE_CHANCE) {
                let nudge = ((rng.random::<f64>() - 0.5) * REACTION_NUDGE_SPAN).round() as i64;
                entry.average_reaction_ms = (entry.average_reaction_ms as i64 + nudge)
                    .max(MIN_AVERAGE_REACTION_MS as i64) as u32;
            }
        }
        self.normalize();
        log::debug!(
            "leaderboard drift: top {:?}, bottom {:?}",
            self.entries.first().map(|e| e.rating),
            self.min_rating()
        );
    }

    /// Merge the live player in for display. The player only appears when
    /// they beat the lowest rated bot of a full board; the stored
    /// population is left untouched.
    pub fn standings(&self, player_rating: i32, ceiling: i32) -> Vec<Standing> {
        let threshold = if self.is_full() {
            self.min_rating().unwrap_or(0)
        } else {
            0
        };

        let mut rows: Vec<(&str, i32, bool)> = self
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.rating, false))
            .collect();
        if player_rating > threshold {
            rows.push((PLAYER_NAME, player_rating, true));
            rows.sort_by(|a, b| b.1.cmp(&a.1));
            rows.truncate(self.capacity);
        }

        rows.into_iter()
            .enumerate()
            .map(|(i, (name, rating, is_player))| Standing {
                position: (i + 1) as u32,
                name: name.to_string(),
                rating,
                tier: rank_with_ceiling(rating, ceiling),
                is_player,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::GRAND_CHAMPION_THRESHOLD;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_sorted_desc(entries: &[LeaderboardEntry]) -> bool {
        entries.windows(2).all(|w| w[0].rating >= w[1].rating)
    }

    fn entry(name: &str, rating: i32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            rating,
            games_played: 10,
            average_reaction_ms: 300,
            wins: 5,
        }
    }

    #[test]
    fn generated_population_is_full_and_sorted() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Leaderboard::generate(50, &mut rng);
        assert_eq!(board.len(), 50);
        assert!(is_sorted_desc(board.entries()));
        for e in board.entries() {
            assert!((SEED_RATING_FLOOR..=SEED_RATING_FLOOR + 2000).contains(&e.rating));
            assert!((50..=850).contains(&e.games_played));
            assert!((200..=600).contains(&e.average_reaction_ms));
            assert!(e.wins <= e.games_played);
        }
    }

    #[test]
    fn drift_keeps_size_and_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut board = Leaderboard::generate(50, &mut rng);
        for _ in 0..25 {
            let games_before: u32 = board.entries().iter().map(|e| e.games_played).sum();
            board.drift(&mut rng);
            assert_eq!(board.len(), 50);
            assert!(is_sorted_desc(board.entries()));
            assert!(board.entries().iter().all(|e| e.rating >= MIN_RATING));
            assert!(board.entries().iter().all(|e| e.average_reaction_ms >= 80));
            let games_after: u32 = board.entries().iter().map(|e| e.games_played).sum();
            assert!(games_after >= games_before);
        }
    }

    #[test]
    fn from_entries_restores_invariants() {
        let entries = vec![entry("a", 1200), entry("b", 900), entry("c", 2000), entry("d", 1500)];
        let board = Leaderboard::from_entries(entries, 3);
        let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "d", "a"]);
    }

    #[test]
    fn player_above_minimum_is_merged() {
        let board = Leaderboard::from_entries(
            vec![entry("a", 2000), entry("b", 1500), entry("c", 1200)],
            3,
        );
        let rows = board.standings(1600, GRAND_CHAMPION_THRESHOLD);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].name, PLAYER_NAME);
        assert!(rows[1].is_player);
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[2].name, "b");
        // Stored population is untouched.
        assert!(board.find(PLAYER_NAME).is_none());
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn player_at_or_below_minimum_is_hidden() {
        let board = Leaderboard::from_entries(
            vec![entry("a", 2000), entry("b", 1500), entry("c", 1200)],
            3,
        );
        assert!(board.standings(1200, GRAND_CHAMPION_THRESHOLD).iter().all(|r| !r.is_player));
        assert!(board.standings(1000, GRAND_CHAMPION_THRESHOLD).iter().all(|r| !r.is_player));
    }

    #[test]
    fn partial_board_always_shows_player() {
        let board = Leaderboard::from_entries(vec![entry("a", 2000)], 50);
        let rows = board.standings(MIN_RATING, GRAND_CHAMPION_THRESHOLD);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].is_player);
    }

    #[test]
    fn standings_carry_tiers() {
        let board = Leaderboard::from_entries(vec![entry("a", 3100), entry("b", 1450)], 2);
        let rows = board.standings(MIN_RATING, GRAND_CHAMPION_THRESHOLD);
        assert!(rows[0].tier.is_grand_champion());
        assert_eq!(rows[1].tier.name(), "Silver 1");
    }

    #[test]
    fn reads_legacy_field_names() {
        let json = r#"[{"name":"NovaX","elo":1810,"gamesPlayed":300,"avgReaction":240,"wins":150}]"#;
        let entries: Vec<LeaderboardEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].rating, 1810);
        assert_eq!(entries[0].average_reaction_ms, 240);
    }
}
