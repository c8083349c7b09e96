use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::rating::clamp_rating;

const PREFIXES: &[&str] = &[
    "Alpha", "Neo", "Void", "xX", "Hyper", "Omega", "Rapid", "Silent", "Ghost", "Prime", "Flux",
    "Nova", "Viper", "Crimson", "Azure", "Iron", "Steel", "Quantum", "Echo", "Rogue", "Drift",
    "Sable", "Frost", "Blaze", "Storm", "Pulse", "Vector", "Zen", "Apex", "Bolt",
];

const SUFFIXES: &[&str] = &[
    "Slayer", "One", "Prime", "Z", "Hunter", "X", "Max", "Pro", "Bot", "Unit", "Zero", "Edge",
    "Core", "Strike", "Wing", "Shift",
];

/// Chance that a generated name takes a word suffix instead of a number tag.
const SUFFIX_CHANCE: f64 = 0.35;

/// A synthetic opponent for one ranked match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    pub rating: i32,
}

/// Pick an opponent rated within `spread` points of the player.
pub fn select_opponent<R: RngExt + ?Sized>(player_rating: i32, spread: i32, rng: &mut R) -> Opponent {
    let spread = spread.max(0);
    let diff = rng.random_range(-spread..=spread);
    let rating = clamp_rating(player_rating.saturating_add(diff));
    let name = bot_name(rng.random_range(0..PREFIXES.len()), rng);
    log::debug!("selected opponent {} ({})", name, rating);
    Opponent { name, rating }
}

/// Build a bot name from a prefix slot plus either a suffix or a 3-digit tag.
/// Names are not unique.
pub fn bot_name<R: RngExt + ?Sized>(index: usize, rng: &mut R) -> String {
    let prefix = PREFIXES[index % PREFIXES.len()];
    if rng.random_bool(SUFFIX_CHANCE) {
        format!("{}{}", prefix, SUFFIXES[(index * 7) % SUFFIXES.len()])
    } else {
        format!("{}{}", prefix, rng.random_range(100..=999))
    }
}
