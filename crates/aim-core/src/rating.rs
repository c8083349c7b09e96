use serde::{Deserialize, Serialize};

/// Rating floor. New players start here and no update goes below it.
pub const MIN_RATING: i32 = 1000;

/// Rating at/above which the tier collapses into Grand Champion.
pub const GRAND_CHAMPION_THRESHOLD: i32 = 3000;

/// Width of a single division in rating points.
pub const DIVISION_SPAN: i32 = 100;

/// Number of divisions inside each named tier.
pub const DIVISIONS_PER_TIER: i32 = 4;

/// Clamp any rating up to the floor.
pub fn clamp_rating(rating: i32) -> i32 {
    rating.max(MIN_RATING)
}

/// Logistic expectation that `a` scores against `b`.
pub fn expected_score(a: i32, b: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((f64::from(b) - f64::from(a)) / 400.0))
}

/// Apply one ELO update with a caller-chosen K-factor.
/// `score` is 1.0 for a win, 0.5 for a draw and 0.0 for a loss.
pub fn apply_delta(rating: i32, opponent_rating: i32, score: f64, k_factor: f64) -> i32 {
    let expected = expected_score(rating, opponent_rating);
    let new_rating = f64::from(rating) + k_factor * (score - expected);
    clamp_rating(new_rating.round() as i32)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Champion,
    GrandChampion,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Champion => "Champion",
            Tier::GrandChampion => "Grand Champion",
        }
    }

    /// The divided tiers, lowest first.
    pub fn divided() -> &'static [Tier] {
        &[Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Champion]
    }
}

/// Rank derived from a rating. Orders by tier, then division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RankTier {
    pub tier: Tier,
    /// 1 (lowest) to 4 (highest); `None` only for Grand Champion.
    pub division: Option<u8>,
}

impl RankTier {
    pub fn name(&self) -> String {
        match self.division {
            Some(d) => format!("{} {}", self.tier.label(), d),
            None => self.tier.label().to_string(),
        }
    }

    /// Key the rendering side maps to an emblem image, e.g. `gold3`.
    pub fn emblem_key(&self) -> String {
        match (self.tier, self.division) {
            (Tier::GrandChampion, _) => "grandchamp".to_string(),
            (tier, Some(d)) => format!("{}{}", tier.label().to_lowercase(), d),
            (tier, None) => tier.label().to_lowercase(),
        }
    }

    pub fn is_grand_champion(&self) -> bool {
        self.tier == Tier::GrandChampion
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Rank for `rating` using the default Grand Champion ceiling.
pub fn rank_of(rating: i32) -> RankTier {
    rank_with_ceiling(rating, GRAND_CHAMPION_THRESHOLD)
}

/// Rank for `rating` with an explicit Grand Champion ceiling.
/// Ratings under the floor are clamped first; everything between the
/// top division and the ceiling stays in Champion 4.
pub fn rank_with_ceiling(rating: i32, ceiling: i32) -> RankTier {
    let rating = clamp_rating(rating);
    if rating >= ceiling {
        return RankTier {
            tier: Tier::GrandChampion,
            division: None,
        };
    }

    let tiers = Tier::divided();
    let top = tiers.len() as i32 * DIVISIONS_PER_TIER - 1;
    let idx = ((rating - MIN_RATING) / DIVISION_SPAN).min(top);
    RankTier {
        tier: tiers[(idx / DIVISIONS_PER_TIER) as usize],
        division: Some((idx % DIVISIONS_PER_TIER + 1) as u8),
    }
}
