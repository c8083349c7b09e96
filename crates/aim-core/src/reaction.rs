use rand::RngExt;

use crate::rating::MIN_RATING;

pub const FASTEST_REACTION_MS: u32 = 80;
pub const SLOWEST_REACTION_MS: u32 = 4000;

const BASE_REACTION_MS: f64 = 700.0;
const SYMMETRIC_JITTER_MS: f64 = 150.0;
const LAG_JITTER_MS: f64 = 120.0;

/// Mean reaction before jitter. Every 5 rating points above the floor buy 1ms.
pub fn base_reaction_ms(rating: i32) -> f64 {
    BASE_REACTION_MS - (f64::from(rating) - f64::from(MIN_RATING)) / 5.0
}

/// Probability that a participant at `rating` misses the target outright.
pub fn miss_chance(rating: i32) -> f64 {
    (0.45 - (f64::from(rating) - f64::from(MIN_RATING)) / 2000.0).clamp(0.02, 0.5)
}

/// Simulate one round. `None` is a miss.
pub fn simulate<R: RngExt + ?Sized>(rating: i32, rng: &mut R) -> Option<u32> {
    let jitter = rng.random::<f64>() * 2.0 * SYMMETRIC_JITTER_MS - SYMMETRIC_JITTER_MS;
    let lag = rng.random::<f64>() * LAG_JITTER_MS;
    let reaction = (base_reaction_ms(rating) + jitter + lag)
        .clamp(FASTEST_REACTION_MS as f64, SLOWEST_REACTION_MS as f64);

    if rng.random_bool(miss_chance(rating)) {
        return None;
    }
    Some(reaction.round() as u32)
}

/// Turn an externally measured latency into a reaction.
/// Negative, non-finite or late measurements count as a miss.
pub fn sanitize_measured(ms: f64, deadline_ms: u64) -> Option<u32> {
    if !ms.is_finite() || ms < 0.0 || ms > deadline_ms as f64 {
        return None;
    }
    Some(ms.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn miss_chance_bounds() {
        assert_eq!(miss_chance(MIN_RATING), 0.45);
        assert_eq!(miss_chance(0), 0.5);
        assert_eq!(miss_chance(5000), 0.02);
        assert!(miss_chance(1600) < miss_chance(1200));
    }

    #[test]
    fn base_decreases_with_rating() {
        assert_eq!(base_reaction_ms(MIN_RATING), 700.0);
        assert_eq!(base_reaction_ms(2000), 500.0);
    }

    #[test]
    fn simulated_times_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for rating in [1000, 1500, 2500, 3500, 9000] {
            for _ in 0..300 {
                if let Some(ms) = simulate(rating, &mut rng) {
                    assert!((FASTEST_REACTION_MS..=SLOWEST_REACTION_MS).contains(&ms));
                }
            }
        }
    }

    #[test]
    fn very_high_rating_clamps_to_fastest() {
        let mut rng = StdRng::seed_from_u64(1);
        let hits: Vec<u32> = (0..200).filter_map(|_| simulate(20_000, &mut rng)).collect();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&ms| ms == FASTEST_REACTION_MS));
    }

    #[test]
    fn higher_rating_is_faster_on_average() {
        let mut rng = StdRng::seed_from_u64(9);
        let mean = |rating: i32, rng: &mut StdRng| {
            let hits: Vec<u32> = (0..2000).filter_map(|_| simulate(rating, rng)).collect();
            hits.iter().map(|&ms| ms as f64).sum::<f64>() / hits.len() as f64
        };
        assert!(mean(2400, &mut rng) < mean(1000, &mut rng));
    }

    #[test]
    fn extreme_ratings_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(17);
        for rating in [i32::MIN, -1, i32::MAX] {
            assert!((0.02..=0.5).contains(&miss_chance(rating)));
            for _ in 0..50 {
                if let Some(ms) = simulate(rating, &mut rng) {
                    assert!((FASTEST_REACTION_MS..=SLOWEST_REACTION_MS).contains(&ms));
                }
            }
        }
    }

    #[test]
    fn degenerate_measurements_are_misses() {
        assert_eq!(sanitize_measured(-1.0, 5000), None);
        assert_eq!(sanitize_measured(f64::NAN, 5000), None);
        assert_eq!(sanitize_measured(f64::INFINITY, 5000), None);
        assert_eq!(sanitize_measured(5000.5, 5000), None);
        assert_eq!(sanitize_measured(212.4, 5000), Some(212));
        assert_eq!(sanitize_measured(0.0, 5000), Some(0));
    }
}
