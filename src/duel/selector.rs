//! Duel pair selection strategies
//!
//! A selector receives a category's candidate pool in ranking order and
//! returns two distinct indices into it.

use crate::config::{DuelSettings, DuelStrategy};
use crate::types::RatedEntity;
use crate::utils::rating_difference;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for duel selection algorithms
pub trait DuelSelector: Send + Sync {
    /// Pick two distinct indices into `pool`, or `None` when it holds fewer
    /// than two entities
    fn select_pair(&self, pool: &[RatedEntity]) -> Option<(usize, usize)>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

fn lock_rng(rng: &Mutex<StdRng>) -> MutexGuard<'_, StdRng> {
    // A panic elsewhere cannot leave an RNG in an invalid state
    rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Draws any two distinct entities with equal probability
#[derive(Debug)]
pub struct UniformDuelSelector {
    rng: Mutex<StdRng>,
}

impl UniformDuelSelector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic selector for tests and benchmarks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for UniformDuelSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DuelSelector for UniformDuelSelector {
    fn select_pair(&self, pool: &[RatedEntity]) -> Option<(usize, usize)> {
        if pool.len() < 2 {
            return None;
        }

        let mut rng = lock_rng(&self.rng);
        let picked = rand::seq::index::sample(&mut *rng, pool.len(), 2);
        Some((picked.index(0), picked.index(1)))
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Draws a random entity and pairs it with one of its closest-rated peers
///
/// Close matchups carry the most information per vote, since neither
/// outcome is a foregone conclusion.
#[derive(Debug)]
pub struct ProximityDuelSelector {
    window: usize,
    rng: Mutex<StdRng>,
}

impl ProximityDuelSelector {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic selector for tests and benchmarks
    pub fn with_seed(window: usize, seed: u64) -> Self {
        Self {
            window: window.max(1),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Indices of the `window` entities closest in rating to `anchor`
    fn neighbours(&self, pool: &[RatedEntity], anchor: usize) -> Vec<usize> {
        let anchor_rating = pool[anchor].rating.rating;

        let mut others: Vec<usize> = (0..pool.len()).filter(|&i| i != anchor).collect();
        others.sort_by(|&a, &b| {
            let distance_a = rating_difference(pool[a].rating.rating, anchor_rating);
            let distance_b = rating_difference(pool[b].rating.rating, anchor_rating);
            distance_a
                .partial_cmp(&distance_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        others.truncate(self.window);
        others
    }
}

impl DuelSelector for ProximityDuelSelector {
    fn select_pair(&self, pool: &[RatedEntity]) -> Option<(usize, usize)> {
        if pool.len() < 2 {
            return None;
        }

        let mut rng = lock_rng(&self.rng);
        let anchor = rng.random_range(0..pool.len());
        let neighbours = self.neighbours(pool, anchor);
        let opponent = neighbours[rng.random_range(0..neighbours.len())];

        Some((anchor, opponent))
    }

    fn name(&self) -> &'static str {
        "proximity"
    }
}

/// Build the selector configured by `settings`
pub fn selector_for(settings: &DuelSettings) -> Arc<dyn DuelSelector> {
    match settings.strategy {
        DuelStrategy::Uniform => Arc::new(UniformDuelSelector::new()),
        DuelStrategy::Proximity => Arc::new(ProximityDuelSelector::new(settings.proximity_window)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityId, EntityRating};
    use std::collections::HashSet;

    fn create_test_pool(ratings: &[f64]) -> Vec<RatedEntity> {
        ratings
            .iter()
            .enumerate()
            .map(|(index, rating)| {
                let id = index as EntityId + 1;
                RatedEntity {
                    entity: Entity {
                        id,
                        category_id: 1,
                        name: format!("Player {}", id),
                        image_url: None,
                        country_primary: None,
                        country_secondary: None,
                    },
                    rating: EntityRating::new(id, *rating),
                }
            })
            .collect()
    }

    #[test]
    fn test_uniform_never_picks_same_index() {
        let selector = UniformDuelSelector::with_seed(7);
        let pool = create_test_pool(&[1500.0; 5]);

        for _ in 0..500 {
            let (a, b) = selector.select_pair(&pool).unwrap();
            assert_ne!(a, b);
            assert!(a < pool.len() && b < pool.len());
        }
    }

    #[test]
    fn test_uniform_covers_whole_pool() {
        let selector = UniformDuelSelector::with_seed(42);
        let pool = create_test_pool(&[1500.0; 6]);

        let mut seen = HashSet::new();
        for _ in 0..300 {
            let (a, b) = selector.select_pair(&pool).unwrap();
            seen.insert(a);
            seen.insert(b);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_pool_too_small() {
        let uniform = UniformDuelSelector::with_seed(1);
        let proximity = ProximityDuelSelector::with_seed(3, 1);

        assert!(uniform.select_pair(&[]).is_none());
        assert!(uniform.select_pair(&create_test_pool(&[1500.0])).is_none());
        assert!(proximity.select_pair(&create_test_pool(&[1500.0])).is_none());
    }

    #[test]
    fn test_two_entity_pool_always_returns_both() {
        let selector = UniformDuelSelector::with_seed(9);
        let pool = create_test_pool(&[1600.0, 1400.0]);

        for _ in 0..50 {
            let (a, b) = selector.select_pair(&pool).unwrap();
            let pair: HashSet<usize> = [a, b].into_iter().collect();
            assert_eq!(pair, HashSet::from([0, 1]));
        }
    }

    #[test]
    fn test_proximity_picks_closest_neighbour() {
        let selector = ProximityDuelSelector::with_seed(1, 5);
        // Two tight clusters far apart
        let pool = create_test_pool(&[2000.0, 1990.0, 1200.0, 1210.0]);

        for _ in 0..200 {
            let (a, b) = selector.select_pair(&pool).unwrap();
            assert_ne!(a, b);
            let gap = rating_difference(pool[a].rating.rating, pool[b].rating.rating);
            assert!(gap <= 10.0, "paired across clusters: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_proximity_window_larger_than_pool() {
        let selector = ProximityDuelSelector::with_seed(50, 11);
        let pool = create_test_pool(&[1500.0, 1510.0, 1700.0]);

        for _ in 0..100 {
            let (a, b) = selector.select_pair(&pool).unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let pool = create_test_pool(&[1500.0, 1520.0, 1480.0, 1700.0, 1300.0]);
        let first = UniformDuelSelector::with_seed(99);
        let second = UniformDuelSelector::with_seed(99);

        for _ in 0..20 {
            assert_eq!(first.select_pair(&pool), second.select_pair(&pool));
        }
    }

    #[test]
    fn test_selector_for_settings() {
        let uniform = selector_for(&DuelSettings::default());
        assert_eq!(uniform.name(), "uniform");

        let proximity = selector_for(&DuelSettings {
            strategy: DuelStrategy::Proximity,
            proximity_window: 4,
        });
        assert_eq!(proximity.name(), "proximity");
    }
}
