use crate::error::{Error, Result};
use crate::geometry::{Polygon, Vec2};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Clearance constraints for placing agents inside a spawn polygon.
#[derive(Debug, Clone, Copy)]
pub struct PlacementConfig {
    /// Minimum center-to-center distance between any two agents.
    pub distance_to_agents: f64,
    /// Minimum distance from an agent center to the polygon outline.
    pub distance_to_polygon: f64,
    pub seed: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        PlacementConfig {
            distance_to_agents: 0.4,
            distance_to_polygon: 0.2,
            seed: 1,
        }
    }
}

// Lattice pitch relative to the agent clearance. The slack between pitch and
// clearance is what the jitter may consume.
const PITCH_FACTOR: f64 = 1.1;

/// Sample exactly `count` positions inside `polygon`, keeping every position
/// at least `distance_to_agents` from each other and `distance_to_polygon`
/// from the outline. Deterministic for a fixed seed.
///
/// Candidates come from a hexagonal lattice clipped to the polygon; a seeded
/// shuffle picks `count` of them and a small per-position jitter breaks the
/// lattice regularity without eating into the clearances. Unlike naive
/// rejection sampling, the lattice stays feasible at the dense end of the
/// supported agent range.
///
/// Fails with [`Error::Placement`] when the polygon cannot accommodate the
/// requested count under the clearance constraints.
pub fn distribute_by_number(
    polygon: &Polygon,
    count: usize,
    config: PlacementConfig,
) -> Result<Vec<Vec2>> {
    let pitch = config.distance_to_agents * PITCH_FACTOR;
    let slack = pitch - config.distance_to_agents;
    // Per-axis jitter amplitude; 0.9 keeps the worst-case pair strictly apart.
    let jitter = slack / (2.0 * std::f64::consts::SQRT_2) * 0.9;
    let margin = config.distance_to_polygon + jitter * std::f64::consts::SQRT_2;

    let mut candidates = lattice_candidates(polygon, pitch, margin);
    if candidates.len() < count {
        return Err(Error::Placement {
            placed: candidates.len(),
            requested: count,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    candidates.shuffle(&mut rng);
    candidates.truncate(count);
    for position in candidates.iter_mut() {
        position.x += rng.gen_range(-jitter..=jitter);
        position.y += rng.gen_range(-jitter..=jitter);
    }
    Ok(candidates)
}

/// Hexagonal lattice points inside the polygon, at least `margin` from the
/// outline, row-major order.
fn lattice_candidates(polygon: &Polygon, pitch: f64, margin: f64) -> Vec<Vec2> {
    let (min, max) = polygon.bounding_box();
    let row_height = pitch * (3.0_f64.sqrt() / 2.0);
    let mut candidates = Vec::new();

    let mut row = 0u32;
    let mut y = min.y + margin;
    while y <= max.y - margin {
        let mut x = min.x + margin + if row % 2 == 1 { pitch / 2.0 } else { 0.0 };
        while x <= max.x - margin {
            let p = Vec2::new(x, y);
            if polygon.contains(p) && polygon.distance_to_boundary(p) >= margin {
                candidates.push(p);
            }
            x += pitch;
        }
        y += row_height;
        row += 1;
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Scenario;
    use itertools::Itertools;

    #[test]
    fn test_placement_deterministic_for_fixed_seed() {
        let scenario = Scenario::corner();
        let config = PlacementConfig::default();
        let a = distribute_by_number(&scenario.spawn_area, 20, config).unwrap();
        let b = distribute_by_number(&scenario.spawn_area, 20, config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_placement_respects_clearances() {
        let scenario = Scenario::corner();
        let config = PlacementConfig::default();
        let positions = distribute_by_number(&scenario.spawn_area, 50, config).unwrap();
        assert_eq!(positions.len(), 50);

        for p in &positions {
            assert!(scenario.spawn_area.contains(*p));
            assert!(
                scenario.spawn_area.distance_to_boundary(*p) >= config.distance_to_polygon
            );
        }
        for (a, b) in positions.iter().tuple_combinations() {
            assert!(a.distance(*b) >= config.distance_to_agents);
        }
    }

    #[test]
    fn test_placement_fails_when_polygon_is_full() {
        let tiny = Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let result = distribute_by_number(&tiny, 500, PlacementConfig::default());
        match result {
            Err(Error::Placement { placed, requested: 500 }) => assert!(placed < 500),
            other => panic!("expected placement failure, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let scenario = Scenario::corner();
        let mut config = PlacementConfig::default();
        let a = distribute_by_number(&scenario.spawn_area, 20, config).unwrap();
        config.seed = 2;
        let b = distribute_by_number(&scenario.spawn_area, 20, config).unwrap();
        assert_ne!(a, b);
    }
}
