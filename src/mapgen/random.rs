//! # Random Board Generation
//!
//! Seeded problem instances: crystals and pre-placed obstacles scattered
//! uniformly over an empty grid, with item costs and limits drawn from ranges.
//! The same seed always yields the same board.

use crate::geometry::{Cell, Color, Geometry};
use crate::problem::{Costs, Limits, Problem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

#[derive(Clone, Debug)]
pub struct Params {
    pub width: RangeInclusive<usize>,
    pub height: RangeInclusive<usize>,
    /// Fraction of cells holding a crystal.
    pub crystals: (f64, f64),
    /// Probability that a crystal needs two colors.
    pub two_color: (f64, f64),
    /// Fraction of cells holding a fixed obstacle.
    pub obstacles: (f64, f64),
    pub cost: RangeInclusive<i32>,
    pub max_mirrors: RangeInclusive<usize>,
    pub max_obstacles: RangeInclusive<usize>,
}

impl Params {
    /// Full-size contest boards.
    pub fn contest() -> Self {
        Self {
            width: 8..=100,
            height: 8..=100,
            crystals: (0.02, 0.15),
            two_color: (0.0, 0.5),
            obstacles: (0.0, 0.1),
            cost: 1..=5,
            max_mirrors: 1..=10,
            max_obstacles: 1..=10,
        }
    }

    /// Small boards for tests. At most three mirrors, so no ray can leave a
    /// mirror and come back to it.
    pub fn small() -> Self {
        Self {
            width: 4..=10,
            height: 4..=10,
            crystals: (0.05, 0.2),
            two_color: (0.2, 0.5),
            obstacles: (0.0, 0.1),
            cost: 1..=5,
            max_mirrors: 0..=3,
            max_obstacles: 0..=3,
        }
    }
}

fn uniform(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

pub fn generate(params: &Params, seed: u64) -> Problem {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = rng.random_range(params.width.clone());
    let height = rng.random_range(params.height.clone());
    let crystals = uniform(&mut rng, params.crystals);
    let two_color = uniform(&mut rng, params.two_color);
    let obstacles = uniform(&mut rng, params.obstacles);

    let cells = (0..width * height)
        .map(|_| {
            let r = rng.random::<f64>();
            if r < crystals {
                let first = Color::PRIMARIES[rng.random_range(0..3)];
                if rng.random_bool(two_color) {
                    let second = Color::PRIMARIES
                        .into_iter()
                        .filter(|&c| c != first)
                        .nth(rng.random_range(0..2))
                        .unwrap_or(first);
                    Cell::Crystal(first | second)
                } else {
                    Cell::Crystal(first)
                }
            } else if r < crystals + obstacles {
                Cell::Obstacle
            } else {
                Cell::Empty
            }
        })
        .collect();

    Problem {
        geometry: Geometry::new(width, height),
        cells,
        costs: Costs {
            lantern: rng.random_range(params.cost.clone()),
            mirror: rng.random_range(params.cost.clone()),
            obstacle: rng.random_range(params.cost.clone()),
        },
        limits: Limits {
            max_mirrors: rng.random_range(params.max_mirrors.clone()),
            max_obstacles: rng.random_range(params.max_obstacles.clone()),
        },
    }
}
