// # Crystal Lighting: placement search for the lantern/mirror/obstacle puzzle
//
// The board engine keeps light, crystal reach and crystal sight maps up to date
// incrementally as items are placed, caches scored candidate moves per cell,
// and a widening beam search explores placements until a wall-clock deadline.

use std::time::{Duration, Instant};

/// Grid primitives: positions, directions, mirrors, colors and cells.
pub mod geometry;

/// Per-cell directional light bitsets.
pub mod light;

/// Crystal scoring.
pub mod score;

/// Ray walks over the board maps.
pub mod propagation;

/// Pooled per-state buffers.
pub mod pool;

/// Incremental board state.
pub mod state;

/// Candidate placements and the per-cell move cache.
pub mod moves;

/// The anytime beam search.
pub mod beam;

/// Problem input format.
pub mod problem;

/// Answer format and from-scratch scoring.
pub mod judge;

/// SVG rendering of boards and answers.
pub mod svg;

/// Tools for generating problem boards.
pub mod mapgen {
    /// Seeded random boards.
    pub mod random;
}

/// A trait for conveniently updating a value to its minimum or maximum.
pub trait SetMinMax {
    /// If `v` is less than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmin(&mut self, v: Self) -> bool;
    /// If `v` is greater than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmax(&mut self, v: Self) -> bool;
}
impl<T> SetMinMax for T
where
    T: PartialOrd,
{
    fn setmin(&mut self, v: T) -> bool {
        *self > v && {
            *self = v;
            true
        }
    }
    fn setmax(&mut self, v: T) -> bool {
        *self < v && {
            *self = v;
            true
        }
    }
}

/// Wall-clock budget shared by every stage of a run.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: Some(limit),
        }
    }

    pub fn never() -> Self {
        Self {
            start: Instant::now(),
            limit: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn exceeded(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setmax_reports_updates() {
        let mut best = 3;
        assert!(best.setmax(5));
        assert!(!best.setmax(4));
        assert!(best.setmin(1));
        assert_eq!(best, 1);
    }

    #[test]
    fn deadline_expires() {
        assert!(Deadline::after(Duration::ZERO).exceeded());
        assert!(!Deadline::never().exceeded());
    }
}
