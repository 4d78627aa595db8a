//! Candidate placements and the per-cell move cache.

use crate::Deadline;
use crate::geometry::{Cell, Color, Dir, Mirror, Pos};
use crate::light::Light;
use crate::problem::{Costs, Limits};
use crate::propagation::Delta;
use crate::score::{crystal_potential, crystal_score};
use crate::state::State;
use rustc_hash::FxBuildHasher;
use std::hash::BuildHasher;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Placement {
    Lantern(Pos, Color),
    Obstacle(Pos),
    Mirror(Pos, Mirror),
}

impl Placement {
    pub fn pos(self) -> Pos {
        match self {
            Placement::Lantern(pos, _) | Placement::Obstacle(pos) | Placement::Mirror(pos, _) => pos,
        }
    }

    /// Board content after this placement.
    pub fn cell(self) -> Cell {
        match self {
            Placement::Lantern(_, color) => Cell::Lantern(color),
            Placement::Obstacle(_) => Cell::Obstacle,
            Placement::Mirror(_, mirror) => Cell::Mirror(mirror),
        }
    }

    /// Output symbol: `X`, `/`, `\` or the lantern's color code.
    pub fn symbol(self) -> String {
        match self {
            Placement::Lantern(_, color) => color.code().to_string(),
            Placement::Obstacle(_) => "X".to_owned(),
            Placement::Mirror(_, mirror) => mirror.symbol().to_string(),
        }
    }

    /// Hash contribution of this item to [`State::hash`].
    pub fn zobrist(self) -> u64 {
        FxBuildHasher.hash_one(self)
    }
}

/// A scored placement. `score` and `potential` are changes relative to the
/// state the candidate was generated from, item cost included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub placement: Placement,
    pub score: i32,
    pub potential: i32,
}

impl Candidate {
    const NONE: Candidate = Candidate {
        placement: Placement::Obstacle(Pos { x: 0, y: 0 }),
        score: 0,
        potential: 0,
    };
}

/// Cached candidates of one cell: up to three lantern colors, or an obstacle
/// and two mirror orientations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMoves {
    len: u8,
    moves: [Candidate; 3],
}

impl CellMoves {
    const EMPTY: CellMoves = CellMoves {
        len: 0,
        moves: [Candidate::NONE; 3],
    };

    fn push(&mut self, candidate: Candidate) {
        self.moves[self.len as usize] = candidate;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.moves[..self.len as usize]
    }
}

impl State {
    /// Score change of replacing `cell` by an object that blocks every ray
    /// crossing it and sends `emit[d]` out in each direction `d`.
    ///
    /// Only the crystals seen from `cell` can change. A crystal seen along two
    /// directions is accumulated before being scored.
    fn placement_delta(&self, cell: usize, emit: [Color; 4]) -> Delta {
        let mut seen: [(usize, Light); 4] = Default::default();
        let mut len = 0;
        for d in Dir::ALL {
            let Some(sight) = self.buf.sights[d.index()][cell] else {
                continue;
            };
            let crystal = sight.crystal as usize;
            let slot = match seen[..len].iter().position(|&(c, _)| c == crystal) {
                Some(slot) => slot,
                None => {
                    seen[len] = (crystal, self.buf.light[crystal]);
                    len += 1;
                    len - 1
                }
            };
            seen[slot].1 = seen[slot].1.without(sight.arrival).with(emit[d.index()], sight.arrival);
        }
        let mut delta = Delta::default();
        for &(crystal, after) in &seen[..len] {
            let Cell::Crystal(color) = self.buf.cells[crystal] else {
                continue;
            };
            let before = self.buf.light[crystal].colors();
            let after = after.colors();
            delta.score += crystal_score(color, after) - crystal_score(color, before);
            delta.potential += crystal_potential(color, after) - crystal_potential(color, before);
        }
        delta
    }

    fn candidate(&self, cell: usize, placement: Placement, emit: [Color; 4], costs: &Costs) -> Candidate {
        let delta = self.placement_delta(cell, emit);
        let cost = costs.of(placement);
        Candidate {
            placement,
            score: delta.score - cost,
            potential: delta.potential - cost,
        }
    }

    /// Candidates for one cell against the current maps.
    pub fn compute_moves(&self, cell: usize, costs: &Costs, limits: &Limits) -> CellMoves {
        let mut moves = CellMoves::EMPTY;
        if !self.buf.cells[cell].is_empty() {
            return moves;
        }
        let pos = self.geometry().pos(cell);
        let light = self.buf.light[cell];
        if light.is_empty() {
            for color in self.buf.reach[cell].colors().primaries() {
                moves.push(self.candidate(cell, Placement::Lantern(pos, color), [color; 4], costs));
            }
            return moves;
        }
        if self.obstacles.len() < limits.max_obstacles {
            moves.push(self.candidate(cell, Placement::Obstacle(pos), [Color::EMPTY; 4], costs));
        }
        if self.mirrors.len() < limits.max_mirrors {
            for mirror in Mirror::ALL {
                if self.is_safe_at(cell, mirror) {
                    let emit = Dir::ALL.map(|d| light.traveling(d.reflect(mirror)));
                    moves.push(self.candidate(cell, Placement::Mirror(pos, mirror), emit, costs));
                }
            }
        }
        moves
    }

    /// Fills every stale cache entry. Returns `false` if the deadline passed
    /// first; entries filled so far are kept.
    pub fn refresh_moves(&mut self, costs: &Costs, limits: &Limits, deadline: &Deadline) -> bool {
        let width = self.geometry().width;
        for cell in 0..self.buf.cells.len() {
            if cell % width == 0 && deadline.exceeded() {
                return false;
            }
            if self.buf.moves[cell].is_none() {
                self.buf.moves[cell] = Some(self.compute_moves(cell, costs, limits));
            }
        }
        true
    }

    pub fn moves_at(&self, pos: Pos) -> Option<&[Candidate]> {
        self.buf.moves[self.geometry().index(pos)]
            .as_ref()
            .map(CellMoves::as_slice)
    }

    /// Writes the `k` best candidates by potential into `out`, best first.
    /// Candidates whose item type is at its limit are skipped. Returns how
    /// many candidates were eligible, which exceeds `k` when some were cut.
    pub fn top_moves(
        &mut self,
        k: usize,
        costs: &Costs,
        limits: &Limits,
        deadline: &Deadline,
        out: &mut Vec<Candidate>,
    ) -> usize {
        out.clear();
        self.refresh_moves(costs, limits, deadline);
        let obstacles_ok = self.obstacles.len() < limits.max_obstacles;
        let mirrors_ok = self.mirrors.len() < limits.max_mirrors;
        let mut eligible = 0;
        for moves in self.buf.moves.iter().flatten() {
            for &candidate in moves.as_slice() {
                match candidate.placement {
                    Placement::Obstacle(_) if !obstacles_ok => continue,
                    Placement::Mirror(..) if !mirrors_ok => continue,
                    _ => {}
                }
                eligible += 1;
                if out.len() == k {
                    match out.last() {
                        Some(last) if last.potential < candidate.potential => {
                            out.pop();
                        }
                        _ => continue,
                    }
                }
                let at = out.partition_point(|c| c.potential >= candidate.potential);
                out.insert(at, candidate);
            }
        }
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen;
    use crate::pool::BufferPool;
    use crate::problem::Problem;
    use rand::prelude::*;

    fn costs() -> Costs {
        Costs {
            lantern: 1,
            mirror: 2,
            obstacle: 3,
        }
    }

    #[test]
    fn lantern_candidates_follow_reach() {
        let limits = Limits {
            max_mirrors: 0,
            max_obstacles: 0,
        };
        let problem = Problem::from_rows(&["1..", "...", "..4"], costs(), limits).unwrap();
        let mut pool = BufferPool::new();
        let state = State::new(&problem, &mut pool);
        // (2, 0) sees the blue crystal to its left and the red one below.
        let moves = state.compute_moves(2, &problem.costs, &limits);
        let scores: Vec<(Placement, i32)> = moves.as_slice().iter().map(|c| (c.placement, c.score)).collect();
        assert_eq!(
            scores,
            vec![
                (Placement::Lantern(Pos::new(2, 0), Color::BLUE), 20 - 10 - 1),
                (Placement::Lantern(Pos::new(2, 0), Color::RED), -10 + 20 - 1),
            ]
        );
        // (1, 1) sees nothing.
        assert!(state.compute_moves(4, &problem.costs, &limits).as_slice().is_empty());
    }

    #[test]
    fn candidate_scores_match_application() {
        let mut rng = StdRng::seed_from_u64(11);
        for seed in 0..20 {
            let problem = mapgen::random::generate(&mapgen::random::Params::small(), seed);
            let mut pool = BufferPool::new();
            let mut state = State::new(&problem, &mut pool);
            let deadline = Deadline::never();
            let mut out = vec![];
            for _ in 0..12 {
                state.top_moves(usize::MAX, &problem.costs, &problem.limits, &deadline, &mut out);
                if out.is_empty() {
                    break;
                }
                for candidate in out.iter().take(8) {
                    let mut copy = state.duplicate(&mut pool);
                    assert!(copy.apply(candidate.placement, &problem.costs), "seed {seed}");
                    assert_eq!(copy.score, state.score + candidate.score, "seed {seed} {candidate:?}");
                    assert_eq!(copy.potential, state.potential + candidate.potential, "seed {seed} {candidate:?}");
                    copy.recycle(&mut pool);
                }
                let pick = out[rng.random_range(0..out.len())];
                assert!(state.apply(pick.placement, &problem.costs));
            }
        }
    }

    #[test]
    fn refreshing_twice_is_idempotent() {
        let problem = mapgen::random::generate(&mapgen::random::Params::small(), 3);
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        let deadline = Deadline::never();
        assert!(state.refresh_moves(&problem.costs, &problem.limits, &deadline));
        assert!(state.moves_at(Pos::new(0, 0)).is_some());
        let first = state.buf.moves.clone();
        state.buf.moves.fill(None);
        assert!(state.refresh_moves(&problem.costs, &problem.limits, &deadline));
        assert!(state.refresh_moves(&problem.costs, &problem.limits, &deadline));
        assert_eq!(first, state.buf.moves);
    }

    #[test]
    fn top_moves_are_sorted_and_respect_limits() {
        let problem = mapgen::random::generate(&mapgen::random::Params::small(), 5);
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        let deadline = Deadline::never();
        let mut all = vec![];
        let eligible = state.top_moves(usize::MAX, &problem.costs, &problem.limits, &deadline, &mut all);
        assert_eq!(eligible, all.len());
        let mut top = vec![];
        let k = 5.min(all.len());
        state.top_moves(k, &problem.costs, &problem.limits, &deadline, &mut top);
        assert_eq!(top.len(), k);
        assert!(top.windows(2).all(|w| w[0].potential >= w[1].potential));
        let potentials: Vec<i32> = top.iter().map(|c| c.potential).collect();
        let expected: Vec<i32> = all.iter().take(k).map(|c| c.potential).collect();
        assert_eq!(potentials, expected);

        let limits = Limits {
            max_mirrors: 0,
            max_obstacles: 0,
        };
        state.top_moves(usize::MAX, &problem.costs, &limits, &deadline, &mut all);
        assert!(all.iter().all(|c| matches!(c.placement, Placement::Lantern(..))));
    }
}
