//! Board state with incrementally maintained light, reach and sight maps.
//!
//! A [`State`] never recomputes its derived maps after construction. Every
//! placement retracts whatever passed through its cell, writes the new cell
//! and re-emits light along the affected rays, accumulating the score change
//! from the crystal hits the walks report.

use crate::geometry::{Cell, Color, Dir, Geometry, Mirror, Pos};
use crate::moves::Placement;
use crate::pool::{BufferPool, Buffers};
use crate::problem::{Costs, Problem};
use crate::propagation::{Delta, Rays, Sight};
use crate::score::crystal_score;

pub struct State {
    geometry: Geometry,
    pub(crate) buf: Buffers,
    pub score: i32,
    /// Optimistic score used to rank expansions; never below `score`.
    pub potential: i32,
    /// XOR of [`Placement::zobrist`] over every placed item.
    pub hash: u64,
    pub lanterns: Vec<(Pos, Color)>,
    pub mirrors: Vec<(Pos, Mirror)>,
    pub obstacles: Vec<Pos>,
}

impl State {
    pub fn new(problem: &Problem, pool: &mut BufferPool) -> Self {
        let mut buf = pool.acquire(problem.cells.len());
        buf.reset(&problem.cells);
        let mut state = Self {
            geometry: problem.geometry,
            buf,
            score: 0,
            potential: 0,
            hash: 0,
            lanterns: vec![],
            mirrors: vec![],
            obstacles: vec![],
        };
        state.update_from_board();
        state
    }

    /// Casts reach and sight rays out of every crystal.
    fn update_from_board(&mut self) {
        let rays = Rays::new(self.geometry, &self.buf.cells);
        for (cell, &content) in self.buf.cells.iter().enumerate() {
            let Cell::Crystal(color) = content else {
                continue;
            };
            for d in Dir::ALL {
                rays.cast(&mut self.buf.reach, color, cell, d);
                let sight = Sight {
                    crystal: cell as u16,
                    arrival: d.opposite(),
                };
                rays.mark_sight(&mut self.buf.sights, cell, d, Some(sight));
            }
        }
    }

    /// Deep copy backed by pooled buffers.
    pub fn duplicate(&self, pool: &mut BufferPool) -> Self {
        let mut buf = pool.acquire(self.buf.len());
        buf.copy_from(&self.buf);
        Self {
            geometry: self.geometry,
            buf,
            score: self.score,
            potential: self.potential,
            hash: self.hash,
            lanterns: self.lanterns.clone(),
            mirrors: self.mirrors.clone(),
            obstacles: self.obstacles.clone(),
        }
    }

    pub fn recycle(self, pool: &mut BufferPool) {
        pool.release(self.buf);
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.buf.cells[self.geometry.index(pos)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.buf.cells
    }

    /// Colors currently lighting `pos`.
    pub fn light(&self, pos: Pos) -> Color {
        self.buf.light[self.geometry.index(pos)].colors()
    }

    /// Colors a lantern at `pos` could deliver to some crystal.
    pub fn reach(&self, pos: Pos) -> Color {
        self.buf.reach[self.geometry.index(pos)].colors()
    }

    /// Crystal seen from `pos` looking in `dir`.
    pub fn sight(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        self.buf.sights[dir.index()][self.geometry.index(pos)].map(|s| self.geometry.pos(s.crystal as usize))
    }

    /// Placed lanterns, obstacles and mirrors, in that order.
    pub fn counts(&self) -> [usize; 3] {
        [self.lanterns.len(), self.obstacles.len(), self.mirrors.len()]
    }

    /// Every placed item: obstacles, then mirrors, then lanterns.
    pub fn items(&self) -> impl Iterator<Item = Placement> + '_ {
        let obstacles = self.obstacles.iter().map(|&p| Placement::Obstacle(p));
        let mirrors = self.mirrors.iter().map(|&(p, m)| Placement::Mirror(p, m));
        let lanterns = self.lanterns.iter().map(|&(p, c)| Placement::Lantern(p, c));
        obstacles.chain(mirrors).chain(lanterns)
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.items().collect()
    }

    /// Whether `placement` is part of this board.
    pub fn holds(&self, placement: Placement) -> bool {
        self.cell(placement.pos()) == placement.cell()
    }

    /// Sum of crystal scores over the current light map, without item costs.
    pub fn illumination_score(&self) -> i32 {
        self.buf
            .cells
            .iter()
            .zip(&self.buf.light)
            .map(|(cell, light)| match *cell {
                Cell::Crystal(crystal) => crystal_score(crystal, light.colors()),
                _ => 0,
            })
            .sum()
    }

    /// Whether a mirror at `pos` would bounce light back onto the path of
    /// light already crossing the cell.
    pub fn is_safe(&self, pos: Pos, mirror: Mirror) -> bool {
        self.is_safe_at(self.geometry.index(pos), mirror)
    }

    pub(crate) fn is_safe_at(&self, cell: usize, mirror: Mirror) -> bool {
        let light = self.buf.light[cell];
        Dir::ALL
            .into_iter()
            .all(|d| !light.has(d) || !light.has(d.reflect(mirror).opposite()))
    }

    /// Applies `placement`, charging its cost. Returns `false` without
    /// touching the state if the cell is occupied or the mirror is unsafe.
    pub fn apply(&mut self, placement: Placement, costs: &Costs) -> bool {
        let cell = self.geometry.index(placement.pos());
        if !self.buf.cells[cell].is_empty() {
            return false;
        }
        let delta = match placement {
            Placement::Lantern(pos, color) => {
                self.lanterns.push((pos, color));
                self.lantern_at(cell, color)
            }
            Placement::Obstacle(pos) => {
                self.obstacles.push(pos);
                self.obstacle_at(cell)
            }
            Placement::Mirror(pos, mirror) => {
                if !self.is_safe_at(cell, mirror) {
                    return false;
                }
                self.mirrors.push((pos, mirror));
                self.mirror_at(cell, mirror)
            }
        };
        let cost = costs.of(placement);
        self.score += delta.score - cost;
        self.potential += delta.potential - cost;
        self.hash ^= placement.zobrist();
        true
    }

    pub fn put_lantern(&mut self, pos: Pos, color: Color, costs: &Costs) -> bool {
        self.apply(Placement::Lantern(pos, color), costs)
    }

    pub fn put_obstacle(&mut self, pos: Pos, costs: &Costs) -> bool {
        self.apply(Placement::Obstacle(pos), costs)
    }

    pub fn put_mirror(&mut self, pos: Pos, mirror: Mirror, costs: &Costs) -> bool {
        self.apply(Placement::Mirror(pos, mirror), costs)
    }

    /// Detaches the still empty `cell` from every ray crossing it: light and
    /// reach stop there, cells looking through it lose their crystal, and
    /// every cached move that could depend on it is dropped.
    fn clear_through(&mut self, cell: usize) -> Delta {
        let mut delta = Delta::default();
        let light = self.buf.light[cell];
        let reach = self.buf.reach[cell];
        let buf = &mut self.buf;
        let rays = Rays::new(self.geometry, &buf.cells);
        for d in Dir::ALL {
            rays.invalidate(&mut buf.moves, cell, d);
            if light.has(d) {
                delta.add(rays.retract(&mut buf.light, cell, d));
            }
            if reach.has(d) {
                rays.retract(&mut buf.reach, cell, d);
            }
            if buf.sights[d.index()][cell].is_some() {
                rays.mark_sight(&mut buf.sights, cell, d.opposite(), None);
            }
        }
        buf.moves[cell] = None;
        delta
    }

    fn lantern_at(&mut self, cell: usize, color: Color) -> Delta {
        let mut delta = self.clear_through(cell);
        let buf = &mut self.buf;
        buf.cells[cell] = Cell::Lantern(color);
        let rays = Rays::new(self.geometry, &buf.cells);
        for d in Dir::ALL {
            delta.add(rays.cast(&mut buf.light, color, cell, d));
        }
        delta
    }

    fn obstacle_at(&mut self, cell: usize) -> Delta {
        let delta = self.clear_through(cell);
        self.buf.cells[cell] = Cell::Obstacle;
        delta
    }

    fn mirror_at(&mut self, cell: usize, mirror: Mirror) -> Delta {
        let light = self.buf.light[cell];
        let reach = self.buf.reach[cell];
        let sights: [Option<Sight>; 4] = std::array::from_fn(|k| self.buf.sights[k][cell]);
        let mut delta = self.clear_through(cell);
        let buf = &mut self.buf;
        buf.cells[cell] = Cell::Mirror(mirror);
        let rays = Rays::new(self.geometry, &buf.cells);
        for d in Dir::ALL {
            let out = d.reflect(mirror);
            let color = light.traveling(d);
            if !color.is_empty() {
                delta.add(rays.cast(&mut buf.light, color, cell, out));
            }
            let color = reach.traveling(d);
            if !color.is_empty() {
                rays.cast(&mut buf.reach, color, cell, out);
            }
            // Cells walking into the mirror along `d.opposite()` now continue
            // along its reflection.
            if let Some(sight) = sights[d.opposite().reflect(mirror).index()] {
                rays.mark_sight(&mut buf.sights, cell, d, Some(sight));
            }
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{Solution, evaluate};
    use crate::mapgen;
    use crate::problem::Limits;
    use rand::prelude::*;

    fn unit_costs() -> Costs {
        Costs {
            lantern: 1,
            mirror: 1,
            obstacle: 1,
        }
    }

    fn problem(rows: &[&str], costs: Costs, limits: Limits) -> Problem {
        Problem::from_rows(rows, costs, limits).unwrap()
    }

    fn no_items() -> Limits {
        Limits {
            max_mirrors: 0,
            max_obstacles: 0,
        }
    }

    #[test]
    fn lantern_lights_single_crystal() {
        let problem = problem(&["...", ".1.", "..."], unit_costs(), no_items());
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        assert_eq!(state.reach(Pos::new(1, 0)), Color::BLUE);
        assert_eq!(state.sight(Pos::new(1, 0), Dir::Down), Some(Pos::new(1, 1)));
        assert!(state.put_lantern(Pos::new(1, 0), Color::BLUE, &problem.costs));
        assert_eq!(state.score, 19);
        assert_eq!(state.potential, 19);
        assert_eq!(state.light(Pos::new(0, 0)), Color::BLUE);
        // Light stops at the crystal.
        assert!(state.light(Pos::new(1, 2)).is_empty());
        assert!(!state.put_lantern(Pos::new(1, 0), Color::RED, &problem.costs));
    }

    #[test]
    fn two_color_crystal_needs_both_colors() {
        let costs = Costs {
            lantern: 2,
            mirror: 1,
            obstacle: 1,
        };
        let problem = problem(&["...", ".5.", "..."], costs, no_items());
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        assert!(state.put_lantern(Pos::new(1, 0), Color::RED, &costs));
        assert_eq!(state.score, -10 - 2);
        assert_eq!(state.potential, 5 - 2);
        assert!(state.put_lantern(Pos::new(0, 1), Color::BLUE, &costs));
        assert_eq!(state.score, 30 - 4);
        assert_eq!(state.potential, 30 - 4);
    }

    #[test]
    fn obstacle_blocks_wrong_color() {
        let problem = problem(&["2..4"], unit_costs(), Limits {
            max_mirrors: 0,
            max_obstacles: 1,
        });
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        assert!(state.put_lantern(Pos::new(1, 0), Color::YELLOW, &problem.costs));
        assert_eq!(state.score, 20 - 10 - 1);
        assert!(state.put_obstacle(Pos::new(2, 0), &problem.costs));
        assert_eq!(state.score, 20 - 2);
        assert_eq!(state.illumination_score(), 20);
    }

    #[test]
    fn unsafe_mirror_is_rejected_without_changes() {
        let problem = problem(&["....", "....", "...."], unit_costs(), Limits {
            max_mirrors: 1,
            max_obstacles: 0,
        });
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        // Light travelling left and light travelling up both cross (1, 1).
        assert!(state.put_lantern(Pos::new(3, 1), Color::BLUE, &problem.costs));
        assert!(state.put_lantern(Pos::new(1, 2), Color::RED, &problem.costs));
        let before = (state.score, state.potential, state.hash, state.buf.light.clone());
        assert!(!state.is_safe(Pos::new(1, 1), Mirror::Slash));
        assert!(!state.put_mirror(Pos::new(1, 1), Mirror::Slash, &problem.costs));
        assert_eq!(before, (state.score, state.potential, state.hash, state.buf.light.clone()));
        assert!(state.mirrors.is_empty());
        assert_eq!(state.cell(Pos::new(1, 1)), Cell::Empty);
        assert!(state.is_safe(Pos::new(1, 1), Mirror::Backslash));
    }

    #[test]
    fn mirror_redirects_light_into_crystal() {
        let problem = problem(&["..1", "...", "..."], unit_costs(), Limits {
            max_mirrors: 1,
            max_obstacles: 0,
        });
        let mut pool = BufferPool::new();
        let mut state = State::new(&problem, &mut pool);
        assert!(state.put_lantern(Pos::new(0, 2), Color::BLUE, &problem.costs));
        assert_eq!(state.score, -1);
        // Right-travelling light turns up at '/'.
        assert!(state.put_mirror(Pos::new(2, 2), Mirror::Slash, &problem.costs));
        assert_eq!(state.score, 20 - 2);
        assert_eq!(state.light(Pos::new(2, 1)), Color::BLUE);
        // Looking right from the lantern row now ends at the crystal.
        assert_eq!(state.sight(Pos::new(1, 2), Dir::Right), Some(Pos::new(2, 0)));
    }

    #[test]
    fn hash_ignores_placement_order() {
        let problem = problem(&["1....", ".....", "....2"], unit_costs(), Limits {
            max_mirrors: 0,
            max_obstacles: 2,
        });
        let mut pool = BufferPool::new();
        let steps = [
            Placement::Lantern(Pos::new(0, 2), Color::BLUE),
            Placement::Lantern(Pos::new(4, 0), Color::YELLOW),
            Placement::Obstacle(Pos::new(2, 2)),
        ];
        let mut a = State::new(&problem, &mut pool);
        let mut b = State::new(&problem, &mut pool);
        for &p in &steps {
            assert!(a.apply(p, &problem.costs));
        }
        for &p in steps.iter().rev() {
            assert!(b.apply(p, &problem.costs));
        }
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.score, b.score);
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.buf.light, b.buf.light);
    }

    #[test]
    fn duplicate_is_independent() {
        let problem = problem(&["...", ".1.", "..."], unit_costs(), no_items());
        let mut pool = BufferPool::new();
        let state = State::new(&problem, &mut pool);
        let mut copy = state.duplicate(&mut pool);
        assert!(copy.put_lantern(Pos::new(1, 0), Color::BLUE, &problem.costs));
        assert_eq!(state.score, 0);
        assert!(state.light(Pos::new(0, 0)).is_empty());
        copy.recycle(&mut pool);
        state.recycle(&mut pool);
        assert_eq!(pool.idle(9), 2);
    }

    /// Random walks over random boards: the incremental score must match an
    /// independent replay.
    #[test]
    fn incremental_score_matches_replay() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed in 0..30 {
            let problem = mapgen::random::generate(&mapgen::random::Params::small(), seed);
            let mut pool = BufferPool::new();
            let mut state = State::new(&problem, &mut pool);
            let g = problem.geometry;
            for _ in 0..60 {
                let pos = Pos::new(rng.random_range(0..g.width), rng.random_range(0..g.height));
                let placement = match rng.random_range(0..5) {
                    0 if state.obstacles.len() < problem.limits.max_obstacles => Placement::Obstacle(pos),
                    1 if state.mirrors.len() < problem.limits.max_mirrors => {
                        Placement::Mirror(pos, Mirror::ALL[rng.random_range(0..2)])
                    }
                    _ => {
                        if !state.light(pos).is_empty() {
                            continue;
                        }
                        Placement::Lantern(pos, Color::PRIMARIES[rng.random_range(0..3)])
                    }
                };
                state.apply(placement, &problem.costs);
                assert!(state.potential >= state.score, "seed {seed}");
            }
            let solution = Solution::from_state(&state);
            let evaluation = evaluate(&problem, &solution).unwrap();
            let costs: i32 = state.placements().iter().map(|&p| problem.costs.of(p)).sum();
            assert_eq!(state.illumination_score() - costs, state.score, "seed {seed}");
            assert_eq!(evaluation.score, state.score as i64, "seed {seed}");
            assert!(state.mirrors.len() <= problem.limits.max_mirrors);
            assert!(state.obstacles.len() <= problem.limits.max_obstacles);
        }
    }
}
