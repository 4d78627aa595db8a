//! Anytime beam search over placements.
//!
//! A round expands the frontier one item at a time: every state offers its
//! best cached candidates, the union is ranked by resulting potential, the
//! best `width` distinct successors become the next frontier. Rounds restart
//! from the empty board with a wider beam until the deadline, keeping the best
//! board by exact score across all of them.

use crate::judge::Solution;
use crate::moves::{Candidate, Placement};
use crate::pool::BufferPool;
use crate::problem::{Limits, Problem};
use crate::state::State;
use crate::{Deadline, SetMinMax};
use std::time::Duration;

#[derive(Clone, Debug, serde::Serialize)]
pub struct SearchConfig {
    pub time_limit: Duration,
    pub initial_width: usize,
    pub width_growth: usize,
    /// When unset, no mirror is ever placed whatever the problem allows.
    pub mirrors: bool,
    /// Prints one summary line per round to stderr.
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(9500),
            initial_width: 1,
            width_growth: 5,
            mirrors: true,
            verbose: false,
        }
    }
}

/// Summary of one beam width.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Round {
    pub width: usize,
    pub steps: usize,
    pub score: i32,
    /// Whether any candidate was dropped for lack of beam room.
    pub pruned: bool,
    pub elapsed: f64,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Outcome {
    pub solution: Solution,
    pub score: i32,
    pub rounds: Vec<Round>,
    pub allocated: usize,
    pub reused: usize,
}

/// A successor of frontier state `parent`.
#[derive(Clone, Copy, Debug)]
struct Move {
    parent: usize,
    candidate: Candidate,
    score: i32,
    potential: i32,
    hash: u64,
}

impl Move {
    fn new(parent: usize, state: &State, candidate: Candidate) -> Self {
        Self {
            parent,
            candidate,
            score: state.score + candidate.score,
            potential: state.potential + candidate.potential,
            hash: state.hash ^ candidate.placement.zobrist(),
        }
    }

    /// Whether both moves lead to the same board.
    fn same(&self, other: &Move, frontier: &[Option<State>]) -> bool {
        if self.hash != other.hash || self.score != other.score || self.potential != other.potential {
            return false;
        }
        let (Some(a), Some(b)) = (&frontier[self.parent], &frontier[other.parent]) else {
            return false;
        };
        let mut counts = a.counts();
        let mut other_counts = b.counts();
        counts[kind(self.candidate)] += 1;
        other_counts[kind(other.candidate)] += 1;
        if counts != other_counts {
            return false;
        }
        // Equal counts make containment both ways.
        let mine = self.candidate.placement;
        let theirs = other.candidate.placement;
        a.items()
            .chain(std::iter::once(mine))
            .all(|p| p == theirs || b.holds(p))
    }
}

/// Index into [`State::counts`].
fn kind(candidate: Candidate) -> usize {
    match candidate.placement {
        Placement::Lantern(..) => 0,
        Placement::Obstacle(..) => 1,
        Placement::Mirror(..) => 2,
    }
}

/// Inserts `mv` into `moves`, kept sorted by potential and at most `width`
/// long. Among equal potentials the newcomer goes last, unless it duplicates
/// one of them. Returns `true` if a move was lost to the width.
fn add_move(moves: &mut Vec<Move>, mv: Move, width: usize, frontier: &[Option<State>]) -> bool {
    if moves.len() >= width {
        match moves.last() {
            Some(last) if last.potential < mv.potential => {}
            _ => return true,
        }
    }
    let mut at = moves.partition_point(|m| m.potential > mv.potential);
    while at < moves.len() && moves[at].potential == mv.potential {
        if moves[at].same(&mv, frontier) {
            return false;
        }
        at += 1;
    }
    moves.insert(at, mv);
    if moves.len() > width {
        moves.truncate(width);
        return true;
    }
    false
}

pub struct Solver<'a> {
    problem: &'a Problem,
    config: SearchConfig,
    limits: Limits,
    deadline: Deadline,
    pool: BufferPool,
}

impl<'a> Solver<'a> {
    /// Starts the clock.
    pub fn new(problem: &'a Problem, config: SearchConfig) -> Self {
        let mut limits = problem.limits;
        if !config.mirrors {
            limits.max_mirrors = 0;
        }
        Self {
            problem,
            deadline: Deadline::after(config.time_limit),
            config,
            limits,
            pool: BufferPool::new(),
        }
    }

    pub fn run(mut self) -> Outcome {
        let root = State::new(self.problem, &mut self.pool);
        let mut score = root.score;
        let mut solution = Solution::from_state(&root);
        let mut rounds = vec![];
        let mut width = self.config.initial_width.max(1);
        while !self.deadline.exceeded() {
            let (round, best) = self.search(&root, width);
            if self.config.verbose {
                eprintln!(
                    "width {:>7}  steps {:>4}  score {:>6}  {:>6.3}s{}",
                    round.width,
                    round.steps,
                    round.score,
                    round.elapsed,
                    if round.pruned { "" } else { "  (exhaustive)" }
                );
            }
            if score.setmax(round.score) {
                solution = best;
            }
            let pruned = round.pruned;
            rounds.push(round);
            // A wider beam would replay the same search.
            if !pruned {
                break;
            }
            width = width.saturating_mul(self.config.width_growth.max(2));
        }
        root.recycle(&mut self.pool);
        Outcome {
            solution,
            score,
            rounds,
            allocated: self.pool.allocated(),
            reused: self.pool.reused(),
        }
    }

    /// One beam search of the given width from `root`.
    fn search(&mut self, root: &State, width: usize) -> (Round, Solution) {
        let costs = self.problem.costs;
        let mut frontier = vec![Some(root.duplicate(&mut self.pool))];
        let mut best_score = root.score;
        let mut best = Solution::from_state(root);
        let mut moves: Vec<Move> = Vec::with_capacity(width.min(1 << 16) + 1);
        let mut candidates = vec![];
        let mut refs: Vec<usize> = vec![];
        let mut pruned = false;
        let mut steps = 0;

        while !frontier.is_empty() && !self.deadline.exceeded() {
            steps += 1;
            moves.clear();
            for i in 0..frontier.len() {
                if self.deadline.exceeded() {
                    break;
                }
                let Some(state) = frontier[i].as_mut() else {
                    continue;
                };
                let eligible = state.top_moves(width, &costs, &self.limits, &self.deadline, &mut candidates);
                pruned |= eligible > candidates.len();
                let Some(state) = frontier[i].as_ref() else {
                    continue;
                };
                for &candidate in &candidates {
                    let mv = Move::new(i, state, candidate);
                    pruned |= add_move(&mut moves, mv, width, &frontier);
                }
            }

            refs.clear();
            refs.resize(frontier.len(), 0);
            for mv in &moves {
                refs[mv.parent] += 1;
            }
            let mut next = Vec::with_capacity(moves.len());
            for mv in &moves {
                refs[mv.parent] -= 1;
                // The last successor of a parent takes it over.
                let state = if refs[mv.parent] == 0 {
                    frontier[mv.parent].take()
                } else {
                    frontier[mv.parent].as_ref().map(|s| s.duplicate(&mut self.pool))
                };
                let Some(mut state) = state else {
                    continue;
                };
                if !state.apply(mv.candidate.placement, &costs) {
                    state.recycle(&mut self.pool);
                    continue;
                }
                if best_score.setmax(state.score) {
                    best = Solution::from_state(&state);
                }
                next.push(Some(state));
            }
            for state in frontier.drain(..).flatten() {
                state.recycle(&mut self.pool);
            }
            frontier = next;
        }
        for state in frontier.into_iter().flatten() {
            state.recycle(&mut self.pool);
        }

        let round = Round {
            width,
            steps,
            score: best_score,
            pruned,
            elapsed: self.deadline.elapsed().as_secs_f64(),
        };
        (round, best)
    }
}

pub fn solve(problem: &Problem, config: SearchConfig) -> Outcome {
    Solver::new(problem, config).run()
}
