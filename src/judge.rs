//! Answer format and a from-scratch scorer.
//!
//! [`evaluate`] never touches [`crate::state::State`]: it rebuilds the final
//! board and traces every lantern with its own ray walk, so it doubles as the
//! reference the incremental engine is tested against.

use crate::geometry::{Cell, Color, Dir, Mirror, Pos};
use crate::moves::Placement;
use crate::problem::Problem;
use crate::score::crystal_score;
use crate::state::State;
use itertools::Itertools;

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Solution {
    pub placements: Vec<Placement>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JudgeError {
    #[error("line {line}: expected `row col symbol`, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("({row}, {col}) is outside the board")]
    OutOfRange { row: usize, col: usize },
    #[error("({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
    #[error("{count} mirrors placed, at most {max} allowed")]
    TooManyMirrors { count: usize, max: usize },
    #[error("{count} obstacles placed, at most {max} allowed")]
    TooManyObstacles { count: usize, max: usize },
}

impl Solution {
    pub fn from_state(state: &State) -> Self {
        Self {
            placements: state.placements(),
        }
    }

    /// Answer lines, `row col symbol` each.
    pub fn lines(&self) -> Vec<String> {
        self.placements
            .iter()
            .map(|p| format!("{} {} {}", p.pos().y, p.pos().x, p.symbol()))
            .collect()
    }

    /// Reads answer lines. A leading line holding only the item count, as
    /// printed by the solver, is accepted and checked.
    pub fn parse(text: &str) -> Result<Self, JudgeError> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()).peekable();
        let mut expected = None;
        if let Some((_, first)) = lines.peek() {
            if let Ok(count) = first.trim().parse::<usize>() {
                expected = Some(count);
                lines.next();
            }
        }
        let mut placements = vec![];
        for (line, text) in lines {
            let malformed = || JudgeError::Malformed {
                line: line + 1,
                text: text.to_owned(),
            };
            let Some((row, col, symbol)) = text.split_whitespace().collect_tuple() else {
                return Err(malformed());
            };
            let row: usize = row.parse().map_err(|_| malformed())?;
            let col: usize = col.parse().map_err(|_| malformed())?;
            if row > u8::MAX as usize || col > u8::MAX as usize {
                return Err(JudgeError::OutOfRange { row, col });
            }
            let pos = Pos::new(col, row);
            let placement = match symbol {
                "X" => Placement::Obstacle(pos),
                "/" => Placement::Mirror(pos, Mirror::Slash),
                "\\" => Placement::Mirror(pos, Mirror::Backslash),
                _ => {
                    let color = symbol
                        .parse::<u8>()
                        .ok()
                        .and_then(Color::from_code)
                        .filter(|c| c.is_primary())
                        .ok_or_else(malformed)?;
                    Placement::Lantern(pos, color)
                }
            };
            placements.push(placement);
        }
        if let Some(count) = expected {
            if count != placements.len() {
                return Err(JudgeError::Malformed {
                    line: 1,
                    text: format!("{} items announced, {} listed", count, placements.len()),
                });
            }
        }
        Ok(Self { placements })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Evaluation {
    /// Crystal score minus item costs.
    pub score: i64,
    pub crystals: usize,
    /// Crystals lit with exactly their colors.
    pub matched: usize,
    /// Crystals lit with the wrong colors.
    pub mismatched: usize,
    /// Lanterns reached by another lantern's light.
    pub lit_lanterns: usize,
    pub cost: i64,
}

/// Board after every placement, and the colors reaching each cell.
pub struct Replay {
    pub cells: Vec<Cell>,
    pub light: Vec<Color>,
}

pub fn replay(problem: &Problem, solution: &Solution) -> Result<Replay, JudgeError> {
    let g = problem.geometry;
    let mut cells = problem.cells.clone();
    let (mut mirrors, mut obstacles) = (0, 0);
    for &p in &solution.placements {
        let Pos { x, y } = p.pos();
        let (row, col) = (y as usize, x as usize);
        if !g.contains(col as i32, row as i32) {
            return Err(JudgeError::OutOfRange { row, col });
        }
        let cell = &mut cells[g.index(p.pos())];
        if !cell.is_empty() {
            return Err(JudgeError::Occupied { row, col });
        }
        *cell = p.cell();
        match p {
            Placement::Mirror(..) => mirrors += 1,
            Placement::Obstacle(..) => obstacles += 1,
            Placement::Lantern(..) => {}
        }
    }
    if mirrors > problem.limits.max_mirrors {
        return Err(JudgeError::TooManyMirrors {
            count: mirrors,
            max: problem.limits.max_mirrors,
        });
    }
    if obstacles > problem.limits.max_obstacles {
        return Err(JudgeError::TooManyObstacles {
            count: obstacles,
            max: problem.limits.max_obstacles,
        });
    }

    let mut light = vec![Color::EMPTY; cells.len()];
    for (start, &cell) in cells.iter().enumerate() {
        let Cell::Lantern(color) = cell else {
            continue;
        };
        for dir in Dir::ALL {
            let (mut x, mut y) = ((start % g.width) as i32, (start / g.width) as i32);
            let mut dir = dir;
            let mut seen = vec![false; cells.len() * 4];
            loop {
                let (dx, dy) = dir.delta();
                x += dx;
                y += dy;
                if !g.contains(x, y) {
                    break;
                }
                let i = y as usize * g.width + x as usize;
                if std::mem::replace(&mut seen[i * 4 + dir.index()], true) {
                    break;
                }
                light[i] |= color;
                match cells[i] {
                    Cell::Empty => {}
                    Cell::Mirror(m) => dir = dir.reflect(m),
                    _ => break,
                }
            }
        }
    }
    Ok(Replay { cells, light })
}

pub fn evaluate(problem: &Problem, solution: &Solution) -> Result<Evaluation, JudgeError> {
    let Replay { cells, light } = replay(problem, solution)?;
    let mut eval = Evaluation::default();
    for (cell, &lit) in cells.iter().zip(&light) {
        match *cell {
            Cell::Crystal(color) => {
                eval.crystals += 1;
                let score = crystal_score(color, lit);
                eval.score += score as i64;
                if score > 0 {
                    eval.matched += 1;
                } else if score < 0 {
                    eval.mismatched += 1;
                }
            }
            Cell::Lantern(_) if !lit.is_empty() => eval.lit_lanterns += 1,
            _ => {}
        }
    }
    eval.cost = solution
        .placements
        .iter()
        .map(|&p| problem.costs.of(p) as i64)
        .sum();
    eval.score -= eval.cost;
    Ok(eval)
}
