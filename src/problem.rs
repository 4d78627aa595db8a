//! Problem input: the target board plus item costs and placement limits.

use crate::geometry::{Cell, Geometry};
use crate::moves::Placement;
use anyhow::Context;
use proconio::input;
use proconio::source::once::OnceSource;
use std::fmt;

/// Largest supported side; positions are stored as `u8`.
pub const MAX_SIDE: usize = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Costs {
    pub lantern: i32,
    pub mirror: i32,
    pub obstacle: i32,
}

impl Costs {
    pub fn of(&self, placement: Placement) -> i32 {
        match placement {
            Placement::Lantern(..) => self.lantern,
            Placement::Mirror(..) => self.mirror,
            Placement::Obstacle(..) => self.obstacle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Limits {
    pub max_mirrors: usize,
    pub max_obstacles: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("board has no cells")]
    Empty,
    #[error("board is {width}x{height}, sides are limited to {MAX_SIDE}")]
    TooLarge { width: usize, height: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unexpected symbol {symbol:?} at row {row}, column {col}")]
    Symbol { row: usize, col: usize, symbol: char },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub geometry: Geometry,
    pub cells: Vec<Cell>,
    pub costs: Costs,
    pub limits: Limits,
}

impl Problem {
    pub fn from_rows<S: AsRef<str>>(rows: &[S], costs: Costs, limits: Limits) -> Result<Self, ProblemError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(ProblemError::Empty);
        }
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(ProblemError::TooLarge { width, height });
        }
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(ProblemError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or(ProblemError::Symbol { row, col, symbol })?;
                cells.push(cell);
            }
        }
        Ok(Self {
            geometry: Geometry::new(width, height),
            cells,
            costs,
            limits,
        })
    }

    /// Parses `H`, `H` board rows, then lantern, mirror and obstacle costs and
    /// the mirror and obstacle limits, all whitespace separated.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let mut src = OnceSource::from(input);
        input! {
            from &mut src,
            h: usize,
            rows: [String; h],
            lantern: i32,
            mirror: i32,
            obstacle: i32,
            max_mirrors: usize,
            max_obstacles: usize,
        }
        let costs = Costs {
            lantern,
            mirror,
            obstacle,
        };
        let limits = Limits {
            max_mirrors,
            max_obstacles,
        };
        Self::from_rows(&rows, costs, limits).context("Invalid target board")
    }

    pub fn read_from_stdin() -> anyhow::Result<Self> {
        use std::io::Read;
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        Self::parse(&input)
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn crystals(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Crystal(_)))
            .count()
    }

    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.geometry.width)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.geometry.height)?;
        for row in self.rows() {
            writeln!(f, "{}", row)?;
        }
        writeln!(f, "{}", self.costs.lantern)?;
        writeln!(f, "{}", self.costs.mirror)?;
        writeln!(f, "{}", self.costs.obstacle)?;
        writeln!(f, "{}", self.limits.max_mirrors)?;
        writeln!(f, "{}", self.limits.max_obstacles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;

    const SAMPLE: &str = "3\n.1.\nX..\n..6\n2\n3\n4\n1\n5\n";

    #[test]
    fn parse_reads_board_and_parameters() {
        let problem = Problem::parse(SAMPLE).unwrap();
        assert_eq!(problem.width(), 3);
        assert_eq!(problem.height(), 3);
        assert_eq!(problem.cells[1], Cell::Crystal(Color::BLUE));
        assert_eq!(problem.cells[3], Cell::Obstacle);
        assert_eq!(problem.cells[8], Cell::Crystal(Color::YELLOW | Color::RED));
        assert_eq!(
            problem.costs,
            Costs {
                lantern: 2,
                mirror: 3,
                obstacle: 4
            }
        );
        assert_eq!(problem.limits.max_mirrors, 1);
        assert_eq!(problem.limits.max_obstacles, 5);
        assert_eq!(problem.crystals(), 2);
    }

    #[test]
    fn display_writes_the_input_format_back() {
        let problem = Problem::parse(SAMPLE).unwrap();
        assert_eq!(problem.to_string(), SAMPLE);
        assert_eq!(Problem::parse(&problem.to_string()).unwrap(), problem);
    }

    #[test]
    fn from_rows_rejects_malformed_boards() {
        let costs = Costs {
            lantern: 1,
            mirror: 1,
            obstacle: 1,
        };
        let limits = Limits {
            max_mirrors: 0,
            max_obstacles: 0,
        };
        assert_eq!(
            Problem::from_rows(&["..", "..."], costs, limits),
            Err(ProblemError::Ragged {
                row: 1,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            Problem::from_rows(&[".7"], costs, limits),
            Err(ProblemError::Symbol {
                row: 0,
                col: 1,
                symbol: '7'
            })
        );
        assert_eq!(Problem::from_rows::<&str>(&[], costs, limits), Err(ProblemError::Empty));
    }
}
