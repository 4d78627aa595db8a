//! Four-directional ray marching over a board.
//!
//! Every primitive starts at a cell and walks away from it, entering the
//! neighbouring cell first. Mirrors bend the walk, crystals and every other
//! object end it, and so does the edge of the grid. The cell that ends a walk
//! is still visited, which is how crystals (and blocking objects) get to know
//! what light reaches them.

use crate::geometry::{Cell, Color, Dir, Geometry};
use crate::light::Light;
use crate::score::{crystal_potential, crystal_score};

/// Change in a crystal's illumination caused by one walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub cell: usize,
    pub crystal: Color,
    pub before: Color,
    pub after: Color,
}

impl Hit {
    pub fn score_delta(&self) -> i32 {
        crystal_score(self.crystal, self.after) - crystal_score(self.crystal, self.before)
    }

    pub fn potential_delta(&self) -> i32 {
        crystal_potential(self.crystal, self.after) - crystal_potential(self.crystal, self.before)
    }
}

/// Accumulated score and potential change of one placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    pub score: i32,
    pub potential: i32,
}

impl Delta {
    pub fn add(&mut self, hit: Option<Hit>) {
        if let Some(hit) = hit {
            self.score += hit.score_delta();
            self.potential += hit.potential_delta();
        }
    }
}

/// The crystal hit by a ray leaving a cell in some direction, and the
/// direction the ray travels when it reaches the crystal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sight {
    pub crystal: u16,
    pub arrival: Dir,
}

pub type SightMaps = [Vec<Option<Sight>>; 4];

/// Read-only view of the board used to drive walks over the derived maps.
#[derive(Clone, Copy)]
pub struct Rays<'a> {
    geometry: Geometry,
    cells: &'a [Cell],
}

impl<'a> Rays<'a> {
    pub fn new(geometry: Geometry, cells: &'a [Cell]) -> Self {
        debug_assert_eq!(geometry.cells(), cells.len());
        Self { geometry, cells }
    }

    /// Walks from `from` in `dir`, calling `visit(cell, travel_dir)` for every
    /// cell entered. Returns the cell that stopped the walk and the direction
    /// the ray entered it with, or `None` if the ray left the grid.
    pub fn trace(&self, from: usize, dir: Dir, mut visit: impl FnMut(usize, Dir)) -> Option<(usize, Dir)> {
        let width = self.geometry.width;
        let mut x = (from % width) as i32;
        let mut y = (from / width) as i32;
        let mut dir = dir;
        // Closed mirror loops carry no light; stop once every (cell, direction)
        // pair could have been seen.
        let mut budget = 4 * self.cells.len();
        loop {
            let (dx, dy) = dir.delta();
            x += dx;
            y += dy;
            if !self.geometry.contains(x, y) || budget == 0 {
                return None;
            }
            budget -= 1;
            let cell = y as usize * width + x as usize;
            visit(cell, dir);
            match self.cells[cell] {
                Cell::Empty => {}
                Cell::Mirror(mirror) => dir = dir.reflect(mirror),
                _ => return Some((cell, dir)),
            }
        }
    }

    fn hit(&self, map: &[Light], stop: Option<(usize, Dir)>, before: Color) -> Option<Hit> {
        let (cell, _) = stop?;
        match self.cells[cell] {
            Cell::Crystal(crystal) => Some(Hit {
                cell,
                crystal,
                before,
                after: map[cell].colors(),
            }),
            _ => None,
        }
    }

    /// Adds `color` travelling along the ray.
    pub fn cast(&self, map: &mut [Light], color: Color, from: usize, dir: Dir) -> Option<Hit> {
        let mut before = Color::EMPTY;
        let stop = self.trace(from, dir, |cell, d| {
            before = map[cell].colors();
            map[cell] = map[cell].with(color, d);
        });
        self.hit(map, stop, before)
    }

    /// Removes whatever travels along the ray. Colors reaching a cell from
    /// other directions are untouched.
    pub fn retract(&self, map: &mut [Light], from: usize, dir: Dir) -> Option<Hit> {
        let mut before = Color::EMPTY;
        let stop = self.trace(from, dir, |cell, d| {
            before = map[cell].colors();
            map[cell] = map[cell].without(d);
        });
        self.hit(map, stop, before)
    }

    /// Records `sight` as what every cell along the ray sees when looking back
    /// towards `from`.
    pub fn mark_sight(&self, sights: &mut SightMaps, from: usize, dir: Dir, sight: Option<Sight>) {
        self.trace(from, dir, |cell, d| {
            sights[d.opposite().index()][cell] = sight;
        });
    }

    /// Clears every slot along the ray. When the ray ends on a crystal, the
    /// crystal's other three rays are cleared as well, since every cell that
    /// can see the crystal scores against its illumination.
    pub fn invalidate<T>(&self, slots: &mut [Option<T>], from: usize, dir: Dir) {
        if let Some((cell, arrival)) = self.invalidate_ray(slots, from, dir) {
            if matches!(self.cells[cell], Cell::Crystal(_)) {
                for d in Dir::ALL {
                    if d != arrival.opposite() {
                        self.invalidate_ray(slots, cell, d);
                    }
                }
            }
        }
    }

    fn invalidate_ray<T>(&self, slots: &mut [Option<T>], from: usize, dir: Dir) -> Option<(usize, Dir)> {
        self.trace(from, dir, |cell, _| slots[cell] = None)
    }
}
