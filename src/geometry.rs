//! Grid primitives shared by the simulation: positions, ray directions,
//! mirror orientations, the three-color set and board cell contents.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        debug_assert!(x < 256 && y < 256);
        Self {
            x: x as u8,
            y: y as u8,
        }
    }
}

/// Direction a ray is travelling in. `Up` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
        }
    }

    /// Direction of travel after bouncing off `mirror`.
    ///
    /// Each orientation swaps two pairs of directions, so applying the same
    /// mirror twice gives the original direction back.
    #[inline]
    pub fn reflect(self, mirror: Mirror) -> Dir {
        match (mirror, self) {
            (Mirror::Slash, Dir::Left) => Dir::Down,
            (Mirror::Slash, Dir::Down) => Dir::Left,
            (Mirror::Slash, Dir::Right) => Dir::Up,
            (Mirror::Slash, Dir::Up) => Dir::Right,
            (Mirror::Backslash, Dir::Left) => Dir::Up,
            (Mirror::Backslash, Dir::Up) => Dir::Left,
            (Mirror::Backslash, Dir::Right) => Dir::Down,
            (Mirror::Backslash, Dir::Down) => Dir::Right,
        }
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Mirror {
    Slash,
    Backslash,
}

impl Mirror {
    pub const ALL: [Mirror; 2] = [Mirror::Slash, Mirror::Backslash];

    pub fn symbol(self) -> char {
        match self {
            Mirror::Slash => '/',
            Mirror::Backslash => '\\',
        }
    }

    pub fn from_symbol(c: char) -> Option<Mirror> {
        match c {
            '/' => Some(Mirror::Slash),
            '\\' => Some(Mirror::Backslash),
            _ => None,
        }
    }
}

/// Subset of {Blue, Yellow, Red}, encoded the way crystal digits are:
/// Blue = 1, Yellow = 2, Red = 4.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Color(u8);

impl Color {
    pub const EMPTY: Color = Color(0);
    pub const BLUE: Color = Color(1);
    pub const YELLOW: Color = Color(2);
    pub const RED: Color = Color(4);
    pub const PRIMARIES: [Color; 3] = [Color::BLUE, Color::YELLOW, Color::RED];

    /// Decodes a color mask in `1..=7`.
    pub fn from_code(code: u8) -> Option<Color> {
        (1..=7).contains(&code).then_some(Color(code))
    }

    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, other: Color) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_subset_of(self, other: Color) -> bool {
        other.contains(self)
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_primary(self) -> bool {
        self.count() == 1
    }

    /// Primary colors in this set, in Blue, Yellow, Red order.
    pub fn primaries(self) -> impl Iterator<Item = Color> {
        Color::PRIMARIES
            .into_iter()
            .filter(move |&c| self.contains(c))
    }

    /// Position of a primary color inside per-color bit layouts.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        debug_assert!(self.is_primary());
        self.0.trailing_zeros() as usize
    }
}

impl BitOr for Color {
    type Output = Color;
    #[inline]
    fn bitor(self, rhs: Color) -> Color {
        Color(self.0 | rhs.0)
    }
}

impl BitOrAssign for Color {
    #[inline]
    fn bitor_assign(&mut self, rhs: Color) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Color {
    type Output = Color;
    #[inline]
    fn bitand(self, rhs: Color) -> Color {
        Color(self.0 & rhs.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .primaries()
            .map(|c| match c.0 {
                1 => "Blue",
                2 => "Yellow",
                _ => "Red",
            })
            .collect();
        write!(f, "Color({})", names.join("|"))
    }
}

/// Content of one board cell. Anything but `Empty` is permanent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Lantern(Color),
    Mirror(Mirror),
    Crystal(Color),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'X' => Some(Cell::Obstacle),
            '1'..='6' => Color::from_code(c as u8 - b'0').map(Cell::Crystal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Obstacle => 'X',
            Cell::Lantern(_) => 'L',
            Cell::Mirror(m) => m.symbol(),
            Cell::Crystal(c) => (b'0' + c.code()) as char,
        }
    }
}

/// Width and height of a board plus the row-major index arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn index(&self, pos: Pos) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    #[inline]
    pub fn pos(&self, index: usize) -> Pos {
        Pos::new(index % self.width, index / self.width)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_is_an_involution() {
        for m in Mirror::ALL {
            for d in Dir::ALL {
                assert_eq!(d.reflect(m).reflect(m), d);
                assert_ne!(d.reflect(m), d);
                assert_ne!(d.reflect(m), d.opposite());
            }
        }
    }

    #[test]
    fn reflection_table() {
        assert_eq!(Dir::Right.reflect(Mirror::Slash), Dir::Up);
        assert_eq!(Dir::Left.reflect(Mirror::Slash), Dir::Down);
        assert_eq!(Dir::Right.reflect(Mirror::Backslash), Dir::Down);
        assert_eq!(Dir::Left.reflect(Mirror::Backslash), Dir::Up);
    }

    #[test]
    fn crystal_digits_decode_as_masks() {
        assert_eq!(Cell::from_symbol('1'), Some(Cell::Crystal(Color::BLUE)));
        assert_eq!(
            Cell::from_symbol('3'),
            Some(Cell::Crystal(Color::BLUE | Color::YELLOW))
        );
        assert_eq!(
            Cell::from_symbol('6'),
            Some(Cell::Crystal(Color::YELLOW | Color::RED))
        );
        assert_eq!(Cell::from_symbol('7'), None);
        assert_eq!(Cell::from_symbol('?'), None);
        assert_eq!(Cell::Crystal(Color::from_code(5).unwrap()).symbol(), '5');
    }

    #[test]
    fn color_set_algebra() {
        let by = Color::BLUE | Color::YELLOW;
        assert!(by.contains(Color::BLUE));
        assert!(!by.contains(Color::RED));
        assert!(Color::YELLOW.is_subset_of(by));
        assert_eq!(by.count(), 2);
        assert_eq!(by.primaries().collect::<Vec<_>>(), vec![Color::BLUE, Color::YELLOW]);
        assert!(Color::EMPTY.is_empty());
        assert_eq!(Color::RED.slot(), 2);
    }
}
