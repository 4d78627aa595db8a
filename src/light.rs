use crate::geometry::{Color, Dir};

/// Colors passing through a cell, recorded per travel direction.
///
/// Bit `slot(color) * 4 + dir` is set while a ray of that color travelling in
/// `dir` enters the cell. A color counts as present as long as any of its four
/// direction bits survives, so retracting one ray never hides the same color
/// arriving along another direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Light(u16);

const DIR_MASK: [u16; 4] = [0x111, 0x222, 0x444, 0x888];

impl Light {
    pub const EMPTY: Light = Light(0);

    #[inline]
    fn bits(color: Color, dir: Dir) -> u16 {
        let mut bits = 0;
        for c in color.primaries() {
            bits |= 1 << (c.slot() * 4 + dir.index());
        }
        bits
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Adds `color` travelling in `dir`.
    #[inline]
    pub fn with(self, color: Color, dir: Dir) -> Light {
        Light(self.0 | Self::bits(color, dir))
    }

    /// Drops every color travelling in `dir`.
    #[inline]
    pub fn without(self, dir: Dir) -> Light {
        Light(self.0 & !DIR_MASK[dir.index()])
    }

    #[inline]
    pub fn has(self, dir: Dir) -> bool {
        self.0 & DIR_MASK[dir.index()] != 0
    }

    /// Colors travelling in `dir`.
    #[inline]
    pub fn traveling(self, dir: Dir) -> Color {
        let mut color = Color::EMPTY;
        for c in Color::PRIMARIES {
            if self.0 & (1 << (c.slot() * 4 + dir.index())) != 0 {
                color |= c;
            }
        }
        color
    }

    /// Every color present in the cell, whatever its direction.
    #[inline]
    pub fn colors(self) -> Color {
        let mut color = Color::EMPTY;
        for c in Color::PRIMARIES {
            if self.0 & (0xf << (c.slot() * 4)) != 0 {
                color |= c;
            }
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_survives_while_any_direction_remains() {
        let light = Light::EMPTY
            .with(Color::BLUE, Dir::Left)
            .with(Color::BLUE | Color::RED, Dir::Down);
        assert_eq!(light.colors(), Color::BLUE | Color::RED);

        let light = light.without(Dir::Down);
        assert_eq!(light.colors(), Color::BLUE);
        assert!(light.has(Dir::Left));
        assert!(!light.has(Dir::Down));

        assert!(light.without(Dir::Left).is_empty());
    }

    #[test]
    fn traveling_reports_one_direction() {
        let light = Light::EMPTY
            .with(Color::YELLOW, Dir::Up)
            .with(Color::RED, Dir::Right);
        assert_eq!(light.traveling(Dir::Up), Color::YELLOW);
        assert_eq!(light.traveling(Dir::Right), Color::RED);
        assert_eq!(light.traveling(Dir::Left), Color::EMPTY);
    }
}
