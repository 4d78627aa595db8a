use crate::geometry::Color;

pub const SINGLE_MATCH: i32 = 20;
pub const DOUBLE_MATCH: i32 = 30;
pub const MISMATCH: i32 = -10;
/// Reward for a two-color crystal lit by one of its colors, which is still a
/// mismatch but can be completed later.
pub const PARTIAL: i32 = 5;

/// Score of a crystal of colors `crystal` lit by `light`.
pub fn crystal_score(crystal: Color, light: Color) -> i32 {
    if light.is_empty() {
        0
    } else if light == crystal {
        if crystal.is_primary() {
            SINGLE_MATCH
        } else {
            DOUBLE_MATCH
        }
    } else {
        MISMATCH
    }
}

/// Optimistic version of [`crystal_score`]; never below it.
pub fn crystal_potential(crystal: Color, light: Color) -> i32 {
    if light.is_empty() {
        0
    } else if !light.is_subset_of(crystal) {
        MISMATCH
    } else if light == crystal {
        crystal_score(crystal, light)
    } else {
        PARTIAL
    }
}
