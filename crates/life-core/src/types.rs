//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a cell's occupant. `0` is reserved for dead/empty cells;
/// any other value is a live species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Species(pub u8);

impl Species {
    pub const DEAD: Species = Species(0);

    pub fn is_alive(self) -> bool {
        self.0 != 0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for Species {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position in the world. Signed so that neighbor offsets can step
/// past an edge before being wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for given world dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: ((self.x % width) + width) % width,
            y: ((self.y % height) + height) % height,
        }
    }
}

/// The 3x3 window around a cell minus its center, in row-major order.
/// The rule engine's tie-break depends on this exact order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wrap() {
        let pos = Position::new(5, 5);
        let wrapped = pos.wrap(10, 10);
        assert_eq!(wrapped, Position::new(5, 5));

        let pos = Position::new(-1, -1);
        let wrapped = pos.wrap(10, 10);
        assert_eq!(wrapped, Position::new(9, 9));

        let pos = Position::new(10, 10);
        let wrapped = pos.wrap(10, 10);
        assert_eq!(wrapped, Position::new(0, 0));
    }

    #[test]
    fn test_wrap_independent_axes() {
        let wrapped = Position::new(-1, 3).wrap(6, 4);
        assert_eq!(wrapped, Position::new(5, 3));

        let wrapped = Position::new(-13, 9).wrap(6, 4);
        assert_eq!(wrapped, Position::new(5, 1));
    }

    #[test]
    fn test_species_liveness() {
        assert!(!Species::DEAD.is_alive());
        assert!(Species(1).is_alive());
        assert!(Species(200).is_alive());
        assert_eq!(Species::default(), Species::DEAD);
    }

    #[test]
    fn test_neighbor_offsets_skip_center() {
        assert!(!NEIGHBOR_OFFSETS.contains(&(0, 0)));
        // row-major: y outer, x inner
        let mut sorted = NEIGHBOR_OFFSETS;
        sorted.sort_by_key(|&(dx, dy)| (dy, dx));
        assert_eq!(sorted, NEIGHBOR_OFFSETS);
    }
}
