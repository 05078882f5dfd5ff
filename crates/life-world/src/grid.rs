//! 2D grid for the world.

use life_core::{Error, Position, Result, Species};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D toroidal grid of species ids, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Species>,
}

/// Unchecked wire form of a grid
#[derive(Deserialize)]
struct RawGrid {
    width: u32,
    height: u32,
    cells: Vec<Species>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        let grid = Self::new(raw.width, raw.height)?;
        if raw.cells.len() != grid.cells.len() {
            return Err(Error::Validation(format!(
                "{}x{} grid needs {} cells, got {}",
                raw.width,
                raw.height,
                grid.cells.len(),
                raw.cells.len()
            )));
        }
        Ok(grid.with_cells(raw.cells))
    }
}

impl Grid {
    /// Create an all-dead grid
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::Validation(format!(
                "grid dimensions {}x{} exceed the signed coordinate range",
                width, height
            )));
        }

        let size = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![Species::DEAD; size],
        })
    }

    /// Parse an ASCII board: `.` is dead, digits are species ids.
    /// All rows must have the same length.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0) as u32;
        let mut grid = Self::new(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(Error::Validation(format!(
                    "row {} has length {}, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                let species = match ch {
                    '.' => Species::DEAD,
                    '0'..='9' => Species(ch as u8 - b'0'),
                    other => {
                        return Err(Error::Validation(format!(
                            "unexpected cell character {:?} at ({}, {})",
                            other, x, y
                        )))
                    }
                };
                grid.set(x as u32, y as u32, species)?;
            }
        }

        Ok(grid)
    }

    /// Same dimensions, new contents. `cells` must be row-major and full size.
    pub(crate) fn with_cells(&self, cells: Vec<Species>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether signed coordinates fall inside the grid
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub fn get(&self, x: u32, y: u32) -> Result<Species> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(self.cells[self.index(x, y)])
    }

    /// Species ids are stored as given; range checking is the caller's job.
    pub fn set(&mut self, x: u32, y: u32, species: Species) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        let index = self.index(x, y);
        self.cells[index] = species;
        Ok(())
    }

    /// Get the cell at position (with toroidal wrapping)
    pub fn get_wrapped(&self, pos: Position) -> Species {
        let wrapped = pos.wrap(self.width as i32, self.height as i32);
        self.cells[self.index(wrapped.x as u32, wrapped.y as u32)]
    }

    pub fn cells(&self) -> &[Species] {
        &self.cells
    }

    pub fn count_dead(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_alive()).count()
    }

    pub fn population(&self) -> usize {
        self.cells.len() - self.count_dead()
    }

    /// Occurrences of each id in `0..=species_count`. Out-of-range ids
    /// stored through `set` are not counted.
    pub fn species_counts(&self, species_count: u8) -> Vec<usize> {
        let mut counts = vec![0; species_count as usize + 1];
        for cell in &self.cells {
            if let Some(slot) = counts.get_mut(cell.index()) {
                *slot += 1;
            }
        }
        counts
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index % self.width as usize) as i32;
        let y = (index / self.width as usize) as i32;
        Position::new(x, y)
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, Species)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), *cell))
    }

    /// Positions of all live cells, row-major
    pub fn live_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_alive())
            .map(|(pos, _)| pos)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                let ch = match cell.0 {
                    0 => '.',
                    id @ 1..=9 => (b'0' + id) as char,
                    _ => '+',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 8).unwrap();
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.cells().len(), 80);
        assert_eq!(grid.count_dead(), 80);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(Grid::new(0, 5), Err(Error::Validation(_))));
        assert!(matches!(Grid::new(5, 0), Err(Error::Validation(_))));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::new(4, 3).unwrap();
        assert!(grid.get(3, 2).is_ok());
        assert!(matches!(
            grid.get(4, 0),
            Err(Error::OutOfBounds { x: 4, y: 0, width: 4, height: 3 })
        ));
        assert!(matches!(grid.get(0, 3), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_set_stores_unchecked_species() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(1, 2, Species(42)).unwrap();
        assert_eq!(grid.get(1, 2).unwrap(), Species(42));
        assert!(grid.set(4, 4, Species(1)).is_err());
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn test_toroidal_wrapping() {
        let mut grid = Grid::new(10, 10).unwrap();
        grid.set(9, 9, Species(2)).unwrap();
        grid.set(0, 0, Species(3)).unwrap();

        // Should wrap to (9, 9)
        assert_eq!(grid.get_wrapped(Position::new(-1, -1)), Species(2));
        // Should wrap to (0, 0)
        assert_eq!(grid.get_wrapped(Position::new(10, 10)), Species(3));
    }

    #[test]
    fn test_rows_round_trip_through_display() {
        let rows = [".1..", "..2.", "5..."];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(1, 0).unwrap(), Species(1));
        assert_eq!(grid.get(2, 1).unwrap(), Species(2));
        assert_eq!(grid.get(0, 2).unwrap(), Species(5));
        assert_eq!(grid.to_string(), ".1..\n..2.\n5...\n");
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(Grid::from_rows(&["...", ".."]).is_err());
        assert!(Grid::from_rows(&["..x"]).is_err());
        assert!(Grid::from_rows(&[]).is_err());
    }

    #[test]
    fn test_deserialize_checks_cell_count() {
        let grid = Grid::from_rows(&[".1", "2."]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let decoded: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, grid);

        let short = r#"{"width": 3, "height": 3, "cells": [0, 1, 0]}"#;
        assert!(serde_json::from_str::<Grid>(short).is_err());

        let empty = r#"{"width": 0, "height": 2, "cells": []}"#;
        assert!(serde_json::from_str::<Grid>(empty).is_err());
    }

    #[test]
    fn test_species_counts() {
        let mut grid = Grid::from_rows(&["11.", "2.3"]).unwrap();
        grid.set(1, 1, Species(9)).unwrap();
        assert_eq!(grid.species_counts(3), vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_live_positions_row_major() {
        let grid = Grid::from_rows(&[".1.", "1..", "..1"]).unwrap();
        let live: Vec<_> = grid.live_positions().collect();
        assert_eq!(
            live,
            vec![Position::new(1, 0), Position::new(0, 1), Position::new(2, 2)]
        );
    }
}
