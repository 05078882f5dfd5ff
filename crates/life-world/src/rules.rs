//! Generation update rule.
//!
//! Classic B3/S23 life, extended to several species: a newborn cell takes
//! the species that dominates its neighborhood, a survivor keeps its own.
//! Dominance is tracked as a streaming argmax over the neighbors in scan
//! order; whenever the scanned species' tally equals the leader's, a coin
//! flip decides whether it takes the lead. Later ties therefore win more
//! often than earlier ones. The scan order and the coin draws are kept
//! exactly as they are so a seeded run reproduces bit for bit.

use crate::grid::Grid;
use life_core::{Position, Species, NEIGHBOR_OFFSETS};
use rand::Rng;
use tracing::instrument;

/// Live neighbor count at which a dead cell is born
pub const BIRTH_COUNT: u8 = 3;

/// Live neighbor counts at which a live cell survives
pub const SURVIVAL_COUNTS: [u8; 2] = [2, 3];

/// Summary of a cell's neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    /// Number of live neighbors, regardless of species
    pub alive: u8,
    /// Species a newborn cell would take
    pub leader: Species,
}

/// Scan the eight toroidal neighbors of `pos`.
pub fn scan_neighborhood<R: Rng + ?Sized>(grid: &Grid, pos: Position, rng: &mut R) -> Neighborhood {
    // Indexed by raw id so out-of-range ids written by edits can't overflow.
    let mut tally = [0u8; 256];
    let mut alive = 0u8;
    let mut leader = Species::DEAD;

    for (dx, dy) in NEIGHBOR_OFFSETS {
        let neighbor = grid.get_wrapped(pos.add(dx, dy));
        if !neighbor.is_alive() {
            continue;
        }

        alive += 1;
        tally[neighbor.index()] += 1;

        let count = tally[neighbor.index()];
        let leading = tally[leader.index()];
        // A neighbor of the leader's own species still draws a coin here.
        if count > leading || (count == leading && rng.gen_bool(0.5)) {
            leader = neighbor;
        }
    }

    Neighborhood { alive, leader }
}

/// Next state of a single cell, read purely from `grid`.
pub fn next_cell_state<R: Rng + ?Sized>(grid: &Grid, pos: Position, rng: &mut R) -> Species {
    let current = grid.get_wrapped(pos);
    let neighborhood = scan_neighborhood(grid, pos, rng);

    if !current.is_alive() && neighborhood.alive == BIRTH_COUNT {
        neighborhood.leader
    } else if current.is_alive() && !SURVIVAL_COUNTS.contains(&neighborhood.alive) {
        Species::DEAD
    } else {
        current
    }
}

/// Compute the whole next generation into a fresh grid. The input is never
/// mutated, so every cell sees the old generation.
#[instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
pub fn next_generation<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid {
    let cells = (0..grid.cells().len())
        .map(|index| next_cell_state(grid, grid.index_to_pos(index), rng))
        .collect();

    grid.with_cells(cells)
}
