//! Random population of dead cells.

use crate::grid::Grid;
use life_core::Species;
use rand::Rng;
use tracing::{debug, instrument};

/// Turn up to `amount` dead cells into live cells of uniformly random
/// species in `1..=species_count`. Clamped to the number of dead cells, so
/// the result is exactly `min(amount, dead)` new live cells.
///
/// Positions are found by rejection sampling with no attempt limit; a
/// nearly full board makes the last few placements slow.
#[instrument(skip(grid, rng), fields(width = grid.width(), height = grid.height()))]
pub fn populate<R: Rng + ?Sized>(
    grid: &mut Grid,
    amount: u32,
    species_count: u8,
    rng: &mut R,
) -> u32 {
    if species_count == 0 {
        return 0;
    }

    let free_space = grid.count_dead();
    let to_create = (amount as usize).min(free_space) as u32;

    let mut created = 0;
    let mut attempts: u64 = 0;
    while created < to_create {
        attempts += 1;
        let x = rng.gen_range(0..grid.width());
        let y = rng.gen_range(0..grid.height());

        if let Ok(Species::DEAD) = grid.get(x, y) {
            let species = Species(rng.gen_range(1..=species_count));
            if grid.set(x, y, species).is_ok() {
                created += 1;
            }
        }
    }

    debug!(
        requested = amount,
        free_space,
        created,
        attempts,
        "Populated grid"
    );
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_populate_exact_amount() {
        let mut grid = Grid::new(20, 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let created = populate(&mut grid, 37, 5, &mut rng);
        assert_eq!(created, 37);
        assert_eq!(grid.population(), 37);
        assert!(grid.cells().iter().all(|cell| cell.0 <= 5));
    }

    #[test]
    fn test_populate_clamps_to_free_space() {
        let mut grid = Grid::from_rows(&["1.1", "...", "2.2"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let created = populate(&mut grid, 100, 3, &mut rng);
        assert_eq!(created, 5);
        assert_eq!(grid.count_dead(), 0);
        // existing cells are never overwritten
        assert_eq!(grid.get(0, 0).unwrap(), Species(1));
        assert_eq!(grid.get(2, 2).unwrap(), Species(2));
    }

    #[test]
    fn test_populate_full_board_is_noop() {
        let mut grid = Grid::from_rows(&["12", "34"]).unwrap();
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(populate(&mut grid, 10, 5, &mut rng), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_populate_uses_every_species() {
        let mut grid = Grid::new(30, 30).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        populate(&mut grid, 600, 5, &mut rng);

        let counts = grid.species_counts(5);
        assert_eq!(counts[0], 300);
        assert!(counts[1..].iter().all(|&count| count > 0));
    }

    proptest! {
        #[test]
        fn prop_populate_adds_min_of_amount_and_free(
            seed in any::<u64>(),
            width in 1u32..12,
            height in 1u32..12,
            prefill in 0u32..60,
            amount in 0u32..200,
            species_count in 1u8..8,
        ) {
            let mut grid = Grid::new(width, height).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            populate(&mut grid, prefill, species_count, &mut rng);

            let free = grid.count_dead();
            let before = grid.clone();
            let created = populate(&mut grid, amount, species_count, &mut rng);

            prop_assert_eq!(created as usize, (amount as usize).min(free));
            prop_assert_eq!(grid.count_dead(), free - created as usize);
            for (old, new) in before.cells().iter().zip(grid.cells()) {
                if old.is_alive() {
                    prop_assert_eq!(old, new);
                }
                prop_assert!(new.0 <= species_count);
            }
        }
    }
}
