//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: u32,
    /// Height of the world grid
    pub height: u32,
    /// Number of live species; cell values range over `0..=species_count`
    pub species_count: u8,
    /// Random seed for reproducibility (entropy when absent)
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 140,
            height: 100,
            species_count: 5,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(Error::Validation(format!(
                "grid dimensions {}x{} exceed the signed coordinate range",
                self.width, self.height
            )));
        }
        if self.species_count == 0 {
            return Err(Error::Validation(
                "at least one live species is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A cell painted onto the board before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPlacement {
    pub x: i32,
    pub y: i32,
    pub species: u8,
}

/// Configuration of the headless driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// World configuration
    pub world: WorldConfig,
    /// Target generations per second (never below 1)
    pub simulation_fps: u32,
    /// Initial random population is `width * height / populate_divisor`
    pub populate_divisor: u32,
    /// Stop after this many published generations
    pub max_generations: Option<u64>,
    /// Log population statistics every N generations
    pub report_interval: u64,
    /// Cells painted before the first tick
    pub initial_cells: Vec<CellPlacement>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            simulation_fps: 8,
            populate_divisor: 20,
            max_generations: None,
            report_interval: 8,
            initial_cells: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_json::from_str(&text)?;
        config.world.validate()?;
        Ok(config)
    }

    pub fn effective_fps(&self) -> u32 {
        self.simulation_fps.max(1)
    }

    pub fn initial_population(&self) -> u32 {
        let cells = self.world.cell_count() / self.populate_divisor.max(1) as u64;
        cells.min(u32::MAX as u64) as u32
    }
}
