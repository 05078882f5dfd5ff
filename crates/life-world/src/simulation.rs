//! Simulation session: asynchronous ticks and synchronous edits over one
//! shared grid.
//!
//! All grid access goes through a single mutex, held for a whole generation
//! scan and for each edit, so an edit can never interleave with a tick's
//! read of the old generation. Ticks are single-flight: a request made while
//! another tick is still computing or publishing is dropped, which keeps
//! publications in generation order.

use crate::grid::Grid;
use crate::rules;
use crate::seeder;
use life_core::{Error, Result, Species, WorldConfig};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace};

/// A finished generation as delivered to the observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Monotonic generation number, starting at 1 for the first tick
    pub number: u64,
    pub grid: Grid,
}

/// Receives each completed tick exactly once.
pub trait GenerationObserver: Send + Sync + 'static {
    fn on_generation_ready(&self, generation: Generation);
}

/// Post generations back to whoever holds the receiver.
impl GenerationObserver for UnboundedSender<Generation> {
    fn on_generation_ready(&self, generation: Generation) {
        let number = generation.number;
        if self.send(generation).is_err() {
            debug!(generation = number, "Observer channel closed, generation discarded");
        }
    }
}

struct FnObserver<F>(F);

impl<F> GenerationObserver for FnObserver<F>
where
    F: Fn(Generation) + Send + Sync + 'static,
{
    fn on_generation_ready(&self, generation: Generation) {
        (self.0)(generation)
    }
}

/// Wrap a closure as an observer
pub fn observer_fn<F>(f: F) -> impl GenerationObserver
where
    F: Fn(Generation) + Send + Sync + 'static,
{
    FnObserver(f)
}

/// Everything a tick reads and writes
pub struct SimulationState {
    grid: Grid,
    generation: u64,
    species_count: u8,
    rng: ChaCha8Rng,
}

impl SimulationState {
    pub fn new(config: &WorldConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            grid: Grid::new(config.width, config.height)?,
            generation: 0,
            species_count: config.species_count,
            rng,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn species_count(&self) -> u8 {
        self.species_count
    }

    /// Replace the grid with its next generation.
    pub fn advance(&mut self) -> Generation {
        self.grid = rules::next_generation(&self.grid, &mut self.rng);
        self.generation += 1;

        Generation {
            number: self.generation,
            grid: self.grid.clone(),
        }
    }

    /// Paint a single cell. Out-of-range coordinates are ignored and the
    /// species id is stored unchecked. Returns whether the edit was applied.
    pub fn edit_cell(&mut self, x: i64, y: i64, species: Species) -> bool {
        if !self.grid.contains(x, y) {
            trace!(x, y, "Ignoring edit outside the grid");
            return false;
        }
        self.grid.set(x as u32, y as u32, species).is_ok()
    }

    pub fn seed(&mut self, amount: u32) -> u32 {
        seeder::populate(&mut self.grid, amount, self.species_count, &mut self.rng)
    }
}

/// Clears the in-flight flag when the publishing task finishes, even if
/// the observer panics.
struct TickGuard(Arc<AtomicBool>);

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Hand a finished tick to the observer. A failed computation is logged and
/// publishes nothing; either way the guard releases the in-flight slot.
async fn publish(
    computation: JoinHandle<(Generation, Duration)>,
    observer: Arc<dyn GenerationObserver>,
    guard: TickGuard,
) {
    let _guard = guard;
    match computation.await {
        Ok((generation, elapsed)) => {
            trace!(
                generation = generation.number,
                elapsed_us = elapsed.as_micros() as u64,
                "Tick computed"
            );
            observer.on_generation_ready(generation);
        }
        Err(e) => {
            error!(error = %e, "Tick computation failed, nothing published");
        }
    }
}

/// Drives ticks on the tokio blocking pool and edits on the caller's thread
pub struct Simulation {
    state: Arc<Mutex<SimulationState>>,
    observer: Arc<dyn GenerationObserver>,
    tick_in_flight: Arc<AtomicBool>,
    runtime: Handle,
}

impl Simulation {
    /// Create a session with an all-dead grid. Must be called from within a
    /// tokio runtime.
    pub fn new(config: WorldConfig, observer: impl GenerationObserver) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::InvalidState(format!("no tokio runtime available: {}", e)))?;
        Self::with_handle(config, observer, runtime)
    }

    pub fn with_handle(
        config: WorldConfig,
        observer: impl GenerationObserver,
        runtime: Handle,
    ) -> Result<Self> {
        let state = SimulationState::new(&config)?;

        info!(
            width = config.width,
            height = config.height,
            species_count = config.species_count,
            seed = ?config.seed,
            "Created simulation"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            observer: Arc::new(observer),
            tick_in_flight: Arc::new(AtomicBool::new(false)),
            runtime,
        })
    }

    /// Schedule one generation in the background. Returns `false` without
    /// scheduling anything if a previous tick has not been published yet.
    #[instrument(skip(self))]
    pub fn request_tick(&self) -> bool {
        if self
            .tick_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Tick already in flight, dropping request");
            return false;
        }

        let guard = TickGuard(Arc::clone(&self.tick_in_flight));
        let state = Arc::clone(&self.state);
        let observer = Arc::clone(&self.observer);

        let computation = self.runtime.spawn_blocking(move || {
            let start = Instant::now();
            let generation = state.lock().advance();
            (generation, start.elapsed())
        });

        self.runtime.spawn(publish(computation, observer, guard));

        true
    }

    /// Advance one generation on the calling thread without publishing.
    pub fn step(&self) -> (Generation, Duration) {
        let start = Instant::now();
        let generation = self.state.lock().advance();
        (generation, start.elapsed())
    }

    /// Paint a single cell. Coordinates outside the grid are a silent no-op.
    pub fn edit_cell(&self, x: i64, y: i64, species: Species) -> bool {
        let applied = self.state.lock().edit_cell(x, y, species);
        if applied {
            trace!(x, y, species = species.0, "Edited cell");
        }
        applied
    }

    /// Bring up to `amount` dead cells to life; returns how many were created.
    pub fn seed(&self, amount: u32) -> u32 {
        self.state.lock().seed(amount)
    }

    /// Snapshot of the live grid
    pub fn current_grid(&self) -> Grid {
        self.state.lock().grid().clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation()
    }

    pub fn species_count(&self) -> u8 {
        self.state.lock().species_count()
    }

    pub fn is_tick_in_flight(&self) -> bool {
        self.tick_in_flight.load(Ordering::Acquire)
    }
}
