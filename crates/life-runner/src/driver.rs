//! Headless driver: paces tick requests and consumes published generations.

use life_core::{RunnerConfig, Species};
use life_world::{Generation, Simulation};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generations: u64,
    pub dropped_requests: u64,
    pub final_population: usize,
    pub elapsed: Duration,
}

pub struct Driver {
    config: RunnerConfig,
    simulation: Simulation,
    generations: UnboundedReceiver<Generation>,
    published: u64,
    dropped_requests: u64,
    requested_at: Option<Instant>,
    last_report: Instant,
    last_report_generation: u64,
}

impl Driver {
    pub fn new(
        config: RunnerConfig,
        simulation: Simulation,
        generations: UnboundedReceiver<Generation>,
    ) -> Self {
        Self {
            config,
            simulation,
            generations,
            published: 0,
            dropped_requests: 0,
            requested_at: None,
            last_report: Instant::now(),
            last_report_generation: 0,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Paint the configured cells, then seed the initial random population.
    #[instrument(skip(self))]
    pub fn prepare(&self) -> u32 {
        let mut painted = 0;
        for cell in &self.config.initial_cells {
            if self
                .simulation
                .edit_cell(cell.x as i64, cell.y as i64, Species(cell.species))
            {
                painted += 1;
            } else {
                warn!(x = cell.x, y = cell.y, "Initial cell outside the grid, skipped");
            }
        }

        let requested = self.config.initial_population();
        let created = self.simulation.seed(requested);
        info!(painted, requested, created, "Prepared board");
        created
    }

    /// Run until `max_generations` have been published or `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> RunSummary {
        tokio::pin!(shutdown);

        let fps = self.config.effective_fps();
        let mut ticker = interval(Duration::from_secs_f64(1.0 / fps as f64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let started = Instant::now();
        self.last_report = started;
        info!(fps, max_generations = ?self.config.max_generations, "Simulation running");

        while !self.finished() {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                Some(generation) = self.generations.recv() => {
                    self.on_generation(&generation);
                    if self.finished() {
                        info!(generations = self.published, "Generation limit reached");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if !self.finished() {
                        self.request_tick();
                    }
                }
            }
        }

        RunSummary {
            generations: self.published,
            dropped_requests: self.dropped_requests,
            final_population: self.simulation.current_grid().population(),
            elapsed: started.elapsed(),
        }
    }

    fn finished(&self) -> bool {
        self.config
            .max_generations
            .is_some_and(|limit| self.published >= limit)
    }

    fn request_tick(&mut self) {
        if self.simulation.request_tick() {
            self.requested_at = Some(Instant::now());
        } else {
            self.dropped_requests += 1;
            debug!(dropped = self.dropped_requests, "Generation slower than tick interval");
            crate::record_counter!("tick_requests_dropped", 1);
        }
    }

    fn on_generation(&mut self, generation: &Generation) {
        self.published += 1;

        if let Some(requested_at) = self.requested_at.take() {
            crate::record_histogram!("tick_latency_seconds", requested_at.elapsed().as_secs_f64());
        }

        let interval = self.config.report_interval.max(1);
        if generation.number.is_multiple_of(interval) {
            self.report(generation);
        }
    }

    fn report(&mut self, generation: &Generation) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_report).as_secs_f64();
        let produced = generation.number.saturating_sub(self.last_report_generation);
        let rate = if elapsed > 0.0 { produced as f64 / elapsed } else { 0.0 };

        self.last_report = now;
        self.last_report_generation = generation.number;

        let counts = generation.grid.species_counts(self.simulation.species_count());
        info!(
            generation = generation.number,
            population = generation.grid.population(),
            generations_per_second = format!("{:.1}", rate),
            "Generation report"
        );
        crate::record_gauge!("generations_per_second", rate);
        for (id, count) in counts.iter().enumerate().skip(1) {
            crate::record_gauge!("species_population", *count as u64, species => id as u64);
        }
    }
}
