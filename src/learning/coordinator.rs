//! Fan-out/fan-in of the training phase

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::infra::Renderer;
use crate::state::Grid;

use super::agent::Agent;
use super::metrics::AgentTrainingReport;
use super::value_table::ValueTable;

/// Trained agents handed back across the join barrier, in agent-id order.
pub struct TrainingOutcome {
    pub agents: Vec<Agent>,
    pub reports: Vec<AgentTrainingReport>,
    pub elapsed: Duration,
}

/// Owns the shared value table for one grid and trains one worker thread per agent on it.
pub struct TrainingCoordinator {
    grid: Arc<Grid>,
    table: Arc<ValueTable>,
    config: TrainingConfig,
    base_seed: u64,
    renderer: Arc<dyn Renderer>,
}

impl TrainingCoordinator {
    /// Builds the table for `grid` and fills it from `base_seed`.
    pub fn new(
        grid: Arc<Grid>,
        config: TrainingConfig,
        base_seed: u64,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let table = Arc::new(ValueTable::new());
        table.initialize(grid.cell_count(), base_seed);
        Self {
            grid,
            table,
            config,
            base_seed,
            renderer,
        }
    }

    pub fn table(&self) -> Arc<ValueTable> {
        Arc::clone(&self.table)
    }

    pub fn grid(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    /// Seed of agent `id`'s random source.
    pub fn agent_seed(&self, id: usize) -> u64 {
        self.base_seed.wrapping_add(1).wrapping_add(id as u64)
    }

    /// Creates agents `0..num_agents` on the grid's start cells, all sharing the table.
    pub fn spawn_agents(&self, num_agents: usize) -> Result<Vec<Agent>> {
        if num_agents == 0 {
            return Err(Error::NoAgents);
        }
        let available = self.grid.starts().len();
        if num_agents > available {
            return Err(Error::TooManyAgents {
                requested: num_agents,
                available,
            });
        }
        (0..num_agents)
            .map(|id| {
                Agent::new(
                    id,
                    Arc::clone(&self.grid),
                    Arc::clone(&self.table),
                    self.config.clone(),
                    self.agent_seed(id),
                )
            })
            .collect()
    }

    /// Trains every agent on its own thread and blocks until all of them are done.
    pub fn train_all(&self, agents: Vec<Agent>) -> Result<TrainingOutcome> {
        let start_time = Instant::now();
        let mut workers = Vec::with_capacity(agents.len());

        for mut agent in agents {
            let id = agent.id();
            let renderer = Arc::clone(&self.renderer);
            let worker = thread::Builder::new()
                .name(format!("train-agent-{}", id))
                .spawn(move || {
                    let report = agent.train(renderer.as_ref());
                    renderer.on_agent_trained(&report);
                    (agent, report)
                })
                .map_err(|e| Error::WorkerJoin {
                    message: format!("could not spawn worker for agent {}: {}", id, e),
                })?;
            workers.push((id, worker));
        }

        let mut trained = Vec::with_capacity(workers.len());
        let mut reports = Vec::with_capacity(workers.len());
        let mut failure = None;
        for (id, worker) in workers {
            match worker.join() {
                Ok((agent, report)) => {
                    trained.push(agent);
                    reports.push(report);
                }
                Err(_) => {
                    error!("Training worker for agent {} panicked", id);
                    failure.get_or_insert(Error::WorkerPanicked { agent_id: id });
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let elapsed = start_time.elapsed();
        info!(
            "All {} agents trained in {} milliseconds",
            trained.len(),
            elapsed.as_millis()
        );
        Ok(TrainingOutcome {
            agents: trained,
            reports,
            elapsed,
        })
    }
}
