//! Train-then-test pipeline exposed to the outer shell

use std::sync::Arc;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::infra::Renderer;
use crate::state::{Grid, GridSnapshot};

use super::coordinator::TrainingCoordinator;
use super::metrics::{TrainingMetrics, TrainingSummary};
use super::test_runner::{RolloutHandle, TestRunner};
use super::value_table::ValueTable;

const METRICS_WINDOW: usize = 100;

/// Result of the training phase plus the rollout workers it started.
pub struct TrainedRun {
    pub summary: TrainingSummary,
    pub table: Arc<ValueTable>,
    pub rollouts: Vec<RolloutHandle>,
}

/// Handle on a running pipeline.
pub struct TrainingHandle {
    base_seed: u64,
    table: Arc<ValueTable>,
    task: JoinHandle<Result<TrainedRun>>,
}

impl TrainingHandle {
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// The shared table, for read-only display while training runs.
    pub fn table(&self) -> Arc<ValueTable> {
        Arc::clone(&self.table)
    }

    pub fn is_trained(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the training barrier. Rollouts are already running when this returns.
    pub async fn trained(self) -> Result<TrainedRun> {
        self.task.await.map_err(|e| Error::WorkerJoin {
            message: e.to_string(),
        })?
    }
}

/// Starts training `num_agents` agents on `grid` and returns immediately.
///
/// Fails with [`Error::NoRuntime`] outside a tokio runtime. Once every agent has finished
/// its episodes the test rollouts are launched without waiting on each other or on the caller.
pub fn start_training(
    grid: Grid,
    num_agents: usize,
    config: TrainingConfig,
    renderer: Arc<dyn Renderer>,
) -> Result<TrainingHandle> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|e| Error::NoRuntime {
        message: e.to_string(),
    })?;
    config.validate()?;
    if grid.starts().is_empty() {
        return Err(Error::NoStartCells);
    }

    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        "Starting {} agents on {}x{} grid (seed {})",
        num_agents,
        grid.length(),
        grid.width(),
        base_seed
    );

    let grid = Arc::new(grid);
    let coordinator = TrainingCoordinator::new(
        Arc::clone(&grid),
        config.clone(),
        base_seed,
        Arc::clone(&renderer),
    );
    let agents = coordinator.spawn_agents(num_agents)?;
    let table = coordinator.table();

    renderer.on_snapshot(&GridSnapshot::empty(&grid));
    renderer.on_training_started(&grid, num_agents, &config);

    let task_table = Arc::clone(&table);
    let task = runtime.spawn(async move {
        let outcome = tokio::task::spawn_blocking(move || coordinator.train_all(agents))
            .await
            .map_err(|e| Error::WorkerJoin {
                message: e.to_string(),
            })??;

        let metrics =
            TrainingMetrics::from_reports(&outcome.reports, outcome.elapsed, METRICS_WINDOW);
        metrics.log_summary();
        let summary = TrainingSummary {
            agents: outcome.reports,
            elapsed: outcome.elapsed,
            base_seed,
            metrics,
        };
        renderer.on_training_finished(&summary);

        let runner = TestRunner::new(grid, config, renderer);
        let rollouts = runner.launch(outcome.agents);
        Ok::<_, Error>(TrainedRun {
            summary,
            table: task_table,
            rollouts,
        })
    });

    Ok(TrainingHandle {
        base_seed,
        table,
        task,
    })
}
