//! Replay of learned policies after training

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info, warn};

use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::infra::{Position, Renderer};
use crate::state::{Grid, GridSnapshot};

use super::agent::Agent;
use super::metrics::{RolloutOutcome, RolloutReport};

/// Where every testing agent currently stands. Shared by all rollout workers so each
/// snapshot shows the whole board.
#[derive(Debug, Clone, Default)]
pub struct Board {
    positions: Arc<Mutex<BTreeMap<usize, Position>>>,
}

impl Board {
    pub fn place(&self, agent_id: usize, position: Position) {
        self.positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(agent_id, position);
    }

    /// Positions ordered by agent id.
    pub fn positions(&self) -> Vec<(usize, Position)> {
        self.positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, pos)| (*id, *pos))
            .collect()
    }
}

/// Completion signal for one rollout worker.
pub struct RolloutHandle {
    agent_id: usize,
    steps: Arc<AtomicUsize>,
    renderer: Arc<dyn Renderer>,
    handle: JoinHandle<RolloutReport>,
}

impl RolloutHandle {
    pub fn agent_id(&self) -> usize {
        self.agent_id
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    /// Waits for the worker. An aborted worker yields an `Interrupted` report.
    pub async fn finished(self) -> Result<RolloutReport> {
        match self.handle.await {
            Ok(report) => Ok(report),
            Err(err) if err.is_cancelled() => {
                let report = RolloutReport {
                    agent_id: self.agent_id,
                    steps: self.steps.load(Ordering::Relaxed),
                    outcome: RolloutOutcome::Interrupted,
                };
                warn!(
                    "Rollout for agent {} interrupted after {} steps",
                    report.agent_id, report.steps
                );
                self.renderer.on_rollout_finished(&report);
                Ok(report)
            }
            Err(err) => {
                error!("Rollout worker for agent {} failed: {}", self.agent_id, err);
                Err(Error::WorkerPanicked {
                    agent_id: self.agent_id,
                })
            }
        }
    }
}

/// Waits for every rollout in turn.
pub async fn join_rollouts(rollouts: Vec<RolloutHandle>) -> Result<Vec<RolloutReport>> {
    let mut reports = Vec::with_capacity(rollouts.len());
    for rollout in rollouts {
        reports.push(rollout.finished().await?);
    }
    Ok(reports)
}

/// Starts one independent rollout worker per trained agent.
pub struct TestRunner {
    grid: Arc<Grid>,
    config: TrainingConfig,
    renderer: Arc<dyn Renderer>,
    board: Board,
}

impl TestRunner {
    pub fn new(grid: Arc<Grid>, config: TrainingConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            grid,
            config,
            renderer,
            board: Board::default(),
        }
    }

    pub fn board(&self) -> Board {
        self.board.clone()
    }

    /// Spawns the workers on the current tokio runtime and returns without waiting.
    pub fn launch(&self, agents: Vec<Agent>) -> Vec<RolloutHandle> {
        agents
            .into_iter()
            .map(|agent| {
                let agent_id = agent.id();
                let steps = Arc::new(AtomicUsize::new(0));
                let worker = RolloutWorker {
                    agent,
                    grid: Arc::clone(&self.grid),
                    config: self.config.clone(),
                    renderer: Arc::clone(&self.renderer),
                    board: self.board.clone(),
                    steps: Arc::clone(&steps),
                };
                RolloutHandle {
                    agent_id,
                    steps,
                    renderer: Arc::clone(&self.renderer),
                    handle: tokio::spawn(worker.run()),
                }
            })
            .collect()
    }
}

struct RolloutWorker {
    agent: Agent,
    grid: Arc<Grid>,
    config: TrainingConfig,
    renderer: Arc<dyn Renderer>,
    board: Board,
    steps: Arc<AtomicUsize>,
}

impl RolloutWorker {
    async fn run(mut self) -> RolloutReport {
        let id = self.agent.id();
        self.agent.begin_testing();
        self.board.place(id, self.agent.position());

        let mut outcome = RolloutOutcome::ReachedGoal;
        while !self.agent.at_goal() {
            if let Some(cap) = self.config.rollout_step_cap
                && self.agent.steps_taken() >= cap
            {
                outcome = RolloutOutcome::StepCapReached;
                break;
            }

            let next = self.agent.rollout_step();
            self.board.place(id, next);
            self.steps.store(self.agent.steps_taken(), Ordering::Relaxed);

            if self.config.step_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.config.step_delay).await;
            }

            let snapshot = GridSnapshot::capture(
                &self.grid,
                &self.board.positions(),
                Some(id),
                self.agent.steps_taken(),
                &self.config,
            );
            self.renderer.on_snapshot(&snapshot);
        }

        if outcome == RolloutOutcome::ReachedGoal {
            self.agent.finish();
            info!(
                "Agent {} testing phase completed in {} steps",
                id,
                self.agent.steps_taken()
            );
        } else {
            warn!(
                "Agent {} rollout stopped at the step cap of {} steps",
                id,
                self.agent.steps_taken()
            );
        }

        let report = RolloutReport {
            agent_id: id,
            steps: self.agent.steps_taken(),
            outcome,
        };
        self.renderer.on_rollout_finished(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::{EpisodeReport, TrainingSummary, ValueTable};
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        snapshots: Mutex<Vec<GridSnapshot>>,
        finished: Mutex<Vec<RolloutReport>>,
    }

    impl Renderer for Recorder {
        fn on_episode_finished(&self, _report: &EpisodeReport) {}
        fn on_training_finished(&self, _summary: &TrainingSummary) {}
        fn on_snapshot(&self, snapshot: &GridSnapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }
        fn on_rollout_finished(&self, report: &RolloutReport) {
            self.finished.lock().unwrap().push(*report);
        }
    }

    fn corridor() -> Arc<Grid> {
        Arc::new(Grid::from_codes(&[vec![1, 1, 1, 1, 1], vec![1, 2, 0, 3, 1], vec![1, 1, 1, 1, 1]]).unwrap())
    }

    /// A table that makes moving right overwhelmingly likely everywhere.
    fn rightward_table(grid: &Grid) -> Arc<ValueTable> {
        let table = Arc::new(ValueTable::new());
        table.initialize(grid.cell_count(), 0);
        for cell in 0..grid.cell_count() {
            for action in crate::infra::Action::ALL {
                table.update(cell, action, -50.0);
            }
            table.update(cell, crate::infra::Action::Right, 50.0);
        }
        table
    }

    fn headless_config() -> TrainingConfig {
        TrainingConfig {
            step_delay: Duration::ZERO,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_board_orders_by_agent() {
        let board = Board::default();
        board.place(2, Position::new(3, 3));
        board.place(0, Position::new(1, 1));
        board.place(2, Position::new(4, 3));
        assert_eq!(
            board.positions(),
            vec![(0, Position::new(1, 1)), (2, Position::new(4, 3))]
        );
    }

    #[tokio::test]
    async fn test_rollout_reaches_goal_and_emits_snapshots() {
        let grid = corridor();
        let table = rightward_table(&grid);
        let recorder = Arc::new(Recorder::default());
        let config = headless_config();
        let agent = Agent::new(0, Arc::clone(&grid), table, config.clone(), 1).unwrap();

        let runner = TestRunner::new(Arc::clone(&grid), config, recorder.clone());
        let handles = runner.launch(vec![agent]);
        let reports = join_rollouts(handles).await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, RolloutOutcome::ReachedGoal);
        assert_eq!(reports[0].steps, 2);

        let snapshots = recorder.snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].agents, vec![(0, grid.goal())]);
        assert_eq!(snapshots[1].steps_taken, 2);
        assert_eq!(snapshots[1].num_episodes, 120);
        assert_eq!(recorder.finished.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_step_cap_stops_unbounded_rollout() {
        let grid = corridor();
        let table = Arc::new(ValueTable::new());
        table.initialize(grid.cell_count(), 0);
        for cell in 0..grid.cell_count() {
            for action in crate::infra::Action::ALL {
                table.update(cell, action, -50.0);
            }
            // Always push into the left wall.
            table.update(cell, crate::infra::Action::Left, 50.0);
        }
        let config = TrainingConfig {
            rollout_step_cap: Some(25),
            ..headless_config()
        };
        let agent = Agent::new(0, Arc::clone(&grid), table, config.clone(), 1).unwrap();
        let runner = TestRunner::new(grid, config, Arc::new(Recorder::default()));

        let reports = join_rollouts(runner.launch(vec![agent])).await.unwrap();
        assert_eq!(reports[0].outcome, RolloutOutcome::StepCapReached);
        assert_eq!(reports[0].steps, 25);
    }

    #[tokio::test]
    async fn test_abort_reports_interrupted() {
        let grid = corridor();
        let table = Arc::new(ValueTable::new());
        table.initialize(grid.cell_count(), 0);
        for cell in 0..grid.cell_count() {
            for action in crate::infra::Action::ALL {
                table.update(cell, action, -50.0);
            }
            table.update(cell, crate::infra::Action::Left, 50.0);
        }
        let before = table.snapshot();
        let config = TrainingConfig {
            step_delay: Duration::from_millis(5),
            ..TrainingConfig::default()
        };
        let agent =
            Agent::new(0, Arc::clone(&grid), Arc::clone(&table), config.clone(), 1).unwrap();
        let recorder = Arc::new(Recorder::default());
        let runner = TestRunner::new(grid, config, recorder.clone());

        let handle = runner.launch(vec![agent]).remove(0);
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.abort();
        let report = handle.finished().await.unwrap();

        assert_eq!(report.outcome, RolloutOutcome::Interrupted);
        assert_eq!(recorder.finished.lock().unwrap()[0].outcome, RolloutOutcome::Interrupted);
        assert_eq!(table.snapshot(), before);
    }
}
