//! A single learner bound to one start cell

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::infra::{Action, Position, Renderer};
use crate::state::{AgentPhase, AgentState, Cell, Grid};

use super::metrics::{AgentTrainingReport, EpisodeReport};
use super::policy;
use super::value_table::ValueTable;

pub const GOAL_REWARD: f64 = 100.0;
pub const WALL_PENALTY: f64 = -10.0;
pub const STEP_COST: f64 = -1.0;

/// Reward for arriving on `cell`.
pub fn reward(cell: &Cell) -> f64 {
    if cell.is_goal() {
        GOAL_REWARD
    } else if cell.is_wall() {
        WALL_PENALTY
    } else {
        STEP_COST
    }
}

/// Owns its position, step counter and random source; shares the value table.
pub struct Agent {
    state: AgentState,
    start: Position,
    grid: Arc<Grid>,
    table: Arc<ValueTable>,
    config: TrainingConfig,
    rng: StdRng,
}

impl Agent {
    /// Agent `id` starting on the grid's `id`-th start cell.
    pub fn new(
        id: usize,
        grid: Arc<Grid>,
        table: Arc<ValueTable>,
        config: TrainingConfig,
        seed: u64,
    ) -> Result<Self> {
        let start = *grid.starts().get(id).ok_or(Error::TooManyAgents {
            requested: id + 1,
            available: grid.starts().len(),
        })?;
        Self::with_start(id, start, grid, table, config, seed)
    }

    /// Initializes `table` for `grid` if it is still empty and rejects a table sized for
    /// another grid.
    pub fn with_start(
        id: usize,
        start: Position,
        grid: Arc<Grid>,
        table: Arc<ValueTable>,
        config: TrainingConfig,
        seed: u64,
    ) -> Result<Self> {
        debug_assert!(grid.contains(start));
        table.initialize(grid.cell_count(), seed);
        if table.len() != grid.cell_count() {
            return Err(Error::TableSizeMismatch {
                expected: grid.cell_count(),
                got: table.len(),
            });
        }
        Ok(Self {
            state: AgentState::new(id, start),
            start,
            grid,
            table,
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn id(&self) -> usize {
        self.state.id
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn steps_taken(&self) -> usize {
        self.state.steps_taken
    }

    pub fn episode(&self) -> usize {
        self.state.episode
    }

    pub fn phase(&self) -> AgentPhase {
        self.state.phase
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn at_goal(&self) -> bool {
        self.state.position == self.grid.goal()
    }

    pub fn exploration_rate(&self) -> f64 {
        policy::exploration_rate(self.state.steps_taken, &self.config)
    }

    /// One epsilon-greedy step with its Bellman backup. Returns the new position.
    ///
    /// The reward is judged on the proposed cell before the wall check decides whether the
    /// agent actually moves there.
    pub fn train_step(&mut self) -> Position {
        let position = self.state.position;
        let cell = self.grid.index(position);
        let epsilon = self.exploration_rate();
        let action = policy::epsilon_greedy(&self.table.row(cell), epsilon, &mut self.rng);

        let proposed = self.grid.step(position, action);
        let target = *self.grid.cell(proposed);
        let reward = reward(&target);
        self.table.backup(
            cell,
            action,
            self.grid.index(proposed),
            reward,
            self.config.learning_rate,
            self.config.discount_factor,
        );

        if !target.is_wall() {
            self.state.position = proposed;
        }
        self.state.steps_taken += 1;
        self.state.position
    }

    /// Runs one episode from the start cell until the goal or the step cap.
    pub fn train_episode(&mut self) -> EpisodeReport {
        self.state.episode += 1;
        self.state.reset(self.start);

        while !self.at_goal() && self.state.steps_taken < self.config.max_steps {
            self.train_step();
        }

        let report = EpisodeReport {
            agent_id: self.state.id,
            episode: self.state.episode,
            steps: self.state.steps_taken,
            reached_goal: self.at_goal(),
        };
        debug!(
            "Agent {} episode: {}, steps taken: {}",
            report.agent_id, report.episode, report.steps
        );
        report
    }

    /// Runs the full training schedule, reporting each episode to `renderer`.
    pub fn train(&mut self, renderer: &dyn Renderer) -> AgentTrainingReport {
        if !self.state.advance_to(AgentPhase::Training) {
            warn!(
                "Agent {} asked to train while {:?}",
                self.state.id, self.state.phase
            );
        }

        let start_time = Instant::now();
        let mut episodes = Vec::with_capacity(self.config.num_episodes);
        while self.state.episode < self.config.num_episodes {
            let report = self.train_episode();
            renderer.on_episode_finished(&report);
            episodes.push(report);
        }
        let elapsed = start_time.elapsed();

        info!(
            "Agent {} total execution time: {} milliseconds",
            self.state.id,
            elapsed.as_millis()
        );
        AgentTrainingReport::from_episodes(self.state.id, episodes, elapsed)
    }

    /// Puts the agent back on its start cell for the test rollout.
    pub fn begin_testing(&mut self) {
        if !self.state.advance_to(AgentPhase::Testing) {
            warn!(
                "Agent {} entering testing from {:?}",
                self.state.id, self.state.phase
            );
            self.state.phase = AgentPhase::Testing;
        }
        self.state.reset(self.start);
    }

    /// One softmax step of the test rollout. The agent always takes the returned cell.
    pub fn rollout_step(&mut self) -> Position {
        let cell = self.grid.index(self.state.position);
        let action: Action = policy::softmax(&self.table.row(cell), &mut self.rng);
        let next = self.grid.step(self.state.position, action);
        debug!(
            "Agent {} takes action {}, next position: ({}, {})",
            self.state.id,
            action.as_str(),
            next.x,
            next.y
        );
        self.state.position = next;
        self.state.steps_taken += 1;
        next
    }

    pub fn finish(&mut self) {
        self.state.advance_to(AgentPhase::Done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::{RolloutReport, TrainingSummary};
    use crate::state::GridSnapshot;

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn on_episode_finished(&self, _report: &EpisodeReport) {}
        fn on_training_finished(&self, _summary: &TrainingSummary) {}
        fn on_snapshot(&self, _snapshot: &GridSnapshot) {}
        fn on_rollout_finished(&self, _report: &RolloutReport) {}
    }

    /// 10x10 with a wall border, start (1,1), goal (8,8), free interior.
    fn open_room() -> Arc<Grid> {
        let mut rows = vec![vec![0; 10]; 10];
        for i in 0..10 {
            rows[0][i] = 1;
            rows[9][i] = 1;
            rows[i][0] = 1;
            rows[i][9] = 1;
        }
        rows[1][1] = 2;
        rows[8][8] = 3;
        Arc::new(Grid::from_codes(&rows).unwrap())
    }

    fn table_for(grid: &Grid, seed: u64) -> Arc<ValueTable> {
        let table = Arc::new(ValueTable::new());
        table.initialize(grid.cell_count(), seed);
        table
    }

    #[test]
    fn test_reward_model() {
        let goal = Cell { x: 0, y: 0, kind: crate::state::CellKind::Goal };
        let wall = Cell { x: 0, y: 0, kind: crate::state::CellKind::Wall };
        let free = Cell { x: 0, y: 0, kind: crate::state::CellKind::Free };
        let start = Cell { x: 0, y: 0, kind: crate::state::CellKind::Start };
        assert_eq!(reward(&goal), 100.0);
        assert_eq!(reward(&wall), -10.0);
        assert_eq!(reward(&free), -1.0);
        assert_eq!(reward(&start), -1.0);
    }

    #[test]
    fn test_new_rejects_missing_start() {
        let grid = open_room();
        let table = table_for(&grid, 0);
        let result = Agent::new(1, grid, table, TrainingConfig::default(), 0);
        assert!(matches!(
            result,
            Err(Error::TooManyAgents { requested: 2, available: 1 })
        ));
    }

    #[test]
    fn test_episode_at_goal_terminates_immediately() {
        let grid = open_room();
        let table = table_for(&grid, 0);
        let before = table.snapshot();
        let mut agent = Agent::with_start(
            0,
            grid.goal(),
            Arc::clone(&grid),
            Arc::clone(&table),
            TrainingConfig::default(),
            1,
        )
        .unwrap();

        let report = agent.train_episode();
        assert_eq!(report.steps, 0);
        assert!(report.reached_goal);
        assert_eq!(agent.steps_taken(), 0);
        assert_eq!(table.snapshot(), before);
    }

    #[test]
    fn test_new_initializes_empty_table() {
        let grid = open_room();
        let table = Arc::new(ValueTable::new());
        let mut agent =
            Agent::new(0, Arc::clone(&grid), Arc::clone(&table), TrainingConfig::default(), 3)
                .unwrap();
        assert_eq!(table.len(), grid.cell_count());
        agent.train_step();
    }

    #[test]
    fn test_new_rejects_table_sized_for_another_grid() {
        let grid = open_room();
        let table = Arc::new(ValueTable::new());
        table.initialize(3, 0);
        let result = Agent::new(0, grid, Arc::clone(&table), TrainingConfig::default(), 0);
        assert!(matches!(
            result,
            Err(Error::TableSizeMismatch { expected: 100, got: 3 })
        ));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_episode_respects_step_cap() {
        let grid = open_room();
        let table = table_for(&grid, 0);
        let config = TrainingConfig {
            max_steps: 5,
            ..TrainingConfig::default()
        };
        let mut agent = Agent::new(0, grid, table, config, 1).unwrap();
        let report = agent.train_episode();
        assert!(report.steps <= 5);
        assert_eq!(report.reached_goal, agent.at_goal());
        if !report.reached_goal {
            assert_eq!(report.steps, 5);
        }
    }

    #[test]
    fn test_train_step_stays_on_open_cells() {
        let grid = open_room();
        let table = table_for(&grid, 2);
        let mut agent = Agent::new(0, Arc::clone(&grid), table, TrainingConfig::default(), 3).unwrap();
        for _ in 0..500 {
            let pos = agent.train_step();
            assert!(grid.contains(pos));
            assert!(!grid.cell(pos).is_wall());
        }
    }

    #[test]
    fn test_train_step_changes_exactly_one_entry() {
        let grid = open_room();
        let table = table_for(&grid, 4);
        let mut agent =
            Agent::new(0, Arc::clone(&grid), Arc::clone(&table), TrainingConfig::default(), 5)
                .unwrap();
        let before = table.snapshot();
        let cell = grid.index(agent.position());
        agent.train_step();
        let after = table.snapshot();

        let changed: Vec<(usize, usize)> = (0..before.len())
            .flat_map(|c| (0..4).map(move |a| (c, a)))
            .filter(|&(c, a)| before[c][a].to_bits() != after[c][a].to_bits())
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, cell);
    }

    #[test]
    fn test_training_learns_to_avoid_walls() {
        let grid = open_room();
        let table = table_for(&grid, 2024);
        let config = TrainingConfig {
            seed: Some(2024),
            ..TrainingConfig::default()
        };
        let mut agent =
            Agent::new(0, Arc::clone(&grid), Arc::clone(&table), config, 2025).unwrap();

        let report = agent.train(&NullRenderer);
        assert_eq!(report.episodes.len(), 120);
        assert_eq!(agent.episode(), 120);
        assert_eq!(agent.phase(), AgentPhase::Training);

        let start = grid.index(grid.starts()[0]);
        let best = table.best_action(start);
        let best_value = table.max_value(start);
        assert!(best != Action::Up && best != Action::Left);
        assert!(best_value > table.value(start, Action::Up));
        assert!(best_value > table.value(start, Action::Left));
        assert!(report.goals_reached > 0);
    }

    #[test]
    fn test_rollout_reaches_goal_after_training() {
        let grid = open_room();
        let table = table_for(&grid, 7);
        let mut agent =
            Agent::new(0, Arc::clone(&grid), table, TrainingConfig::default(), 8).unwrap();
        agent.train(&NullRenderer);

        agent.begin_testing();
        assert_eq!(agent.phase(), AgentPhase::Testing);
        assert_eq!(agent.position(), grid.starts()[0]);
        let mut steps = 0;
        while !agent.at_goal() && steps < 10_000 {
            let pos = agent.rollout_step();
            assert!(!grid.cell(pos).is_wall());
            steps += 1;
        }
        assert!(agent.at_goal());
        assert_eq!(agent.steps_taken(), steps);
        agent.finish();
        assert_eq!(agent.phase(), AgentPhase::Done);
    }
}
