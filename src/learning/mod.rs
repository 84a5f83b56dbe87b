//! Tabular Q-learning shared by concurrent agents
//!
//! Every agent trains on its own worker thread against one shared value table. Once all
//! of them are done the learned policy is replayed per agent as an independent rollout.
//!
//! # Architecture
//!
//! ```text
//! Grid + TrainingConfig
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TrainingCoordinator                                        │
//! │  - Seeds the ValueTable (one row of 4 values per cell)      │
//! │  - One Agent per start cell, one thread per Agent           │
//! └─────────────────────────────────────────────────────────────┘
//!     │  ε-greedy steps, Bellman backup under the table lock
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Join barrier                                               │
//! │  - Every worker joined, TrainingSummary emitted             │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TestRunner                                                 │
//! │  - One tokio task per Agent, softmax over its table row     │
//! │  - GridSnapshot to the Renderer after every move            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod agent;
mod coordinator;
mod metrics;
mod pipeline;
mod policy;
mod test_runner;
mod value_table;

pub use agent::{Agent, GOAL_REWARD, STEP_COST, WALL_PENALTY, reward};
pub use coordinator::{TrainingCoordinator, TrainingOutcome};
pub use metrics::{
    AgentTrainingReport, EpisodeReport, MovingAverage, RolloutOutcome, RolloutReport,
    TrainingMetrics, TrainingSummary,
};
pub use pipeline::{TrainedRun, TrainingHandle, start_training};
pub use policy::{
    epsilon_greedy, exploration_rate, greedy, random_action, sample_cumulative, softmax,
    softmax_probabilities,
};
pub use test_runner::{Board, RolloutHandle, TestRunner, join_rollouts};
pub use value_table::{Backup, ValueRow, ValueTable};
