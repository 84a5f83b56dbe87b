use crate::config::TrainingConfig;
use crate::learning::{AgentTrainingReport, EpisodeReport, RolloutReport, TrainingSummary};
use crate::state::{Grid, GridSnapshot};

/// Sink for training progress and rollout snapshots. Never read back by the learner.
///
/// Hooks are called concurrently from every agent's worker, hence `&self` and `Sync`.
pub trait Renderer: Send + Sync {
    /// Called once before any worker starts
    fn on_training_started(&self, _grid: &Grid, _num_agents: usize, _config: &TrainingConfig) {}

    /// Called by a training worker after each of its episodes
    fn on_episode_finished(&self, _report: &EpisodeReport) {}

    /// Called by a training worker when its whole schedule is done
    fn on_agent_trained(&self, _report: &AgentTrainingReport) {}

    /// Called once after the training barrier
    fn on_training_finished(&self, summary: &TrainingSummary);

    /// Called with the board after every rollout move
    fn on_snapshot(&self, snapshot: &GridSnapshot);

    /// Called when a rollout ends, however it ends
    fn on_rollout_finished(&self, report: &RolloutReport);
}
