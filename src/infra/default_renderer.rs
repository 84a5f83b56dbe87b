use std::io::{self, Write};

use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::infra::Renderer;
use crate::learning::{AgentTrainingReport, RolloutReport, TrainingSummary};
use crate::state::{Grid, GridSnapshot};

/// Logs progress and, when `draw_board` is set, prints the board to stdout on every move.
pub struct DefaultRenderer {
    draw_board: bool,
}

impl DefaultRenderer {
    pub fn new(draw_board: bool) -> Self {
        Self { draw_board }
    }
}

impl Renderer for DefaultRenderer {
    fn on_training_started(&self, grid: &Grid, num_agents: usize, config: &TrainingConfig) {
        info!("Training started");
        info!("- grid: {}x{}", grid.length(), grid.width());
        info!("- agents: {}", num_agents);
        info!(
            "- episodes: {}, max steps: {}, learning rate: {}, discount factor: {}",
            config.num_episodes, config.max_steps, config.learning_rate, config.discount_factor
        );
    }

    fn on_agent_trained(&self, report: &AgentTrainingReport) {
        info!(
            "Agent {} trained: {} episodes, {} steps, goal reached {} times in {:.2}ms",
            report.agent_id,
            report.episodes.len(),
            report.total_steps,
            report.goals_reached,
            report.elapsed.as_secs_f64() * 1000.0
        );
    }

    fn on_training_finished(&self, summary: &TrainingSummary) {
        info!(
            "Training finished for {} agents in {:.2}ms (seed {})",
            summary.agents.len(),
            summary.elapsed.as_secs_f64() * 1000.0,
            summary.base_seed
        );
    }

    fn on_snapshot(&self, snapshot: &GridSnapshot) {
        if let Some(mover) = snapshot.mover {
            debug!("agent {} at step {}", mover, snapshot.steps_taken);
        }
        if self.draw_board {
            let _ = writeln!(io::stdout(), "{}", snapshot.draw_ascii_map());
        }
    }

    fn on_rollout_finished(&self, report: &RolloutReport) {
        info!(
            "Agent {} testing phase {} in {} steps",
            report.agent_id,
            report.outcome.as_str(),
            report.steps
        );
    }
}
