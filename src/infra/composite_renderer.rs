use std::sync::Arc;

use crate::config::TrainingConfig;
use crate::infra::Renderer;
use crate::learning::{AgentTrainingReport, EpisodeReport, RolloutReport, TrainingSummary};
use crate::state::{Grid, GridSnapshot};

/// Forwards every event to each wrapped renderer in order.
pub struct CompositeRenderer {
    renderers: Vec<Arc<dyn Renderer>>,
}

impl CompositeRenderer {
    pub fn new(renderers: Vec<Arc<dyn Renderer>>) -> Self {
        Self { renderers }
    }
}

impl Renderer for CompositeRenderer {
    fn on_training_started(&self, grid: &Grid, num_agents: usize, config: &TrainingConfig) {
        for renderer in &self.renderers {
            renderer.on_training_started(grid, num_agents, config);
        }
    }

    fn on_episode_finished(&self, report: &EpisodeReport) {
        for renderer in &self.renderers {
            renderer.on_episode_finished(report);
        }
    }

    fn on_agent_trained(&self, report: &AgentTrainingReport) {
        for renderer in &self.renderers {
            renderer.on_agent_trained(report);
        }
    }

    fn on_training_finished(&self, summary: &TrainingSummary) {
        for renderer in &self.renderers {
            renderer.on_training_finished(summary);
        }
    }

    fn on_snapshot(&self, snapshot: &GridSnapshot) {
        for renderer in &self.renderers {
            renderer.on_snapshot(snapshot);
        }
    }

    fn on_rollout_finished(&self, report: &RolloutReport) {
        for renderer in &self.renderers {
            renderer.on_rollout_finished(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ChannelRenderer;
    use crate::learning::RolloutOutcome;
    use std::sync::{Mutex, mpsc};

    #[test]
    fn test_composite_fans_out_to_all() {
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        let a: Arc<dyn Renderer> = Arc::new(ChannelRenderer::new(Arc::new(Mutex::new(None)), tx_a));
        let b: Arc<dyn Renderer> = Arc::new(ChannelRenderer::new(Arc::new(Mutex::new(None)), tx_b));
        let composite = CompositeRenderer::new(vec![a, b]);

        composite.on_rollout_finished(&RolloutReport {
            agent_id: 1,
            steps: 12,
            outcome: RolloutOutcome::ReachedGoal,
        });

        assert!(rx_a.try_recv().unwrap().text.contains("12 steps"));
        assert!(rx_b.try_recv().unwrap().text.contains("12 steps"));
    }
}
