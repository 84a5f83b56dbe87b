use std::sync::{Arc, Mutex, mpsc};

use crate::config::TrainingConfig;
use crate::infra::Renderer;
use crate::learning::{
    AgentTrainingReport, EpisodeReport, RolloutOutcome, RolloutReport, TrainingSummary,
};
use crate::state::{Grid, GridSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogColor {
    White,
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub text: String,
    pub color: LogColor,
}

/// Hands events to another thread: the latest board goes into shared state, textual
/// progress goes over a channel. Meant for a UI loop that polls both.
pub struct ChannelRenderer {
    shared_state: Arc<Mutex<Option<GridSnapshot>>>,
    log_tx: mpsc::Sender<LogMessage>,
}

impl ChannelRenderer {
    pub fn new(
        shared_state: Arc<Mutex<Option<GridSnapshot>>>,
        log_tx: mpsc::Sender<LogMessage>,
    ) -> Self {
        Self {
            shared_state,
            log_tx,
        }
    }

    fn send_log(&self, text: String, color: LogColor) {
        let _ = self.log_tx.send(LogMessage { text, color });
    }
}

impl Renderer for ChannelRenderer {
    fn on_training_started(&self, grid: &Grid, num_agents: usize, _config: &TrainingConfig) {
        self.send_log(
            format!(
                "Training {} agents on {}x{} grid",
                num_agents,
                grid.length(),
                grid.width()
            ),
            LogColor::White,
        );
    }

    fn on_episode_finished(&self, report: &EpisodeReport) {
        self.send_log(
            format!(
                "Agent {} episode: {}, steps taken: {}",
                report.agent_id, report.episode, report.steps
            ),
            LogColor::White,
        );
    }

    fn on_agent_trained(&self, report: &AgentTrainingReport) {
        self.send_log(
            format!(
                "Agent {} done training ({} steps)",
                report.agent_id, report.total_steps
            ),
            LogColor::Green,
        );
    }

    fn on_training_finished(&self, summary: &TrainingSummary) {
        self.send_log(
            format!(
                "Training finished in {}ms",
                summary.elapsed.as_millis()
            ),
            LogColor::Green,
        );
    }

    fn on_snapshot(&self, snapshot: &GridSnapshot) {
        if let Ok(mut state) = self.shared_state.lock() {
            *state = Some(snapshot.clone());
        }
    }

    fn on_rollout_finished(&self, report: &RolloutReport) {
        let color = match report.outcome {
            RolloutOutcome::ReachedGoal => LogColor::Green,
            RolloutOutcome::StepCapReached => LogColor::Yellow,
            RolloutOutcome::Interrupted => LogColor::Red,
        };
        self.send_log(
            format!(
                "Agent {} testing phase {} in {} steps",
                report.agent_id,
                report.outcome.as_str(),
                report.steps
            ),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Position;

    #[test]
    fn test_snapshot_is_stored_for_polling() {
        let grid = Grid::from_codes(&[vec![2, 0, 3]]).unwrap();
        let shared = Arc::new(Mutex::new(None));
        let (tx, _rx) = mpsc::channel();
        let renderer = ChannelRenderer::new(Arc::clone(&shared), tx);

        let snapshot = GridSnapshot::capture(
            &grid,
            &[(0, Position::new(1, 0))],
            Some(0),
            1,
            &TrainingConfig::default(),
        );
        renderer.on_snapshot(&snapshot);

        let stored = shared.lock().unwrap().clone();
        assert_eq!(stored, Some(snapshot));
    }

    #[test]
    fn test_rollout_outcome_sets_color() {
        let (tx, rx) = mpsc::channel();
        let renderer = ChannelRenderer::new(Arc::new(Mutex::new(None)), tx);

        renderer.on_rollout_finished(&RolloutReport {
            agent_id: 0,
            steps: 5,
            outcome: RolloutOutcome::Interrupted,
        });

        let message = rx.try_recv().unwrap();
        assert_eq!(message.color, LogColor::Red);
        assert_eq!(message.text, "Agent 0 testing phase interrupted in 5 steps");
    }
}
