//! Training and rollout reports

use std::collections::VecDeque;
use std::time::Duration;

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window_size {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of one training episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeReport {
    pub agent_id: usize,
    /// 1-based episode number
    pub episode: usize,
    pub steps: usize,
    pub reached_goal: bool,
}

/// One agent's full training schedule
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTrainingReport {
    pub agent_id: usize,
    pub episodes: Vec<EpisodeReport>,
    pub total_steps: usize,
    pub goals_reached: usize,
    pub elapsed: Duration,
}

impl AgentTrainingReport {
    pub fn from_episodes(agent_id: usize, episodes: Vec<EpisodeReport>, elapsed: Duration) -> Self {
        let total_steps = episodes.iter().map(|e| e.steps).sum();
        let goals_reached = episodes.iter().filter(|e| e.reached_goal).count();
        Self {
            agent_id,
            episodes,
            total_steps,
            goals_reached,
            elapsed,
        }
    }
}

/// Metrics aggregated over every agent once training is done
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    /// Episode lengths
    pub episode_lengths: MovingAverage,
    /// Fraction of episodes that reached the goal
    pub goal_rate: MovingAverage,
    /// Episodes across all agents
    pub total_episodes: usize,
    /// Steps across all agents
    pub total_steps: usize,
    /// Wall-clock time of the training phase
    pub elapsed: Duration,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_lengths: MovingAverage::new(window_size),
            goal_rate: MovingAverage::new(window_size),
            total_episodes: 0,
            total_steps: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Record episode completion
    pub fn record_episode(&mut self, report: &EpisodeReport) {
        self.episode_lengths.push(report.steps as f64);
        self.goal_rate.push(if report.reached_goal { 1.0 } else { 0.0 });
        self.total_episodes += 1;
        self.total_steps += report.steps;
    }

    /// Windowed averages cover the last episodes of each agent, interleaved by episode number.
    pub fn from_reports(reports: &[AgentTrainingReport], elapsed: Duration, window_size: usize) -> Self {
        let mut metrics = Self::new(window_size);
        let longest = reports.iter().map(|r| r.episodes.len()).max().unwrap_or(0);
        for i in 0..longest {
            for report in reports {
                if let Some(episode) = report.episodes.get(i) {
                    metrics.record_episode(episode);
                }
            }
        }
        metrics.elapsed = elapsed;
        metrics
    }

    /// Get steps per second
    pub fn steps_per_second(&self) -> f64 {
        let duration = self.elapsed.as_secs_f64();
        if duration > 0.0 {
            self.total_steps as f64 / duration
        } else {
            0.0
        }
    }

    /// Log current metrics to console
    pub fn log_summary(&self) {
        tracing::info!(
            "Episodes {} | Steps {} | SPS {:.1} | Total execution time: {} milliseconds",
            self.total_episodes,
            self.total_steps,
            self.steps_per_second(),
            self.elapsed.as_millis()
        );
        tracing::info!(
            "  Recent episodes: length={:.1}, goal reached={:.1}%",
            self.episode_lengths.average(),
            self.goal_rate.average() * 100.0
        );
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Everything known once the training barrier has been passed
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub agents: Vec<AgentTrainingReport>,
    pub elapsed: Duration,
    pub base_seed: u64,
    pub metrics: TrainingMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    ReachedGoal,
    /// Stopped by the optional rollout step cap
    StepCapReached,
    /// The worker was aborted before reaching the goal
    Interrupted,
}

impl RolloutOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RolloutOutcome::ReachedGoal => "completed",
            RolloutOutcome::StepCapReached => "stopped at step cap",
            RolloutOutcome::Interrupted => "interrupted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutReport {
    pub agent_id: usize,
    pub steps: usize,
    pub outcome: RolloutOutcome,
}
