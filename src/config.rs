use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Parameters of a training session. `Default` reproduces the classic setup.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Exploration rate reached at `max_steps`
    pub initial_epsilon: f64,
    /// Exploration rate at the first step of an episode
    pub min_epsilon: f64,
    /// Step cap for a training episode
    pub max_steps: usize,
    /// Training episodes per agent
    pub num_episodes: usize,
    /// Base seed; drawn at random and logged when absent
    pub seed: Option<u64>,
    /// Pause before each rollout snapshot
    pub step_delay: Duration,
    /// Optional safety cap on rollout length. Unbounded when `None`.
    pub rollout_step_cap: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            discount_factor: 0.9,
            initial_epsilon: 1.0,
            min_epsilon: 0.01,
            max_steps: 1000,
            num_episodes: 120,
            seed: None,
            step_delay: Duration::from_millis(100),
            rollout_step_cap: None,
        }
    }
}

pub const ENV_LEARNING_RATE: &str = "QMAZE_LEARNING_RATE";
pub const ENV_DISCOUNT_FACTOR: &str = "QMAZE_DISCOUNT_FACTOR";
pub const ENV_INITIAL_EPSILON: &str = "QMAZE_INITIAL_EPSILON";
pub const ENV_MIN_EPSILON: &str = "QMAZE_MIN_EPSILON";
pub const ENV_MAX_STEPS: &str = "QMAZE_MAX_STEPS";
pub const ENV_EPISODES: &str = "QMAZE_EPISODES";
pub const ENV_SEED: &str = "QMAZE_SEED";
pub const ENV_STEP_DELAY_MS: &str = "QMAZE_STEP_DELAY_MS";
pub const ENV_ROLLOUT_STEP_CAP: &str = "QMAZE_ROLLOUT_STEP_CAP";

impl TrainingConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            learning_rate: parse_or(&lookup, ENV_LEARNING_RATE, defaults.learning_rate)?,
            discount_factor: parse_or(&lookup, ENV_DISCOUNT_FACTOR, defaults.discount_factor)?,
            initial_epsilon: parse_or(&lookup, ENV_INITIAL_EPSILON, defaults.initial_epsilon)?,
            min_epsilon: parse_or(&lookup, ENV_MIN_EPSILON, defaults.min_epsilon)?,
            max_steps: parse_or(&lookup, ENV_MAX_STEPS, defaults.max_steps)?,
            num_episodes: parse_or(&lookup, ENV_EPISODES, defaults.num_episodes)?,
            seed: parse_opt(&lookup, ENV_SEED)?,
            step_delay: parse_opt(&lookup, ENV_STEP_DELAY_MS)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.step_delay),
            rollout_step_cap: parse_opt(&lookup, ENV_ROLLOUT_STEP_CAP)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(invalid(ENV_LEARNING_RATE, "must be in (0, 1]"));
        }
        if !(0.0..1.0).contains(&self.discount_factor) {
            return Err(invalid(ENV_DISCOUNT_FACTOR, "must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.initial_epsilon) {
            return Err(invalid(ENV_INITIAL_EPSILON, "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.min_epsilon) || self.min_epsilon > self.initial_epsilon {
            return Err(invalid(
                ENV_MIN_EPSILON,
                "must be in [0, 1] and not above the initial epsilon",
            ));
        }
        if self.max_steps == 0 {
            return Err(invalid(ENV_MAX_STEPS, "must be positive"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(key, &format!("cannot parse '{}'", raw))),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
