//! Action selection over one row of the value table

use rand::Rng;

use crate::config::TrainingConfig;
use crate::infra::{Action, NUM_ACTIONS};

use super::value_table::ValueRow;

/// Highest-valued action; the first one in scan order wins a tie.
pub fn greedy(row: &ValueRow) -> Action {
    let mut best = 0;
    for i in 1..NUM_ACTIONS {
        if row[i] > row[best] {
            best = i;
        }
    }
    Action::ALL[best]
}

/// Exploration rate after `steps_taken` steps of the current episode.
///
/// Grows linearly from `min_epsilon` at step 0 to `initial_epsilon` at `max_steps`.
pub fn exploration_rate(steps_taken: usize, config: &TrainingConfig) -> f64 {
    let epsilon = config.min_epsilon
        + (config.initial_epsilon - config.min_epsilon) * steps_taken as f64
            / config.max_steps as f64;
    epsilon.max(config.min_epsilon)
}

/// With probability `epsilon` a uniformly random action, otherwise [`greedy`].
pub fn epsilon_greedy<R: Rng + ?Sized>(row: &ValueRow, epsilon: f64, rng: &mut R) -> Action {
    if rng.random::<f64>() < epsilon {
        random_action(rng)
    } else {
        greedy(row)
    }
}

pub fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::ALL[rng.random_range(0..NUM_ACTIONS)]
}

/// `exp(q) / Σ exp(q)` for each action.
pub fn softmax_probabilities(row: &ValueRow) -> [f64; NUM_ACTIONS] {
    let weights = row.map(f64::exp);
    let sum: f64 = weights.iter().sum();
    weights.map(|w| w / sum)
}

/// Walks the cumulative distribution and returns the first action whose cumulative
/// probability exceeds `draw`, or `None` if rounding leaves the total short of it.
pub fn sample_cumulative(probabilities: &[f64; NUM_ACTIONS], draw: f64) -> Option<Action> {
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            return Some(Action::ALL[i]);
        }
    }
    None
}

/// Samples an action proportionally to `exp(q)`, falling back to a uniform choice when
/// the cumulative sum never reaches the draw.
pub fn softmax<R: Rng + ?Sized>(row: &ValueRow, rng: &mut R) -> Action {
    let probabilities = softmax_probabilities(row);
    let draw = rng.random::<f64>();
    match sample_cumulative(&probabilities, draw) {
        Some(action) => action,
        None => random_action(rng),
    }
}
