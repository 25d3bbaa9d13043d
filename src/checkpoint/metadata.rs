use serde::{Deserialize, Serialize};

use crate::game::Player;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Win rate against the random baseline.
    pub win_rate: f32,
    pub draw_rate: f32,
    pub average_game_length: f32,
    pub average_td_error: f32,
    pub table_states: usize,
    pub training_steps: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningHyperparameters {
    pub side: Player,
    pub learning_rate: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_start: f64,
    pub epsilon_decay: f64,
    #[serde(default)]
    pub epsilon_min: f64,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub algorithm: String,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: QLearningHyperparameters,
}

/// Q-learning training state written to training_state.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningTrainingState {
    pub side: Player,
    pub epsilon: f64,
    pub update_count: usize,
    pub learning_rate: f64,
    pub gamma: f64,
    pub epsilon_decay: f64,
    #[serde(default)]
    pub epsilon_min: f64,
}
