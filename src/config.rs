use std::path::Path;

use log::warn;

use crate::ai::{MinimaxConfig, QLearningConfig};
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::game::EnvConfig;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub env: EnvConfig,
    pub minimax: MinimaxConfig,
    pub qlearning: QLearningConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.env.illegal_move_penalty > 0.0 {
            return Err(ConfigError::Validation(
                "env.illegal_move_penalty must be <= 0".into(),
            ));
        }

        if self.minimax.depth == 0 {
            return Err(ConfigError::Validation(
                "minimax.depth must be >= 1".into(),
            ));
        }

        let q = &self.qlearning;
        if q.learning_rate <= 0.0 || q.learning_rate > 1.0 {
            return Err(ConfigError::Validation(
                "qlearning.learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.gamma) {
            return Err(ConfigError::Validation(
                "qlearning.gamma must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.epsilon) {
            return Err(ConfigError::Validation(
                "qlearning.epsilon must be in [0, 1]".into(),
            ));
        }
        if q.epsilon_decay <= 0.0 || q.epsilon_decay > 1.0 {
            return Err(ConfigError::Validation(
                "qlearning.epsilon_decay must be in (0, 1]".into(),
            ));
        }
        if q.epsilon_min < 0.0 || q.epsilon_min > q.epsilon {
            return Err(ConfigError::Validation(
                "qlearning.epsilon_min must be in [0, qlearning.epsilon]".into(),
            ));
        }

        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be >= 1".into(),
            ));
        }
        if self.training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be >= 1".into(),
            ));
        }

        if self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
