use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that can occur while saving or loading a learned value table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to access value table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse value table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("value table error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("{agent} selected illegal action {action} (legal: {legal:?})")]
    IllegalAction {
        agent: String,
        action: usize,
        legal: Vec<usize>,
    },

    #[error("{agent} returned no move although legal moves exist")]
    NoMove { agent: String },

    #[error("game should be terminal but has no outcome")]
    MissingOutcome,

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
