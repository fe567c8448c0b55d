use thiserror::Error;
use vsub_engine::VsubError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Engine(#[from] VsubError),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{failed} of {total} episodes failed to download")]
    EpisodesFailed { failed: usize, total: usize },
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
