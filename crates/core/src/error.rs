use thiserror::Error;

use crate::duration::DurationError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Duration error: {0}")]
    Duration(#[from] DurationError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
