//! Error type shared by task construction and episode stepping.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("invalid task configuration: {0}")]
    InvalidConfig(String),

    #[error("action {action} is outside the action space of size {size}")]
    InvalidAction { action: usize, size: usize },

    #[error("step called before reset")]
    NotReset,

    #[error("cannot step in a terminated episode ({length} decisions already made)")]
    EpisodeFinished { length: usize },

    #[error("unknown task id: {0}")]
    UnknownTask(String),
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
