//! Stage runtime errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// The OS refused to create the worker thread. Fatal for the stage.
    #[error("failed to spawn stage worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Stage names must fit the OS thread-name limit.
    #[error("stage name `{name}` exceeds {limit} bytes")]
    NameTooLong { name: String, limit: usize },
}
