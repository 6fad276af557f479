use msr_dataset::DatasetOpenError;
use msr_inventory::BufferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("reactor configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetOpenError),

    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("reactor has not been activated")]
    NotActivated,
}

pub type AgentResult<T> = Result<T, AgentError>;
