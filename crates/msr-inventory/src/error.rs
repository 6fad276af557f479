use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer {buffer:?}: capacity must be a non-negative number, got {capacity}")]
    InvalidCapacity { buffer: String, capacity: f64 },

    #[error("buffer {buffer:?}: capacity {capacity} is below the {quantity} kg already held")]
    CapacityBelowQuantity { buffer: String, capacity: f64, quantity: f64 },

    #[error("buffer {0:?} is empty")]
    Empty(String),
}

pub type BufferResult<T> = Result<T, BufferError>;
