use thiserror::Error;

/// Errors reported by tree builds, heaps and queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KdError {
    #[error("k must be at least 1")]
    InvalidK,

    #[error("max points per leaf must be at least 1")]
    InvalidLeafSize,

    #[error("radius must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    #[error("flat point buffer length {0} is not a multiple of 3")]
    InvalidPointBuffer(usize),

    #[error("pop from an empty heap")]
    EmptyHeap,

    #[error("pop from an empty query queue")]
    EmptyQueue,
}

pub type Result<T> = std::result::Result<T, KdError>;
