use thiserror::Error;

/// Failures surfaced by an [InsertionLog](crate::InsertionLog).
///
/// None of these are retried internally. After a [InsertionLogError::Sink] failure the buffer may
/// already hold the mutation while the terminal does not, so that log instance should be
/// abandoned rather than retried.
#[derive(Debug, Error)]
pub enum InsertionLogError {
    #[error("No message for id: {id}")]
    MessageNotFound { id: String },
    #[error("Replacement for id {id} has {actual} lines but the message has {expected}")]
    LineCountMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("Failed writing to the log sink: {0}")]
    Sink(#[from] std::io::Error),
    #[error("Shared insertion log was poisoned by a panicking writer")]
    Poisoned,
}

pub type Result<T, E = InsertionLogError> = std::result::Result<T, E>;
