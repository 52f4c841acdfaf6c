use thiserror::Error;

/// Errors that can occur while a worker pool is processing items.
#[derive(Debug, Error)]
pub enum PoolError {
    /// An item processor failed with an error.
    ///
    /// Preserves the source error for debugging.
    #[error("item processor failed")]
    ProcessorError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hand-off queue was closed before the item could be submitted.
    #[error("hand-off queue closed")]
    QueueClosed,

    /// Processing was cancelled via the cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Multiple workers failed during processing.
    ///
    /// Contains all worker errors for debugging.
    #[error("{} worker(s) failed", .0.len())]
    MultipleErrors(Vec<PoolError>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_processor_error_preserves_source() {
        let source = std::io::Error::other("test error");
        let pool_err = PoolError::ProcessorError(Box::new(source));

        assert!(pool_err.source().is_some());
        assert_eq!(pool_err.to_string(), "item processor failed");
    }

    #[test]
    fn test_error_display() {
        let err = PoolError::QueueClosed;
        assert_eq!(err.to_string(), "hand-off queue closed");

        let err = PoolError::Cancelled;
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[test]
    fn test_multiple_errors_display() {
        let errors = vec![PoolError::Cancelled, PoolError::QueueClosed];
        let multi_err = PoolError::MultipleErrors(errors);

        let display = multi_err.to_string();
        assert!(display.contains("2 worker"));
        assert!(display.contains("failed"));
    }

    #[test]
    fn test_multiple_errors_source() {
        let errors = vec![PoolError::Cancelled];
        let multi_err = PoolError::MultipleErrors(errors);

        // MultipleErrors doesn't have a single source
        assert!(multi_err.source().is_none());
    }
}
