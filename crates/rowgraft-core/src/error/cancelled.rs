use super::Error;

/// Error when a mapping invocation is cancelled before completion.
///
/// Cancellation is an expected outcome, distinct from configuration and
/// conversion errors. A cancelled invocation never exposes partial results.
#[derive(Debug)]
pub(super) struct CancelledError;

impl std::error::Error for CancelledError {}

impl core::fmt::Display for CancelledError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("mapping invocation cancelled")
    }
}

impl Error {
    /// Creates a cancellation error.
    pub fn cancelled() -> Error {
        Error::from(super::ErrorKind::Cancelled(CancelledError))
    }

    /// Returns `true` if any error in the chain represents cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.chain()
            .any(|e| matches!(e.kind(), super::ErrorKind::Cancelled(_)))
    }
}
