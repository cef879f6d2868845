use super::Error;

/// Error when a required argument is absent.
///
/// Precondition violations fail immediately, before any member is touched.
#[derive(Debug)]
pub(super) struct MissingArgumentError {
    pub(super) name: &'static str,
}

impl std::error::Error for MissingArgumentError {}

impl core::fmt::Display for MissingArgumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "missing required argument: {}", self.name)
    }
}

impl Error {
    /// Creates a missing argument error naming the absent argument.
    pub fn missing_argument(name: &'static str) -> Error {
        Error::from(super::ErrorKind::MissingArgument(MissingArgumentError {
            name,
        }))
    }

    /// Returns `true` if any error in the chain is a precondition violation.
    pub fn is_missing_argument(&self) -> bool {
        self.chain()
            .any(|e| matches!(e.kind(), super::ErrorKind::MissingArgument(_)))
    }
}
