use super::Error;

/// Error when mapping options reference schema elements that do not exist.
///
/// This occurs when:
/// - A rename, exclude, or converter entry names a member the type does not
///   have
/// - A converter is registered against a relation member
///
/// Configuration errors are raised during classification, before any row is
/// processed, and are never retried.
#[derive(Debug)]
pub(super) struct ConfigurationError {
    pub(super) type_name: Box<str>,
    pub(super) member: Box<str>,
    pub(super) detail: Box<str>,
}

impl std::error::Error for ConfigurationError {}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid mapping configuration for {}.{}: {}",
            self.type_name, self.member, self.detail
        )
    }
}

impl Error {
    /// Creates a configuration error for a `(type, member)` pair.
    pub fn configuration(
        type_name: impl Into<String>,
        member: impl Into<String>,
        detail: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::Configuration(ConfigurationError {
            type_name: type_name.into().into_boxed_str(),
            member: member.into().into_boxed_str(),
            detail: detail.into().into_boxed_str(),
        }))
    }

    /// Returns `true` if any error in the chain is a mapping configuration
    /// error.
    pub fn is_configuration(&self) -> bool {
        self.chain()
            .any(|e| matches!(e.kind(), super::ErrorKind::Configuration(_)))
    }
}
