use super::Error;

/// Error when a row has no column matching a descriptor's source column name.
///
/// Raised per row, not during classification: the row schema is only known
/// once rows flow.
#[derive(Debug)]
pub(super) struct UnknownColumnError {
    pub(super) column: Box<str>,
}

impl std::error::Error for UnknownColumnError {}

impl core::fmt::Display for UnknownColumnError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "row has no column named `{}`", self.column)
    }
}

impl Error {
    /// Creates an unknown column error.
    pub fn unknown_column(column: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownColumn(UnknownColumnError {
            column: column.into().into_boxed_str(),
        }))
    }

    /// Returns `true` if any error in the chain names a column missing from
    /// the row.
    pub fn is_unknown_column(&self) -> bool {
        self.chain()
            .any(|e| matches!(e.kind(), super::ErrorKind::UnknownColumn(_)))
    }
}
