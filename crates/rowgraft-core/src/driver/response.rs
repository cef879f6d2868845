use crate::stmt::RowStream;

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result, as a stream of rows
    Values(RowStream),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn row_stream(rows: impl Into<RowStream>) -> Self {
        Self {
            rows: Rows::row_stream(rows),
        }
    }

    pub fn empty_row_stream() -> Self {
        Self {
            rows: Rows::Values(RowStream::default()),
        }
    }
}

impl Rows {
    pub fn row_stream(rows: impl Into<RowStream>) -> Self {
        Self::Values(rows.into())
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Unwraps the row stream, failing on count-only responses.
    pub fn into_values(self) -> crate::Result<RowStream> {
        match self {
            Self::Values(rows) => Ok(rows),
            Self::Count(count) => {
                crate::bail!("expected a row stream, source returned a count ({count})")
            }
        }
    }
}
