mod options;
pub use options::{ExecOptions, IsolationLevel};

mod response;
pub use response::{Response, Rows};

mod static_rows;
pub use static_rows::StaticRows;

use crate::{async_trait, stmt::Statement};

use std::fmt::Debug;

/// A source that yields rows, given a statement and options.
///
/// Statement construction, connection pooling, and transaction lifetime all
/// live behind this trait; the mapping pipeline only consumes the resulting
/// stream.
#[async_trait]
pub trait RowSource: Debug + Send + Sync + 'static {
    /// Execute a statement, producing either a row stream or an affected-row
    /// count.
    async fn fetch(&self, statement: &Statement, options: &ExecOptions) -> crate::Result<Response>;
}
