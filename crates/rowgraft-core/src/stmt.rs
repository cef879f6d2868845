mod row;
pub use row::{Row, RowSchema};

mod row_stream;
pub use row_stream::RowStream;

mod statement;
pub use statement::Statement;

mod value;
pub use value::Value;
