use super::{ExecOptions, Response, RowSource};
use crate::{
    async_trait,
    stmt::{Row, RowSchema, RowStream, Statement, Value},
    Result,
};

/// An in-memory row source yielding a fixed result set.
///
/// Ignores the statement text; every fetch replays the same rows. Intended
/// for tests and demos.
#[derive(Debug, Clone)]
pub struct StaticRows {
    schema: RowSchema,
    rows: Vec<Row>,
}

impl StaticRows {
    pub fn new(schema: RowSchema) -> Self {
        Self {
            schema,
            rows: vec![],
        }
    }

    pub fn row<I>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let row = Row::new(self.schema.clone(), values.into_iter().collect())?;
        self.rows.push(row);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl RowSource for StaticRows {
    async fn fetch(&self, _statement: &Statement, _options: &ExecOptions) -> Result<Response> {
        Ok(Response::row_stream(RowStream::from_vec(self.rows.clone())))
    }
}
