use super::Value;
use crate::Result;

use std::sync::Arc;

/// Ordered column names shared by all rows of one result set.
#[derive(Debug, Clone)]
pub struct RowSchema {
    columns: Arc<[String]>,
}

impl RowSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the ordinal position of the named column, if present.
    pub fn ordinal(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// One flat, denormalized tuple of named/ordinally-addressable scalar values.
#[derive(Debug, Clone)]
pub struct Row {
    schema: RowSchema,
    values: Vec<Value>,
}

impl Row {
    pub fn new(schema: RowSchema, values: Vec<Value>) -> Result<Self> {
        if schema.len() != values.len() {
            crate::bail!(
                "row width mismatch: schema has {} columns, row has {} values",
                schema.len(),
                values.len()
            );
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Looks up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.schema.ordinal(column).map(|i| &self.values[i])
    }

    /// Looks up a cell by ordinal position.
    pub fn get_ordinal(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
