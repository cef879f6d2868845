use super::Value;
use crate::Result;

/// An opaque statement handed to a row source.
///
/// Statement construction and execution are external concerns; the
/// materializer only threads the statement through to the [`RowSource`]
/// that yields rows for it.
///
/// [`RowSource`]: crate::driver::RowSource
#[derive(Debug, Clone)]
pub struct Statement {
    text: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(crate::Error::missing_argument("statement"));
        }
        Ok(Self {
            text,
            params: vec![],
        })
    }

    pub fn with_params(text: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        let mut stmt = Self::new(text)?;
        stmt.params = params;
        Ok(stmt)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
