pub mod driver;
pub use driver::RowSource;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::{Entity, Node, Shared};

pub mod stmt;

/// A Result type alias that uses Rowgraft's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
