//! Rowgraft turns a stream of flat, join-duplicated rows into nested object
//! graphs, merging repeated parent rows into shared instances by identity
//! key.

mod mapper;
pub use mapper::Mapper;

mod options;
pub use options::{Builder, Converter, MapOptions};

pub use rowgraft_core::{
    driver::{ExecOptions, IsolationLevel, Response, RowSource, Rows, StaticRows},
    schema::{Entity, EntitySchema, Member, MemberTy, Node, Relation, Shared},
    stmt::{Row, RowSchema, RowStream, Statement, Value},
    Error, Result,
};

pub use rowgraft_core::{bail, err};

pub use tokio_util::sync::CancellationToken;
