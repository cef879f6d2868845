/// Options forwarded to a row source alongside a statement.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Execute the statement inside a transaction.
    pub transaction_enabled: bool,

    /// Isolation level requested when `transaction_enabled` is set.
    pub isolation_level: IsolationLevel,

    /// Ask the source to return generated identifiers for inserted rows.
    pub retrieve_generated_identity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}
