use rowgraft_core::{
    driver::{ExecOptions, IsolationLevel},
    schema::{Entity, Member},
    stmt::Value,
    Error, Result,
};
use tokio_util::sync::CancellationToken;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A typed scalar conversion, registered per `(type, member)` at
/// configuration time.
pub type Converter = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Predicate deciding whether a member participates in mapping.
pub type ConditionalMapping = Arc<dyn Fn(&'static str, &Member) -> bool + Send + Sync>;

/// Callback receiving per-row errors when configured.
pub type ErrorCallback = Arc<dyn Fn(Error) + Send + Sync>;

/// Immutable configuration for one [`Mapper`].
///
/// Built once via [`MapOptions::builder`] and never mutated during a mapping
/// invocation.
///
/// [`Mapper`]: crate::Mapper
#[derive(Clone)]
pub struct MapOptions {
    pub(crate) renames: HashMap<&'static str, HashMap<String, String>>,
    pub(crate) excluded: HashMap<&'static str, HashSet<String>>,
    pub(crate) converters: HashMap<&'static str, HashMap<String, Converter>>,
    pub(crate) condition: Option<ConditionalMapping>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) retrieve_generated_identity: bool,
    pub(crate) transaction_enabled: bool,
    pub(crate) isolation_level: IsolationLevel,
    pub(crate) parallelism: usize,
    pub(crate) cancellation: CancellationToken,
}

impl MapOptions {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The degree of parallelism used by the mapping pipeline.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Options forwarded to the row source when fetching.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            transaction_enabled: self.transaction_enabled,
            isolation_level: self.isolation_level,
            retrieve_generated_identity: self.retrieve_generated_identity,
        }
    }

    pub(crate) fn rename_for(&self, type_name: &str, member: &str) -> Option<&str> {
        self.renames
            .get(type_name)?
            .get(member)
            .map(String::as_str)
    }

    pub(crate) fn is_excluded(&self, type_name: &str, member: &str) -> bool {
        self.excluded
            .get(type_name)
            .is_some_and(|set| set.contains(member))
    }

    pub(crate) fn converter_for(&self, type_name: &str, member: &str) -> Option<Converter> {
        self.converters.get(type_name)?.get(member).cloned()
    }

    pub(crate) fn accepts(&self, type_name: &'static str, member: &Member) -> bool {
        match &self.condition {
            Some(condition) => condition(type_name, member),
            None => true,
        }
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl std::fmt::Debug for MapOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapOptions")
            .field("renames", &self.renames)
            .field("excluded", &self.excluded)
            .field("parallelism", &self.parallelism)
            .field("transaction_enabled", &self.transaction_enabled)
            .field("isolation_level", &self.isolation_level)
            .finish()
    }
}

/// Builder for [`MapOptions`].
#[derive(Default)]
pub struct Builder {
    renames: HashMap<&'static str, HashMap<String, String>>,
    excluded: HashMap<&'static str, HashSet<String>>,
    converters: HashMap<&'static str, HashMap<String, Converter>>,
    condition: Option<ConditionalMapping>,
    on_error: Option<ErrorCallback>,
    retrieve_generated_identity: bool,
    transaction_enabled: bool,
    isolation_level: IsolationLevel,
    parallelism: Option<usize>,
    cancellation: Option<CancellationToken>,
}

impl Builder {
    /// Populate `member` of `E` from `column` instead of the member's own
    /// name.
    pub fn rename<E: Entity>(&mut self, member: &str, column: &str) -> &mut Self {
        self.renames
            .entry(E::schema().name)
            .or_default()
            .insert(member.to_string(), column.to_string());
        self
    }

    /// Skip `member` of `E` entirely; it stays at its default value.
    pub fn exclude<E: Entity>(&mut self, member: &str) -> &mut Self {
        self.excluded
            .entry(E::schema().name)
            .or_default()
            .insert(member.to_string());
        self
    }

    /// Apply `converter` to the raw cell value before assigning `member` of
    /// `E`. Takes precedence over default scalar extraction.
    pub fn convert<E: Entity>(
        &mut self,
        member: &str,
        converter: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.converters
            .entry(E::schema().name)
            .or_default()
            .insert(member.to_string(), Arc::new(converter));
        self
    }

    /// Only map members for which the predicate returns true.
    pub fn map_when(
        &mut self,
        condition: impl Fn(&'static str, &Member) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Route per-row errors to `callback` instead of aborting the
    /// invocation; the failing row's entities are discarded.
    pub fn on_error(&mut self, callback: impl Fn(Error) + Send + Sync + 'static) -> &mut Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Ask the row source to return generated identifiers.
    pub fn retrieve_generated_identity(&mut self, enabled: bool) -> &mut Self {
        self.retrieve_generated_identity = enabled;
        self
    }

    /// Execute statements inside a transaction.
    pub fn transaction(&mut self, enabled: bool) -> &mut Self {
        self.transaction_enabled = enabled;
        self
    }

    pub fn isolation_level(&mut self, level: IsolationLevel) -> &mut Self {
        self.isolation_level = level;
        self
    }

    /// Bound on concurrently materializing rows. Values below one are
    /// clamped to one.
    pub fn parallelism(&mut self, parallelism: usize) -> &mut Self {
        self.parallelism = Some(parallelism.max(1));
        self
    }

    /// Token observed between rows; cancelling it aborts the invocation
    /// without partial output.
    pub fn cancellation(&mut self, token: CancellationToken) -> &mut Self {
        self.cancellation = Some(token);
        self
    }

    pub fn build(&self) -> MapOptions {
        MapOptions {
            renames: self.renames.clone(),
            excluded: self.excluded.clone(),
            converters: self.converters.clone(),
            condition: self.condition.clone(),
            on_error: self.on_error.clone(),
            retrieve_generated_identity: self.retrieve_generated_identity,
            transaction_enabled: self.transaction_enabled,
            isolation_level: self.isolation_level,
            parallelism: self.parallelism.unwrap_or_else(default_parallelism),
            cancellation: self.cancellation.clone().unwrap_or_default(),
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(4)
}
