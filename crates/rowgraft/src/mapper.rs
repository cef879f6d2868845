mod classify;
mod describe;
mod materialize;

use describe::DescriptorCache;
use materialize::{materialize_row, IdentityTable};

use crate::options::MapOptions;
use rowgraft_core::{
    driver::RowSource,
    schema::{Entity, Shared},
    stmt::{RowStream, Statement},
    Error, Result,
};

use std::sync::{Arc, Mutex};
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_stream::Stream;
use tracing::{debug, trace};

/// Drives the mapping pipeline: rows in, merged entity graphs out.
///
/// A mapper owns one options identity and memoizes descriptors for it, so
/// repeated invocations over the same types skip re-classification. Each
/// invocation still gets a fresh identity table; entities never leak between
/// invocations.
#[derive(Clone)]
pub struct Mapper {
    options: MapOptions,
    descriptors: DescriptorCache,
}

impl Mapper {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            descriptors: DescriptorCache::default(),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Maps a row stream to the distinct set of root `E` entities.
    ///
    /// One pass, not restartable. Rows are dispatched to a bounded worker
    /// pool; each row's graph-merge runs under the identity-table critical
    /// section. Completion order between rows is unspecified, but every row
    /// is merged exactly once before this returns.
    pub async fn map<E: Entity>(&self, mut rows: RowStream) -> Result<Vec<Shared<E>>> {
        let root = self
            .descriptors
            .prepare(E::schema(), &self.options)
            .map_err(|cause| cause.context(crate::err!("mapping `{}`", E::schema().name)))?;

        let token = self.options.cancellation.clone();
        let table = Arc::new(Mutex::new(IdentityTable::new()));
        let permits = Arc::new(Semaphore::new(self.options.parallelism));
        let mut workers: JoinSet<Result<()>> = JoinSet::new();
        let mut dispatched: u64 = 0;

        debug!(
            root = E::schema().name,
            parallelism = self.options.parallelism,
            "mapping invocation started"
        );

        loop {
            let next = tokio::select! {
                _ = token.cancelled() => {
                    workers.abort_all();
                    return Err(Error::cancelled());
                }
                Some(joined) = workers.join_next() => {
                    if let Err(err) = flatten(joined) {
                        workers.abort_all();
                        return Err(err);
                    }
                    continue;
                }
                next = rows.next() => next,
            };

            let row = match next {
                Some(Ok(row)) => row,
                Some(Err(err)) => {
                    workers.abort_all();
                    return Err(err);
                }
                None => break,
            };

            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| crate::err!("worker pool closed unexpectedly"))?;

            dispatched += 1;
            trace!(row = dispatched, "dispatching row");

            let token = token.clone();
            let table = table.clone();
            let cache = self.descriptors.clone();
            let root = root.clone();
            let on_error = self.options.on_error.clone();

            workers.spawn(async move {
                let _permit = permit;

                if token.is_cancelled() {
                    return Err(Error::cancelled());
                }

                // The whole per-row traversal runs under one critical
                // section; the lock is never held across an await and is
                // released by RAII on every error path.
                let merged = {
                    let mut table = table
                        .lock()
                        .map_err(|_| crate::err!("identity table lock poisoned"))?;
                    materialize_row(&row, &root, &cache, &mut table)
                };

                match merged {
                    Ok(_) => Ok(()),
                    Err(err) if err.is_cancelled() => Err(err),
                    Err(err) => match &on_error {
                        // Routed per-row error: the row's entities were
                        // discarded before commit, the invocation goes on.
                        Some(callback) => {
                            callback(err);
                            Ok(())
                        }
                        None => Err(err),
                    },
                }
            });
        }

        // Stream exhausted; wait for in-flight rows.
        loop {
            let joined = tokio::select! {
                _ = token.cancelled() => {
                    workers.abort_all();
                    return Err(Error::cancelled());
                }
                joined = workers.join_next() => joined,
            };
            match joined {
                Some(joined) => {
                    if let Err(err) = flatten(joined) {
                        workers.abort_all();
                        return Err(err);
                    }
                }
                None => break,
            }
        }

        if token.is_cancelled() {
            return Err(Error::cancelled());
        }

        let table = Arc::try_unwrap(table)
            .map_err(|_| crate::err!("identity table still shared after join"))?
            .into_inner()
            .map_err(|_| crate::err!("identity table lock poisoned"))?;

        let mut entities = Vec::new();
        for node in table.roots() {
            entities.push(node.downcast::<E>()?);
        }

        debug!(
            rows = dispatched,
            merged = table.len(),
            roots = entities.len(),
            "mapping invocation complete"
        );

        Ok(entities)
    }

    /// Like [`map`], but yields the merged roots as an asynchronous
    /// sequence.
    ///
    /// The stream produces nothing until the row stream is exhausted; merged
    /// roots only exist once every row has been folded in.
    ///
    /// [`map`]: Mapper::map
    pub fn map_stream<E: Entity>(
        &self,
        rows: RowStream,
    ) -> impl Stream<Item = Result<Shared<E>>> + '_ {
        async_stream::try_stream! {
            let entities = self.map::<E>(rows).await?;
            for entity in entities {
                yield entity;
            }
        }
    }

    /// Fetches rows from `source` for `statement`, then maps them.
    ///
    /// The options' transaction and generated-identity preferences are
    /// forwarded to the source as [`ExecOptions`].
    ///
    /// [`ExecOptions`]: rowgraft_core::driver::ExecOptions
    pub async fn map_source<E: Entity>(
        &self,
        source: &dyn RowSource,
        statement: &Statement,
    ) -> Result<Vec<Shared<E>>> {
        let response = source.fetch(statement, &self.options.exec_options()).await?;
        let rows = response.rows.into_values()?;
        self.map::<E>(rows).await
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(MapOptions::default())
    }
}

/// Collapses a join result into the worker's own result, surfacing panics
/// as errors.
fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(join_err) if join_err.is_cancelled() => Ok(()),
        Err(join_err) => Err(crate::err!("row materialization panicked: {join_err}")),
    }
}
