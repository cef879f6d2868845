use super::EntitySchema;
use crate::{stmt::Value, Result};

use std::{
    any::Any,
    fmt,
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard},
};

/// A mappable type.
///
/// Implementing this trait is the registration step that replaces runtime
/// reflection: the schema lists the members, `set_scalar` and `attach` are
/// the only write paths the materializer uses.
pub trait Entity: Default + Send + Sync + 'static {
    /// Static metadata describing the type's members and natural key.
    fn schema() -> &'static EntitySchema;

    /// Assigns one scalar member from an extracted row value.
    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()>;

    /// Attaches a nested entity to a relation member.
    ///
    /// Collection members append; singular members assign. Duplicate
    /// suppression across rows is handled by the caller, so implementations
    /// stay plain setters.
    fn attach(&mut self, member: &str, child: Node) -> Result<()> {
        let _ = child;
        crate::bail!(
            "`{}` has no relation member named `{member}`",
            Self::schema().name
        )
    }
}

/// A typed, shared handle to a materialized entity instance.
///
/// Instances are shared because deduplication rebinds repeated parent rows
/// onto the first-seen instance; `ptr_eq` observes exactly that reuse.
pub struct Shared<E> {
    cell: Arc<Mutex<E>>,
}

impl<E> Shared<E> {
    pub fn new(value: E) -> Self {
        Self {
            cell: Arc::new(Mutex::new(value)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, E>> {
        self.cell
            .lock()
            .map_err(|_| crate::err!("entity instance lock poisoned"))
    }

    /// True if both handles reference the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<E> Clone for Shared<E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Shared<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_lock() {
            Ok(guard) => fmt::Debug::fmt(&*guard, f),
            Err(_) => f.write_str("Shared(<locked>)"),
        }
    }
}

/// A type-erased handle to a shared entity instance.
///
/// Pairs the erased `Arc<Mutex<E>>` with a monomorphized vtable of function
/// pointers, so the materializer can fill and link entities of types it only
/// knows through [`EntitySchema`].
#[derive(Clone)]
pub struct Node {
    cell: Arc<dyn Any + Send + Sync>,
    vtable: &'static NodeVtable,
}

struct NodeVtable {
    schema: fn() -> &'static EntitySchema,
    set_scalar: fn(&(dyn Any + Send + Sync), &str, Value) -> Result<()>,
    attach: fn(&(dyn Any + Send + Sync), &str, Node) -> Result<()>,
}

struct Vtable<E>(PhantomData<E>);

impl<E: Entity> Vtable<E> {
    const VTABLE: NodeVtable = NodeVtable {
        schema: E::schema,
        set_scalar: set_scalar_raw::<E>,
        attach: attach_raw::<E>,
    };
}

impl Node {
    /// Creates a node holding a fresh `E::default()` instance.
    pub fn new<E: Entity>() -> Node {
        Node {
            cell: Arc::new(Mutex::new(E::default())),
            vtable: &Vtable::<E>::VTABLE,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        (self.vtable.schema)()
    }

    pub fn set_scalar(&self, member: &str, value: Value) -> Result<()> {
        (self.vtable.set_scalar)(&*self.cell, member, value)
    }

    pub fn attach(&self, member: &str, child: Node) -> Result<()> {
        (self.vtable.attach)(&*self.cell, member, child)
    }

    /// Recovers the typed handle. Fails if the node holds a different type.
    pub fn downcast<E: Entity>(&self) -> Result<Shared<E>> {
        match Arc::clone(&self.cell).downcast::<Mutex<E>>() {
            Ok(cell) => Ok(Shared { cell }),
            Err(_) => Err(crate::err!(
                "cannot downcast `{}` node to `{}`",
                self.schema().name,
                E::schema().name
            )),
        }
    }

    /// True if both nodes reference the same instance.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.schema().name)
            .finish()
    }
}

fn lock_cell<E: Entity>(cell: &(dyn Any + Send + Sync)) -> Result<MutexGuard<'_, E>> {
    let cell = cell
        .downcast_ref::<Mutex<E>>()
        .ok_or_else(|| crate::err!("node cell type does not match its vtable"))?;
    cell.lock()
        .map_err(|_| crate::err!("entity instance lock poisoned"))
}

fn set_scalar_raw<E: Entity>(
    cell: &(dyn Any + Send + Sync),
    member: &str,
    value: Value,
) -> Result<()> {
    lock_cell::<E>(cell)?.set_scalar(member, value)
}

fn attach_raw<E: Entity>(cell: &(dyn Any + Send + Sync), member: &str, child: Node) -> Result<()> {
    lock_cell::<E>(cell)?.attach(member, child)
}
