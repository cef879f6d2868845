use super::describe::{DescriptorCache, DescriptorTy, EntityDescriptor};
use rowgraft_core::{schema::Node, stmt::Row, Error, Result};

use indexmap::IndexMap;
use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::sync::Arc;

/// The per-invocation identity-merge table.
///
/// Maps identity key to the single live instance for that key; at most one
/// entity exists per key at any time. Shared by every row of one mapping
/// invocation and discarded with it.
#[derive(Default)]
pub(crate) struct IdentityTable {
    /// Insertion-ordered so root output order matches first-seen order.
    entries: IndexMap<String, CachedEntity>,

    /// Attachment state per `(parent key, member)`, used to keep one-to-many
    /// collections duplicate-free across rows and to make singular members
    /// assign-once.
    links: HashMap<(String, &'static str), LinkState>,
}

struct CachedEntity {
    node: Node,
    /// True once the entity has been seen with a parent; nested entities are
    /// reachable only through their parents and are never yielded directly.
    nested: bool,
}

enum LinkState {
    /// A singular member that has been assigned.
    Single,
    /// Identity keys already appended to a collection member.
    Many(HashSet<String>),
}

impl IdentityTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Root-level entities in first-seen order.
    pub(crate) fn roots(&self) -> impl Iterator<Item = &Node> {
        self.entries
            .values()
            .filter(|e| !e.nested)
            .map(|e| &e.node)
    }
}

/// One unit of pending traversal work: an entity to build for the current
/// row, plus the link back to the parent that reaches it.
struct Frame {
    descriptor: Arc<EntityDescriptor>,
    parent: Option<ParentLink>,
}

struct ParentLink {
    key: String,
    node: Node,
    member: &'static str,
    many: bool,
}

/// Inserts and attaches staged by one row's traversal.
///
/// Nothing is committed to the shared table until the whole row succeeded,
/// so a failing row leaves no partial entity behind.
#[derive(Default)]
struct Staged {
    inserts: IndexMap<String, CachedEntity>,
    attaches: Vec<Attach>,
}

struct Attach {
    parent_key: String,
    parent: Node,
    member: &'static str,
    many: bool,
    child_key: String,
    child: Node,
}

/// Builds and merges the entity graph one flat row describes.
///
/// Explicit LIFO worklist rather than recursion, so graph depth is bounded
/// by memory, not call-stack depth. The caller holds the identity-table
/// critical section for the full call; no I/O happens in here.
pub(crate) fn materialize_row(
    row: &Row,
    root: &Arc<EntityDescriptor>,
    cache: &DescriptorCache,
    table: &mut IdentityTable,
) -> Result<Node> {
    let mut staged = Staged::default();
    let mut root_node = None;

    let mut stack = vec![Frame {
        descriptor: root.clone(),
        parent: None,
    }];

    while let Some(frame) = stack.pop() {
        let descriptor = frame.descriptor;

        // Fill a fresh instance's scalar members from the row.
        let node = (descriptor.schema.new_node)();
        let mut fragments = Vec::new();

        for member in descriptor.scalars() {
            let DescriptorTy::Scalar { converter, key } = &member.ty else {
                continue;
            };

            let raw = row
                .get(&member.column)
                .ok_or_else(|| Error::unknown_column(&member.column))?
                .clone();

            let value = match converter {
                Some(converter) => converter(raw).map_err(|cause| {
                    cause.context(crate::err!(
                        "converter for `{}.{}` failed",
                        descriptor.schema.name,
                        member.name
                    ))
                })?,
                None => raw,
            };

            if *key {
                fragments.push(value.to_key_fragment());
            }
            node.set_scalar(member.name, value)?;
        }

        let key = descriptor.identity_key(&fragments);

        // Deduplication: a repeated identity collapses onto the instance
        // already held by the table (or staged earlier in this same row).
        let node = match table
            .entries
            .get(&key)
            .or_else(|| staged.inserts.get(&key))
        {
            Some(existing) => existing.node.clone(),
            None => {
                staged.inserts.insert(
                    key.clone(),
                    CachedEntity {
                        node: node.clone(),
                        nested: frame.parent.is_some(),
                    },
                );
                node
            }
        };

        // Children traverse the possibly rebound node, so rows that extend a
        // previously seen parent attach into the shared instance.
        for member in descriptor.relations() {
            let DescriptorTy::Relation { target, many } = &member.ty else {
                continue;
            };
            stack.push(Frame {
                descriptor: cache.get(target())?,
                parent: Some(ParentLink {
                    key: key.clone(),
                    node: node.clone(),
                    member: member.name,
                    many: *many,
                }),
            });
        }

        match frame.parent {
            Some(link) => staged.attaches.push(Attach {
                parent_key: link.key,
                parent: link.node,
                member: link.member,
                many: link.many,
                child_key: key,
                child: node,
            }),
            None => root_node = Some(node),
        }
    }

    commit(staged, table)?;

    root_node.ok_or_else(|| crate::err!("row produced no root entity"))
}

/// Applies one successful row's staged work to the shared table.
fn commit(staged: Staged, table: &mut IdentityTable) -> Result<()> {
    for (key, entity) in staged.inserts {
        table.entries.insert(key, entity);
    }

    for attach in staged.attaches {
        let permitted = match table.links.entry((attach.parent_key, attach.member)) {
            Entry::Occupied(mut occupied) => match occupied.get_mut() {
                // Singular member already assigned; first assignment wins.
                LinkState::Single => false,
                LinkState::Many(seen) => seen.insert(attach.child_key.clone()),
            },
            Entry::Vacant(vacant) => {
                vacant.insert(if attach.many {
                    LinkState::Many(HashSet::from([attach.child_key.clone()]))
                } else {
                    LinkState::Single
                });
                true
            }
        };

        if permitted {
            attach.parent.attach(attach.member, attach.child)?;
        }

        // Once nested, always nested: the entity is reachable through its
        // parent and must not also be yielded as a root.
        if let Some(entry) = table.entries.get_mut(&attach.child_key) {
            entry.nested = true;
        }
    }

    Ok(())
}
