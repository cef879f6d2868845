use super::classify::classify;
use crate::options::{Converter, MapOptions};
use rowgraft_core::{schema::EntitySchema, Result};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Identity-key fragment separator. Fragments are self-delimiting (see
/// `Value::to_key_fragment`); the separator keeps keys readable in logs.
const KEY_SEPARATOR: char = '\u{1f}';

/// One classified member of an [`EntityDescriptor`].
#[derive(Debug)]
pub(crate) struct MemberDescriptor {
    /// The member name on the target type.
    pub(crate) name: &'static str,

    /// The source column the member is filled from, after rename overrides.
    pub(crate) column: String,

    pub(crate) ty: DescriptorTy,
}

pub(crate) enum DescriptorTy {
    /// Filled directly from one row column.
    Scalar {
        converter: Option<Converter>,
        /// True if the member contributes to the identity key.
        key: bool,
    },

    /// Another mapped type, or a collection of one. The nested type's own
    /// descriptor is resolved lazily through the [`DescriptorCache`].
    Relation {
        target: fn() -> &'static EntitySchema,
        many: bool,
    },
}

impl MemberDescriptor {
    pub(crate) fn is_scalar(&self) -> bool {
        matches!(self.ty, DescriptorTy::Scalar { .. })
    }
}

impl std::fmt::Debug for DescriptorTy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar { converter, key } => f
                .debug_struct("Scalar")
                .field("converter", &converter.is_some())
                .field("key", key)
                .finish(),
            Self::Relation { target, many } => f
                .debug_struct("Relation")
                .field("target", &target().name)
                .field("many", many)
                .finish(),
        }
    }
}

/// A reusable, options-resolved description of one mappable type.
///
/// Pure metadata: building a descriptor never touches row data.
#[derive(Debug)]
pub(crate) struct EntityDescriptor {
    pub(crate) schema: &'static EntitySchema,
    pub(crate) members: Vec<MemberDescriptor>,
}

impl EntityDescriptor {
    pub(crate) fn scalars(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.is_scalar())
    }

    pub(crate) fn relations(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| !m.is_scalar())
    }

    /// Builds the identity key from the key members' value fragments.
    ///
    /// The type name is embedded so the shared identity table cannot collide
    /// across types.
    pub(crate) fn identity_key(&self, fragments: &[String]) -> String {
        let mut key = String::with_capacity(
            self.schema.name.len() + fragments.iter().map(|f| f.len() + 1).sum::<usize>(),
        );
        key.push_str(self.schema.name);
        for fragment in fragments {
            key.push(KEY_SEPARATOR);
            key.push_str(fragment);
        }
        key
    }
}

/// Memoizes descriptors per type for one options identity.
///
/// Scoped to one [`Mapper`]; a mapper with different options gets a fresh
/// cache, since rename/exclude/converter tables change classification.
///
/// [`Mapper`]: crate::Mapper
#[derive(Clone, Default)]
pub(crate) struct DescriptorCache {
    inner: Arc<Mutex<HashMap<&'static str, Arc<EntityDescriptor>>>>,
}

impl DescriptorCache {
    /// Classifies `root` and every type reachable from it.
    ///
    /// The walk is bounded by a visited set, so mutually-referencing types
    /// terminate. Running it before the first row keeps configuration errors
    /// fail-fast even for nested types.
    pub(crate) fn prepare(
        &self,
        root: &'static EntitySchema,
        options: &MapOptions,
    ) -> Result<Arc<EntityDescriptor>> {
        let root_descriptor = self.describe(root, options)?;

        let mut visited = HashSet::from([root.name]);
        let mut pending: Vec<&'static EntitySchema> = root
            .relations()
            .filter_map(|m| m.relation())
            .map(|r| (r.target)())
            .collect();

        while let Some(schema) = pending.pop() {
            if !visited.insert(schema.name) {
                continue;
            }
            self.describe(schema, options)?;
            pending.extend(
                schema
                    .relations()
                    .filter_map(|m| m.relation())
                    .map(|r| (r.target)()),
            );
        }

        Ok(root_descriptor)
    }

    fn describe(
        &self,
        schema: &'static EntitySchema,
        options: &MapOptions,
    ) -> Result<Arc<EntityDescriptor>> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| crate::err!("descriptor cache lock poisoned"))?;

        if let Some(descriptor) = inner.get(schema.name) {
            return Ok(descriptor.clone());
        }

        let members = classify(schema, options)?;
        let descriptor = Arc::new(EntityDescriptor { schema, members });
        inner.insert(schema.name, descriptor.clone());
        Ok(descriptor)
    }

    /// Looks up a prepared descriptor. Only valid after [`prepare`] walked
    /// the type, which covers everything reachable from the root.
    ///
    /// [`prepare`]: DescriptorCache::prepare
    pub(crate) fn get(&self, schema: &'static EntitySchema) -> Result<Arc<EntityDescriptor>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| crate::err!("descriptor cache lock poisoned"))?;

        inner
            .get(schema.name)
            .cloned()
            .ok_or_else(|| crate::err!("no prepared descriptor for `{}`", schema.name))
    }
}
