use super::{Member, Node};

/// Static metadata for one mappable type.
///
/// Built once per type by hand (the registration step) and referenced through
/// [`Entity::schema`]. Member classification, identity-key membership, and
/// relation targets are all derived from this; the per-row path never
/// inspects types at runtime.
///
/// [`Entity::schema`]: super::Entity::schema
pub struct EntitySchema {
    /// Type name, unique within one mapping invocation.
    pub name: &'static str,

    /// Constructs an empty, type-erased instance of the type.
    ///
    /// Always `Node::new::<Self>` in practice; carried here so descriptors
    /// can build instances of types they only know through this schema.
    pub new_node: fn() -> Node,

    /// Mapped members, in declaration order.
    pub members: &'static [Member],

    /// Names of the scalar members that make up the natural key.
    ///
    /// An empty slice means every scalar member participates in the identity
    /// key.
    pub key: &'static [&'static str],
}

impl EntitySchema {
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn scalars(&self) -> impl Iterator<Item = &'static Member> {
        self.members.iter().filter(|m| m.is_scalar())
    }

    pub fn relations(&self) -> impl Iterator<Item = &'static Member> {
        self.members.iter().filter(|m| m.is_relation())
    }

    /// Returns true if the named member contributes to the identity key.
    pub fn is_key_member(&self, name: &str) -> bool {
        if self.key.is_empty() {
            self.member(name).is_some_and(|m| m.is_scalar())
        } else {
            self.key.contains(&name)
        }
    }
}

impl std::fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("key", &self.key)
            .finish()
    }
}
