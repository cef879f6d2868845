use super::{Entity, EntitySchema};

/// One mapped member of an [`EntitySchema`].
#[derive(Debug)]
pub struct Member {
    /// The member name on the target type.
    pub name: &'static str,

    /// Declared source-column rename. `None` means the column name equals the
    /// member name (options may still override either).
    pub column: Option<&'static str>,

    /// Scalar or nested relation.
    pub ty: MemberTy,
}

#[derive(Debug)]
pub enum MemberTy {
    /// Filled directly from one row column.
    Scalar,

    /// Another mapped type, or a collection of one.
    Relation(Relation),
}

/// A relation member's link to its nested type.
///
/// The `fn()` indirection keeps mutually-referencing types representable
/// without eager recursion; the nested schema is only resolved when walked.
pub struct Relation {
    /// Schema of the nested type.
    pub target: fn() -> &'static EntitySchema,

    /// True for collection members, false for singular ones.
    pub many: bool,
}

impl Member {
    pub const fn scalar(name: &'static str) -> Member {
        Member {
            name,
            column: None,
            ty: MemberTy::Scalar,
        }
    }

    /// A collection relation member targeting `E`.
    pub const fn has_many<E: Entity>(name: &'static str) -> Member {
        Member {
            name,
            column: None,
            ty: MemberTy::Relation(Relation {
                target: E::schema,
                many: true,
            }),
        }
    }

    /// A singular relation member targeting `E`.
    pub const fn has_one<E: Entity>(name: &'static str) -> Member {
        Member {
            name,
            column: None,
            ty: MemberTy::Relation(Relation {
                target: E::schema,
                many: false,
            }),
        }
    }

    /// Declares the source column this member is filled from.
    pub const fn from_column(mut self, column: &'static str) -> Member {
        self.column = Some(column);
        self
    }

    /// The source column name used for row lookup, before options overrides.
    pub fn storage_name(&self) -> &'static str {
        match self.column {
            Some(column) => column,
            None => self.name,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.ty, MemberTy::Scalar)
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.ty, MemberTy::Relation(_))
    }

    pub fn relation(&self) -> Option<&Relation> {
        match &self.ty {
            MemberTy::Relation(relation) => Some(relation),
            MemberTy::Scalar => None,
        }
    }
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("target", &(self.target)().name)
            .field("many", &self.many)
            .finish()
    }
}
