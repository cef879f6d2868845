mod entity;
pub use entity::EntitySchema;

mod member;
pub use member::{Member, MemberTy, Relation};

mod node;
pub use node::{Entity, Node, Shared};
