#![allow(dead_code)]

use rowgraft::{
    Entity, EntitySchema, Member, Node, Result, Row, RowSchema, RowStream, Shared, Value,
};

/// Order with a one-to-many `lines` collection; the canonical
/// join-duplication shape.
#[derive(Debug, Default)]
pub struct Order {
    pub order_id: i64,
    pub order_date: String,
    pub lines: Vec<Shared<Line>>,
}

#[derive(Debug, Default)]
pub struct Line {
    pub line_id: String,
}

impl Entity for Order {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Order",
            new_node: Node::new::<Order>,
            members: &[
                Member::scalar("order_id"),
                Member::scalar("order_date"),
                Member::has_many::<Line>("lines"),
            ],
            key: &["order_id"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "order_id" => self.order_id = value.to_i64()?,
            "order_date" => self.order_date = value.to_string()?,
            _ => rowgraft::bail!("`Order` has no scalar member named `{member}`"),
        }
        Ok(())
    }

    fn attach(&mut self, member: &str, child: Node) -> Result<()> {
        match member {
            "lines" => self.lines.push(child.downcast::<Line>()?),
            _ => rowgraft::bail!("`Order` has no relation member named `{member}`"),
        }
        Ok(())
    }
}

impl Entity for Line {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Line",
            new_node: Node::new::<Line>,
            members: &[Member::scalar("line_id")],
            key: &["line_id"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "line_id" => self.line_id = value.to_string()?,
            _ => rowgraft::bail!("`Line` has no scalar member named `{member}`"),
        }
        Ok(())
    }
}

/// User with a singular `profile` relation.
#[derive(Debug, Default)]
pub struct User {
    pub user_id: i64,
    pub profile: Option<Shared<Profile>>,
}

#[derive(Debug, Default)]
pub struct Profile {
    pub email: String,
}

impl Entity for User {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "User",
            new_node: Node::new::<User>,
            members: &[
                Member::scalar("user_id"),
                Member::has_one::<Profile>("profile"),
            ],
            key: &["user_id"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "user_id" => self.user_id = value.to_i64()?,
            _ => rowgraft::bail!("`User` has no scalar member named `{member}`"),
        }
        Ok(())
    }

    fn attach(&mut self, member: &str, child: Node) -> Result<()> {
        match member {
            "profile" => self.profile = Some(child.downcast::<Profile>()?),
            _ => rowgraft::bail!("`User` has no relation member named `{member}`"),
        }
        Ok(())
    }
}

impl Entity for Profile {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Profile",
            new_node: Node::new::<Profile>,
            members: &[Member::scalar("email")],
            key: &["email"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "email" => self.email = value.to_string()?,
            _ => rowgraft::bail!("`Profile` has no scalar member named `{member}`"),
        }
        Ok(())
    }
}

/// No designated key: every scalar member participates in the identity key.
#[derive(Debug, Default)]
pub struct Tag {
    pub label: String,
    pub color: String,
}

impl Entity for Tag {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Tag",
            new_node: Node::new::<Tag>,
            members: &[Member::scalar("label"), Member::scalar("color")],
            key: &[],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "label" => self.label = value.to_string()?,
            "color" => self.color = value.to_string()?,
            _ => rowgraft::bail!("`Tag` has no scalar member named `{member}`"),
        }
        Ok(())
    }
}

/// Nullable natural key: `code` may legitimately be NULL.
#[derive(Debug, Default)]
pub struct Customer {
    pub code: Option<String>,
}

impl Entity for Customer {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Customer",
            new_node: Node::new::<Customer>,
            members: &[Member::scalar("code")],
            key: &["code"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "code" => self.code = value.to_option_string()?,
            _ => rowgraft::bail!("`Customer` has no scalar member named `{member}`"),
        }
        Ok(())
    }
}

/// Three levels deep: invoice → entries → notes.
#[derive(Debug, Default)]
pub struct Invoice {
    pub invoice_id: i64,
    pub entries: Vec<Shared<InvoiceEntry>>,
}

#[derive(Debug, Default)]
pub struct InvoiceEntry {
    pub entry_id: i64,
    pub notes: Vec<Shared<NoteEntity>>,
}

#[derive(Debug, Default)]
pub struct NoteEntity {
    pub note: String,
}

impl Entity for Invoice {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "Invoice",
            new_node: Node::new::<Invoice>,
            members: &[
                Member::scalar("invoice_id"),
                Member::has_many::<InvoiceEntry>("entries"),
            ],
            key: &["invoice_id"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "invoice_id" => self.invoice_id = value.to_i64()?,
            _ => rowgraft::bail!("`Invoice` has no scalar member named `{member}`"),
        }
        Ok(())
    }

    fn attach(&mut self, member: &str, child: Node) -> Result<()> {
        match member {
            "entries" => self.entries.push(child.downcast::<InvoiceEntry>()?),
            _ => rowgraft::bail!("`Invoice` has no relation member named `{member}`"),
        }
        Ok(())
    }
}

impl Entity for InvoiceEntry {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "InvoiceEntry",
            new_node: Node::new::<InvoiceEntry>,
            members: &[
                Member::scalar("entry_id"),
                Member::has_many::<NoteEntity>("notes"),
            ],
            key: &["entry_id"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "entry_id" => self.entry_id = value.to_i64()?,
            _ => rowgraft::bail!("`InvoiceEntry` has no scalar member named `{member}`"),
        }
        Ok(())
    }

    fn attach(&mut self, member: &str, child: Node) -> Result<()> {
        match member {
            "notes" => self.notes.push(child.downcast::<NoteEntity>()?),
            _ => rowgraft::bail!("`InvoiceEntry` has no relation member named `{member}`"),
        }
        Ok(())
    }
}

impl Entity for NoteEntity {
    fn schema() -> &'static EntitySchema {
        static SCHEMA: EntitySchema = EntitySchema {
            name: "NoteEntity",
            new_node: Node::new::<NoteEntity>,
            members: &[Member::scalar("note")],
            key: &["note"],
        };
        &SCHEMA
    }

    fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
        match member {
            "note" => self.note = value.to_string()?,
            _ => rowgraft::bail!("`NoteEntity` has no scalar member named `{member}`"),
        }
        Ok(())
    }
}

/// Builds the flattened `order_id, order_date, line_id` row stream.
pub fn order_rows(rows: &[(i64, &str, &str)]) -> RowStream {
    let schema = RowSchema::new(["order_id", "order_date", "line_id"]);
    RowStream::from_vec(
        rows.iter()
            .map(|(id, date, line)| {
                Row::new(
                    schema.clone(),
                    vec![Value::I64(*id), Value::from(*date), Value::from(*line)],
                )
                .unwrap()
            })
            .collect(),
    )
}
