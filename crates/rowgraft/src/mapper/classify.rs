use super::describe::{DescriptorTy, MemberDescriptor};
use crate::options::MapOptions;
use rowgraft_core::{
    schema::{EntitySchema, MemberTy},
    Error, Result,
};

/// Classifies every mapped member of `schema` into scalar vs. relation
/// descriptors, applying options overrides.
///
/// Members excluded by options or rejected by the conditional-mapping
/// predicate are skipped entirely. The nested types referenced by relation
/// members are not classified here; the descriptor cache handles them.
pub(crate) fn classify(
    schema: &'static EntitySchema,
    options: &MapOptions,
) -> Result<Vec<MemberDescriptor>> {
    validate_options(schema, options)?;

    let mut descriptors = Vec::with_capacity(schema.members.len());

    for member in schema.members {
        if options.is_excluded(schema.name, member.name) {
            continue;
        }
        if !options.accepts(schema.name, member) {
            continue;
        }

        let column = match options.rename_for(schema.name, member.name) {
            Some(column) => column.to_string(),
            None => member.storage_name().to_string(),
        };

        let ty = match &member.ty {
            MemberTy::Scalar => DescriptorTy::Scalar {
                converter: options.converter_for(schema.name, member.name),
                key: schema.is_key_member(member.name),
            },
            MemberTy::Relation(relation) => DescriptorTy::Relation {
                target: relation.target,
                many: relation.many,
            },
        };

        descriptors.push(MemberDescriptor {
            name: member.name,
            column,
            ty,
        });
    }

    Ok(descriptors)
}

/// Rejects options entries that reference schema elements the type does not
/// have. Runs before any row is processed.
fn validate_options(schema: &'static EntitySchema, options: &MapOptions) -> Result<()> {
    if let Some(renames) = options.renames.get(schema.name) {
        for member in renames.keys() {
            if schema.member(member).is_none() {
                return Err(Error::configuration(
                    schema.name,
                    member,
                    "rename targets a member the type does not have",
                ));
            }
        }
    }

    if let Some(excluded) = options.excluded.get(schema.name) {
        for member in excluded {
            if schema.member(member).is_none() {
                return Err(Error::configuration(
                    schema.name,
                    member,
                    "exclusion targets a member the type does not have",
                ));
            }
        }
    }

    if let Some(converters) = options.converters.get(schema.name) {
        for member in converters.keys() {
            match schema.member(member) {
                None => {
                    return Err(Error::configuration(
                        schema.name,
                        member,
                        "converter targets a member the type does not have",
                    ));
                }
                Some(m) if m.is_relation() => {
                    return Err(Error::configuration(
                        schema.name,
                        member,
                        "converter registered against a relation member",
                    ));
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgraft_core::{
        schema::{Entity, Member, Node},
        stmt::Value,
    };

    #[derive(Debug, Default)]
    struct Account {
        id: i64,
        email: String,
        internal: String,
    }

    impl Entity for Account {
        fn schema() -> &'static EntitySchema {
            static SCHEMA: EntitySchema = EntitySchema {
                name: "Account",
                new_node: Node::new::<Account>,
                members: &[
                    Member::scalar("id"),
                    Member::scalar("email").from_column("email_address"),
                    Member::scalar("internal"),
                ],
                key: &["id"],
            };
            &SCHEMA
        }

        fn set_scalar(&mut self, member: &str, value: Value) -> Result<()> {
            match member {
                "id" => self.id = value.to_i64()?,
                "email" => self.email = value.to_string()?,
                "internal" => self.internal = value.to_string()?,
                _ => crate::bail!("`Account` has no scalar member named `{member}`"),
            }
            Ok(())
        }
    }

    #[test]
    fn declared_rename_wins_over_member_name() {
        let members = classify(Account::schema(), &MapOptions::default()).unwrap();
        let email = members.iter().find(|m| m.name == "email").unwrap();
        assert_eq!(email.column, "email_address");
    }

    #[test]
    fn options_rename_wins_over_declared_rename() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.rename::<Account>("email", "contact_email");
            builder.build()
        };
        let members = classify(Account::schema(), &options).unwrap();
        let email = members.iter().find(|m| m.name == "email").unwrap();
        assert_eq!(email.column, "contact_email");
    }

    #[test]
    fn excluded_member_is_skipped() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.exclude::<Account>("internal");
            builder.build()
        };
        let members = classify(Account::schema(), &options).unwrap();
        assert!(members.iter().all(|m| m.name != "internal"));
    }

    #[test]
    fn conditional_predicate_filters_members() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.map_when(|_, member| member.name != "internal");
            builder.build()
        };
        let members = classify(Account::schema(), &options).unwrap();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn unresolved_converter_fails_fast() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.convert::<Account>("no_such_member", Ok);
            builder.build()
        };
        let err = classify(Account::schema(), &options).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn rename_of_unknown_member_fails_fast() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.rename::<Account>("no_such_member", "column");
            builder.build()
        };
        let err = classify(Account::schema(), &options).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn converter_is_attached_to_scalar() {
        let options = {
            let mut builder = MapOptions::builder();
            builder.convert::<Account>("email", |v| Ok(Value::from(v.to_string()?.to_lowercase())));
            builder.build()
        };
        let members = classify(Account::schema(), &options).unwrap();
        let email = members.iter().find(|m| m.name == "email").unwrap();
        match &email.ty {
            DescriptorTy::Scalar { converter, .. } => assert!(converter.is_some()),
            _ => panic!("email must classify as scalar"),
        }
    }
}
