//! The static schema served by the gateway.
//!
//! ```graphql
//! type Person {
//!   id: ID
//!   name: String
//! }
//!
//! type Query {
//!   people: [Person]
//! }
//!
//! type Mutation {
//!   editPerson(id: String, name: String): Person
//! }
//! ```

use std::fmt;

pub const TYPENAME: &str = "__typename";

/// Built-in scalars that may appear in variable definitions.
pub const SCALARS: [&str; 5] = ["String", "ID", "Int", "Float", "Boolean"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeRef {
    Named(&'static str),
    List(&'static TypeRef)
}

impl TypeRef {
    /// The innermost named type.
    pub fn named(&self) -> &'static str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) => inner.named()
        }
    }

    pub fn is_leaf(&self) -> bool {
        SCALARS.contains(&self.named())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{}]", inner)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ArgumentDef {
    pub name: &'static str,
    pub ty: TypeRef
}

#[derive(Debug, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: TypeRef,
    pub arguments: &'static [ArgumentDef]
}

impl FieldDef {
    pub fn argument(&self, name: &str) -> Option<&'static ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, PartialEq)]
pub struct ObjectDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef]
}

impl ObjectDef {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub static PERSON: ObjectDef = ObjectDef {
    name: "Person",
    fields: &[
        FieldDef {
            name: "id",
            ty: TypeRef::Named("ID"),
            arguments: &[]
        },
        FieldDef {
            name: "name",
            ty: TypeRef::Named("String"),
            arguments: &[]
        }
    ]
};

pub static QUERY: ObjectDef = ObjectDef {
    name: "Query",
    fields: &[FieldDef {
        name: "people",
        ty: TypeRef::List(&TypeRef::Named("Person")),
        arguments: &[]
    }]
};

pub static MUTATION: ObjectDef = ObjectDef {
    name: "Mutation",
    fields: &[FieldDef {
        name: "editPerson",
        ty: TypeRef::Named("Person"),
        arguments: &[
            ArgumentDef {
                name: "id",
                ty: TypeRef::Named("String")
            },
            ArgumentDef {
                name: "name",
                ty: TypeRef::Named("String")
            }
        ]
    }]
};

static OBJECTS: [&ObjectDef; 3] = [&PERSON, &QUERY, &MUTATION];

pub fn object(name: &str) -> Option<&'static ObjectDef> {
    OBJECTS.iter().copied().find(|object| object.name == name)
}

pub fn is_known_type(name: &str) -> bool {
    SCALARS.contains(&name) || object(name).is_some()
}

/// Render the schema as SDL.
pub fn print_schema() -> String {
    OBJECTS
        .iter()
        .map(|object| {
            let fields: Vec<String> = object
                .fields
                .iter()
                .map(|field| {
                    if field.arguments.is_empty() {
                        format!("  {}: {}", field.name, field.ty)
                    } else {
                        let args: Vec<String> = field
                            .arguments
                            .iter()
                            .map(|arg| format!("{}: {}", arg.name, arg.ty))
                            .collect();
                        format!("  {}({}): {}", field.name, args.join(", "), field.ty)
                    }
                })
                .collect();
            format!("type {} {{\n{}\n}}\n", object.name, fields.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prints_sdl() {
        let expected = "type Person {\n  id: ID\n  name: String\n}\n\n\
                        type Query {\n  people: [Person]\n}\n\n\
                        type Mutation {\n  editPerson(id: String, name: String): Person\n}\n";
        assert_eq!(print_schema(), expected);
    }

    #[test]
    fn sdl_parses() {
        let sdl = print_schema();
        assert!(graphql_parser::parse_schema::<&str>(&sdl).is_ok());
    }

    #[test]
    fn looks_up_fields() {
        let people = QUERY.field("people").unwrap();
        assert_eq!(people.ty.named(), "Person");
        assert!(!people.ty.is_leaf());
        assert!(PERSON.field("id").unwrap().ty.is_leaf());
        assert!(MUTATION.field("editPerson").unwrap().argument("name").is_some());
        assert!(object("Subscription").is_none());
    }
}
