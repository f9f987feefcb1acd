use crate::{
    directory::{Directory, PersonId, PersonRecord},
    error::{ErrorCode, ResolveError},
    schema::TYPENAME,
    types::{
        Arguments, Exchange, ExchangeFactory, ExchangeResult, Field, FieldSelector, Operation,
        OperationResult, OperationType
    },
    Error, PathFragment, Response
};
use serde_json::{Map, Value};

/// The default resolve exchange.
///
/// Answers the operation from the directory. It never forwards, so it should be the first
/// exchange added to the chain.
pub struct ResolveExchange;

impl<TNext: Exchange> ExchangeFactory<TNext> for ResolveExchange {
    type Output = ResolveExchange;

    fn build(self, _next: TNext) -> Self::Output {
        ResolveExchange
    }
}

fn string_argument(arguments: &Arguments, argument: &'static str) -> Result<String, ResolveError> {
    match arguments.get(argument) {
        Some(Value::String(value)) => Ok(value.clone()),
        None | Some(Value::Null) => Err(ResolveError::InvalidArgument {
            argument,
            reason: "a value is required".to_string()
        }),
        Some(other) => Err(ResolveError::InvalidArgument {
            argument,
            reason: format!("expected a string, got {}", other)
        })
    }
}

fn with_key(path: &[PathFragment], key: &str) -> Vec<PathFragment> {
    let mut path = path.to_vec();
    path.push(PathFragment::Key(key.to_string()));
    path
}

struct Resolver<'a> {
    directory: &'a Directory,
    errors: Vec<Error>
}

impl<'a> Resolver<'a> {
    fn fail(&mut self, error: ResolveError, field: &Field, path: Vec<PathFragment>) -> Value {
        debug!(error = %error, field = %field.name, "field failed");
        self.errors.push(
            error
                .to_response_error()
                .with_locations(vec![field.location])
                .with_path(path)
        );
        Value::Null
    }

    fn resolve_root(&mut self, operation_type: OperationType, selection: &[FieldSelector]) -> Value {
        let mut data = Map::new();
        // Mutation fields run one after another, in document order.
        for selector in selection {
            let key = &selector.field().response_key;
            let path = with_key(&[], key);
            let value = match operation_type {
                OperationType::Query => self.resolve_query_field(selector, path),
                OperationType::Mutation => self.resolve_mutation_field(selector, path)
            };
            data.insert(key.clone(), value);
        }
        Value::Object(data)
    }

    fn resolve_query_field(&mut self, selector: &FieldSelector, path: Vec<PathFragment>) -> Value {
        let field = selector.field();
        match field.name.as_str() {
            TYPENAME => Value::String("Query".to_string()),
            "people" => {
                let people = self.directory.list_people();
                let items = people
                    .iter()
                    .enumerate()
                    .map(|(index, person)| {
                        let mut path = path.clone();
                        path.push(PathFragment::Index(index as i32));
                        self.resolve_person(person, selector.selection(), &path)
                    })
                    .collect();
                Value::Array(items)
            }
            other => self.fail(
                ResolveError::UnknownField {
                    parent: "Query",
                    field: other.to_string()
                },
                field,
                path
            )
        }
    }

    fn resolve_mutation_field(&mut self, selector: &FieldSelector, path: Vec<PathFragment>) -> Value {
        let field = selector.field();
        match field.name.as_str() {
            TYPENAME => Value::String("Mutation".to_string()),
            "editPerson" => {
                let edited = string_argument(&field.arguments, "id").and_then(|id| {
                    let name = string_argument(&field.arguments, "name")?;
                    Ok(self.directory.edit_person(&PersonId::from(id), name)?)
                });
                match edited {
                    Ok(person) => self.resolve_person(&person, selector.selection(), &path),
                    Err(e) => self.fail(e, field, path)
                }
            }
            other => self.fail(
                ResolveError::UnknownField {
                    parent: "Mutation",
                    field: other.to_string()
                },
                field,
                path
            )
        }
    }

    fn resolve_person(
        &mut self,
        person: &PersonRecord,
        selection: &[FieldSelector],
        path: &[PathFragment]
    ) -> Value {
        let mut object = Map::new();
        for selector in selection {
            let field = selector.field();
            let value = match field.name.as_str() {
                TYPENAME => Value::String("Person".to_string()),
                "id" => Value::String(person.id.to_string()),
                "name" => Value::String(person.name.clone()),
                other => self.fail(
                    ResolveError::UnknownField {
                        parent: "Person",
                        field: other.to_string()
                    },
                    field,
                    with_key(path, &field.response_key)
                )
            };
            object.insert(field.response_key.clone(), value);
        }
        Value::Object(object)
    }
}

#[async_trait]
impl Exchange for ResolveExchange {
    async fn run(&self, operation: Operation, directory: &Directory) -> ExchangeResult {
        let mut resolver = Resolver {
            directory,
            errors: Vec::new()
        };
        let data = resolver.resolve_root(operation.meta.operation_type, &operation.selection);
        let errors = if resolver.errors.is_empty() {
            None
        } else {
            Some(resolver.errors)
        };

        Ok(OperationResult {
            meta: operation.meta,
            response: Response {
                data: Some(data),
                errors
            }
        })
    }
}
