//! Turning a wire [`Request`](../struct.Request.html) into a lowered
//! [`Operation`](../exchange/struct.Operation.html).
//!
//! This parses the document, picks the operation to run, coerces its variables and validates the
//! selection against the static schema. Anything that fails here never reaches an exchange.

use crate::{
    schema,
    types::{Operation, OperationMeta, OperationType},
    utils::{progressive_hash, query_key},
    Location, Request
};
use graphql_parser::{
    parse_query,
    query::{Definition, Document, FragmentDefinition, OperationDefinition, SelectionSet, VariableDefinition},
    Pos
};
use serde_json::Map;
use std::collections::HashMap;
use thiserror::Error;

mod lower;
mod variables;

use lower::Lowering;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("{0}")]
    Parse(String),
    #[error("Must provide an operation.")]
    NoOperation,
    #[error("Must provide operation name if query contains multiple operations.")]
    AmbiguousOperation,
    #[error("Unknown operation named \"{0}\".")]
    UnknownOperation(String),
    #[error("{message}")]
    Validation {
        message: String,
        locations: Vec<Location>
    },
    #[error("{message}")]
    Variable {
        message: String,
        locations: Vec<Location>
    }
}

impl RequestError {
    pub(crate) fn validation<M: Into<String>>(message: M, locations: Vec<Location>) -> Self {
        RequestError::Validation {
            message: message.into(),
            locations
        }
    }

    pub fn locations(&self) -> &[Location] {
        match self {
            RequestError::Validation { locations, .. } | RequestError::Variable { locations, .. } => {
                locations
            }
            _ => &[]
        }
    }
}

type Fragments<'d, 'a> = HashMap<&'a str, &'d FragmentDefinition<'a, &'a str>>;

/// The parts of an operation definition we care about, whichever form it was written in.
struct Selected<'d, 'a> {
    operation_type: Option<OperationType>,
    name: Option<&'a str>,
    position: Pos,
    variable_definitions: &'d [VariableDefinition<'a, &'a str>],
    selection_set: &'d SelectionSet<'a, &'a str>
}

impl<'d, 'a> From<&'d OperationDefinition<'a, &'a str>> for Selected<'d, 'a> {
    fn from(definition: &'d OperationDefinition<'a, &'a str>) -> Self {
        match definition {
            OperationDefinition::SelectionSet(selection_set) => Selected {
                operation_type: Some(OperationType::Query),
                name: None,
                position: selection_set.span.0,
                variable_definitions: &[],
                selection_set
            },
            OperationDefinition::Query(query) => Selected {
                operation_type: Some(OperationType::Query),
                name: query.name,
                position: query.position,
                variable_definitions: &query.variable_definitions,
                selection_set: &query.selection_set
            },
            OperationDefinition::Mutation(mutation) => Selected {
                operation_type: Some(OperationType::Mutation),
                name: mutation.name,
                position: mutation.position,
                variable_definitions: &mutation.variable_definitions,
                selection_set: &mutation.selection_set
            },
            OperationDefinition::Subscription(subscription) => Selected {
                operation_type: None,
                name: subscription.name,
                position: subscription.position,
                variable_definitions: &subscription.variable_definitions,
                selection_set: &subscription.selection_set
            }
        }
    }
}

fn select_operation<'d, 'a>(
    document: &'d Document<'a, &'a str>,
    operation_name: Option<&str>
) -> Result<Selected<'d, 'a>, RequestError> {
    let mut operations = document.definitions.iter().filter_map(|definition| match definition {
        Definition::Operation(operation) => Some(Selected::from(operation)),
        Definition::Fragment(_) => None
    });

    match operation_name {
        Some(wanted) => operations
            .find(|operation| operation.name == Some(wanted))
            .ok_or_else(|| RequestError::UnknownOperation(wanted.to_string())),
        None => {
            let first = operations.next().ok_or(RequestError::NoOperation)?;
            if operations.next().is_some() {
                return Err(RequestError::AmbiguousOperation);
            }
            Ok(first)
        }
    }
}

fn collect_fragments<'d, 'a>(
    document: &'d Document<'a, &'a str>
) -> Result<Fragments<'d, 'a>, Vec<RequestError>> {
    let mut fragments = HashMap::new();
    let mut errors = Vec::new();
    for definition in &document.definitions {
        if let Definition::Fragment(fragment) = definition {
            if let Some(previous) = fragments.insert(fragment.name, fragment) {
                errors.push(RequestError::validation(
                    format!("There can be only one fragment named \"{}\".", fragment.name),
                    vec![previous.position.into(), fragment.position.into()]
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(fragments)
    } else {
        Err(errors)
    }
}

/// Parse, select, coerce and validate. Every error found is returned, not just the first.
pub(crate) fn prepare(request: &Request) -> Result<Operation, Vec<RequestError>> {
    let document = parse_query::<&str>(&request.query)
        .map_err(|e| vec![RequestError::Parse(e.to_string())])?;
    let fragments = collect_fragments(&document)?;
    let selected = select_operation(&document, request.operation_name.as_deref())
        .map_err(|e| vec![e])?;

    let operation_type = selected.operation_type.ok_or_else(|| {
        vec![RequestError::validation(
            "Subscriptions are not supported.",
            vec![selected.position.into()]
        )]
    })?;

    let provided = request.variables.clone().unwrap_or_default();
    let variables = variables::coerce_variables(selected.variable_definitions, &provided)?;

    let root = schema::object(operation_type.root_name()).ok_or_else(|| {
        vec![RequestError::validation(
            format!("Schema has no root type for {} operations.", operation_type),
            vec![selected.position.into()]
        )]
    })?;

    let mut lowering = Lowering::new(&fragments, &variables, selected.variable_definitions);
    let selection = lowering.lower_selection_set(root, selected.selection_set);
    let involved_types = lowering.finish()?;

    let text_key = query_key(&request.query);
    let key = progressive_hash(text_key, &variables).unwrap_or_else(|_| u64::from(text_key));

    Ok(Operation {
        meta: OperationMeta {
            key,
            operation_type,
            operation_name: selected.name.map(str::to_string),
            involved_types
        },
        selection
    })
}

/// Variables after coercion. Variables that were neither provided nor defaulted are absent.
pub(crate) type CoercedVariables = Map<String, serde_json::Value>;
