use crate::{directory::Directory, error::ExchangeError, Location, Response};
use serde_json::{Map, Value};
use std::fmt;

pub type ExchangeResult = Result<OperationResult, ExchangeError>;

/// Field arguments after variables have been substituted.
pub type Arguments = Map<String, Value>;

/// A bi-directional middleware over lowered operations.
///
/// An exchange either answers the operation itself or forwards it to the next exchange and
/// acts on the result.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
    async fn run(&self, operation: Operation, directory: &Directory) -> ExchangeResult;
}

pub trait ExchangeFactory<TNext: Exchange> {
    type Output: Exchange;

    fn build(self, next: TNext) -> Self::Output;
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum OperationType {
    Query,
    Mutation
}

impl OperationType {
    /// The root type the operation's selection is resolved against.
    pub fn root_name(&self) -> &'static str {
        match self {
            OperationType::Query => "Query",
            OperationType::Mutation => "Mutation"
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Query => f.write_str("query"),
            OperationType::Mutation => f.write_str("mutation")
        }
    }
}

/// A single field in a lowered selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// The alias if there is one, the field name otherwise.
    pub response_key: String,
    pub name: String,
    pub arguments: Arguments,
    pub location: Location
}

/// A selection tree with fragments, directives and variables already resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSelector {
    /// A leaf field
    Scalar(Field),
    /// An object field (or list of objects) and its inner selection
    Object(Field, Vec<FieldSelector>)
}

impl FieldSelector {
    pub fn field(&self) -> &Field {
        match self {
            FieldSelector::Scalar(field) => field,
            FieldSelector::Object(field, _) => field
        }
    }

    pub fn selection(&self) -> &[FieldSelector] {
        match self {
            FieldSelector::Scalar(_) => &[],
            FieldSelector::Object(_, selection) => selection
        }
    }
}

#[derive(Clone, Debug)]
pub struct OperationMeta {
    /// Hash of the query text and variables.
    pub key: u64,
    pub operation_type: OperationType,
    pub operation_name: Option<String>,
    pub involved_types: Vec<&'static str>
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub meta: OperationMeta,
    pub selection: Vec<FieldSelector>
}

#[derive(Clone, Debug)]
pub struct OperationResult {
    pub meta: OperationMeta,
    pub response: Response<Value>
}
