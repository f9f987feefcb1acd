//! An in-memory people directory behind a small GraphQL gateway.
//!
//! # Getting Started
//!
//! Build a gateway over a seeded [`Directory`](directory/struct.Directory.html) and send it
//! requests:
//!
//! ```
//! # tokio_test::block_on(async {
//! use rolodex::{Directory, Gateway, Request};
//! use serde_json::json;
//!
//! let gateway = Gateway::builder(Directory::seeded())
//!     .with_default_exchanges()
//!     .build();
//!
//! let response = gateway
//!     .execute(Request::new("{ people { id name } }"))
//!     .await;
//!
//! assert!(response.errors.is_none());
//! assert_eq!(
//!     response.data.unwrap()["people"][0],
//!     json!({ "id": "1", "name": "John Smith" })
//! );
//! # });
//! ```
//!
//! Typed callers can implement [`GraphQLQuery`](trait.GraphQLQuery.html) for their operations
//! and use [`Gateway::query`](struct.Gateway.html#method.query) to get decoded data back.
//!
//! # Exchanges
//!
//! Exchanges are middleware over a lowered [`Operation`](exchange/struct.Operation.html).
//! Each one either answers the operation itself or passes it on to the next one.
//!
//! There are two default exchanges, called in this order:
//!
//! ## TracingExchange
//!
//! Opens a `tracing` span for each operation and logs how it went.
//!
//! ## ResolveExchange
//!
//! Resolves the selection tree against the directory. This should be the last exchange in the
//! chain, as it never forwards an operation.
//!
//! # Consistency
//!
//! The directory applies every edit under an exclusive lock before the mutation's response is
//! produced, so any request issued after that response was received observes the edit. The
//! gateway does no caching of its own.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate tracing;

use std::{collections::HashMap, fmt, fmt::Display};

pub mod config;
pub mod directory;
mod error;
pub mod exchanges;
mod gateway;
mod request;
pub mod schema;
pub(crate) mod types;
pub mod utils;

pub use directory::{Directory, DirectoryError, PersonId, PersonRecord};
pub use error::{ErrorCode, ExchangeError, QueryError, ResolveError};
pub use gateway::{Gateway, GatewayBuilder, GatewayImpl};
pub use request::RequestError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
pub use types::{Exchange, ExchangeFactory};

/// Types used by custom exchanges. Regular users probably don't need these.
pub mod exchange {
    pub use crate::types::{
        Arguments, Exchange, ExchangeFactory, ExchangeResult, Field, FieldSelector, Operation,
        OperationMeta, OperationResult, OperationType
    };
}

/// A request as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The GraphQL document, as a string.
    pub query: String,
    /// Values for the variables declared by the selected operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    /// Which operation in the document to run. Only needed if there is more than one.
    #[serde(
        default,
        rename = "operationName",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>
}

impl Request {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        Request {
            query: query.into(),
            variables: None,
            operation_name: None
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_operation_name<N: Into<String>>(mut self, operation_name: N) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// The typed form of a request. This will be built using the [GraphQLQuery](./trait.GraphQLQuery.html) trait normally.
#[derive(Debug, Serialize, Clone)]
pub struct QueryBody<Variables: Serialize + Send + Sync + Clone> {
    /// The values for the variables. They must match those declared in the query.
    pub variables: Variables,
    /// The GraphQL query, as a string.
    pub query: &'static str,
    /// The GraphQL operation name, as a string.
    #[serde(rename = "operationName")]
    pub operation_name: &'static str
}

impl<Variables: Serialize + Send + Sync + Clone> QueryBody<Variables> {
    /// Turn the typed body into a wire request. Variables must serialize to an object or `null`.
    pub fn into_request(self) -> Result<Request, QueryError> {
        let variables = match serde_json::to_value(&self.variables).map_err(QueryError::Encode)? {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => return Err(QueryError::InvalidVariables(other))
        };

        Ok(Request {
            query: self.query.to_string(),
            variables,
            operation_name: Some(self.operation_name.to_string())
        })
    }
}

/// A statically known operation with typed variables and response data.
pub trait GraphQLQuery: Send + Sync + 'static {
    /// The shape of the variables expected by the operation.
    type Variables: Serialize + Send + Sync + Clone + 'static;
    /// The top-level shape of the response data (the `data` field in the GraphQL response).
    type ResponseData: DeserializeOwned + Send + Sync + Clone + 'static;

    /// Produce the request body for this operation.
    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables>;
}

/// The generic shape taken by GraphQL responses.
///
/// [Spec](https://github.com/facebook/graphql/blob/master/spec/Section%207%20--%20Response.md)
///
/// `data` is left out entirely when the request failed before execution started, `errors` is
/// left out when there were none.
///
/// ```
/// # use serde_json::json;
/// use rolodex::{Error, PathFragment, Response};
///
/// let response: Response<serde_json::Value> = Response {
///     data: Some(json!({ "editPerson": null })),
///     errors: Some(vec![Error::new("No person found with id \"99\"")
///         .with_path(vec![PathFragment::Key("editPerson".into())])
///         .with_code("NOT_FOUND")])
/// };
///
/// assert_eq!(
///     serde_json::to_value(&response).unwrap(),
///     json!({
///         "data": { "editPerson": null },
///         "errors": [{
///             "message": "No person found with id \"99\"",
///             "path": ["editPerson"],
///             "extensions": { "code": "NOT_FOUND" }
///         }]
///     })
/// );
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Response<Data: Clone> {
    /// The absent, partial or complete response data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    /// The top-level errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Error>>
}

impl<Data: Clone> Response<Data> {
    /// A response for a request that never reached execution.
    pub fn from_errors(errors: Vec<Error>) -> Self {
        Response {
            data: None,
            errors: Some(errors)
        }
    }

    pub fn errors(&self) -> &[Error] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

/// An element in the top-level `errors` array of a response body.
///
/// [Spec](https://github.com/facebook/graphql/blob/master/spec/Section%207%20--%20Response.md)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    /// The human-readable error message. This is the only required field.
    pub message: String,
    /// Which locations in the query the error applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    /// Which path in the response the error applies to, e.g. `["people", 0, "name"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathFragment>>,
    /// Additional information. Always carries a machine-readable `code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<HashMap<String, Value>>
}

impl Error {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Error {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None
        }
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        if !locations.is_empty() {
            self.locations = Some(locations);
        }
        self
    }

    pub fn with_path(mut self, path: Vec<PathFragment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions
            .get_or_insert_with(HashMap::new)
            .insert("code".to_string(), Value::String(code.to_string()));
        self
    }

    /// The `extensions.code` of this error, if any.
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"))
            .and_then(Value::as_str)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use `/` as a separator like JSON Pointer.
        let path = self
            .path
            .as_ref()
            .map(|fragments| {
                fragments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "<query>".to_string());

        // Get the location of the error. We'll use just the first location for this.
        let loc = self
            .locations
            .as_ref()
            .and_then(|locations| locations.iter().next())
            .cloned()
            .unwrap_or_default();

        write!(f, "{}:{}:{}: {}", path, loc.line, loc.column, self.message)
    }
}

/// Part of a path in a response. It can be an object key or an array index. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathFragment {
    /// A key inside an object
    Key(String),
    /// An index inside an array
    Index(i32)
}

impl Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathFragment::Key(ref key) => write!(f, "{}", key),
            PathFragment::Index(ref idx) => write!(f, "{}", idx)
        }
    }
}

/// Represents a location inside a query string. Used in errors. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// The line number in the query string where the error originated (starting from 1).
    pub line: i32,
    /// The column number in the query string where the error originated (starting from 1).
    pub column: i32
}

impl From<graphql_parser::Pos> for Location {
    fn from(pos: graphql_parser::Pos) -> Self {
        Location {
            line: pos.line as i32,
            column: pos.column as i32
        }
    }
}
