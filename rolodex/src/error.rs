use crate::{directory::DirectoryError, request::RequestError, Error};
use serde_json::Value;
use thiserror::Error;

/// Errors that carry a machine-readable code for the `extensions.code` of a response error.
pub trait ErrorCode: std::error::Error {
    fn code(&self) -> &'static str;

    /// The response error for this failure, without locations or path.
    fn to_response_error(&self) -> Error {
        Error::new(self.to_string()).with_code(self.code())
    }
}

/// A failure of the exchange chain itself, as opposed to a field error.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    #[error("unexpected end of exchange chain")]
    UnexpectedEndOfChain
}

impl ErrorCode for ExchangeError {
    fn code(&self) -> &'static str {
        "INTERNAL_SERVER_ERROR"
    }
}

/// A field could not be resolved. The field becomes `null` and the error is reported.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Invalid argument \"{argument}\": {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String
    },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("Cannot resolve field \"{field}\" on type \"{parent}\"")]
    UnknownField {
        parent: &'static str,
        field: String
    }
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            ResolveError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ResolveError::Directory(e) => ErrorCode::code(e),
            ResolveError::UnknownField { .. } => "INTERNAL_SERVER_ERROR"
        }
    }
}

impl ErrorCode for DirectoryError {
    fn code(&self) -> &'static str {
        match self {
            DirectoryError::NotFound(_) => "NOT_FOUND",
            DirectoryError::DuplicateId(_) => "DUPLICATE_ID"
        }
    }
}

impl ErrorCode for RequestError {
    fn code(&self) -> &'static str {
        match self {
            RequestError::Parse(_) => "GRAPHQL_PARSE_FAILED",
            RequestError::Validation { .. } => "GRAPHQL_VALIDATION_FAILED",
            _ => "BAD_USER_INPUT"
        }
    }

    fn to_response_error(&self) -> Error {
        Error::new(self.to_string())
            .with_locations(self.locations().to_vec())
            .with_code(self.code())
    }
}

/// Errors returned to typed callers of [`Gateway::query`](struct.Gateway.html#method.query).
///
/// GraphQL errors are not in here, they are part of the returned response.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("failed to encode variables: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("variables must serialize to an object or null, got {0}")]
    InvalidVariables(Value),
    #[error("failed to decode response data: {0}")]
    Decode(#[source] serde_json::Error)
}

#[cfg(test)]
mod test {
    use super::{ErrorCode, ExchangeError, ResolveError};
    use crate::{DirectoryError, PersonId};

    #[test]
    fn maps_codes() {
        let not_found = ResolveError::from(DirectoryError::NotFound(PersonId::from("99")));
        assert_eq!(not_found.code(), "NOT_FOUND");
        assert_eq!(not_found.to_string(), "No person found with id \"99\"");

        let invalid = ResolveError::InvalidArgument {
            argument: "name",
            reason: "a value is required".to_string()
        };
        let error = invalid.to_response_error();
        assert_eq!(error.code(), Some("INVALID_ARGUMENT"));
        assert_eq!(error.message, "Invalid argument \"name\": a value is required");

        assert_eq!(
            ExchangeError::UnexpectedEndOfChain.code(),
            "INTERNAL_SERVER_ERROR"
        );
    }
}
