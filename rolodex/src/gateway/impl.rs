use crate::{
    error::ErrorCode, request::prepare, Directory, Exchange, GraphQLQuery, QueryError, Request,
    Response
};
use serde_json::Value;

pub struct GatewayImpl<M: Exchange> {
    pub(crate) exchange: M,
    pub(crate) directory: Directory
}

impl<M: Exchange> GatewayImpl<M> {
    pub async fn execute(&self, request: Request) -> Response<Value> {
        let operation = match prepare(&request) {
            Ok(operation) => operation,
            Err(errors) => {
                debug!(
                    errors = errors.len() as u64,
                    operation_name = request.operation_name.as_deref().unwrap_or("<anonymous>"),
                    "request rejected"
                );
                return Response::from_errors(
                    errors.iter().map(ErrorCode::to_response_error).collect()
                );
            }
        };

        match self.exchange.run(operation, &self.directory).await {
            Ok(result) => result.response,
            Err(e) => {
                error!(error = %e, "exchange chain failed");
                Response::from_errors(vec![e.to_response_error()])
            }
        }
    }

    pub async fn query<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        let request = Q::build_query(variables).into_request()?;
        let operation = match prepare(&request) {
            Ok(operation) => operation,
            Err(errors) => {
                return Ok(Response::from_errors(
                    errors.iter().map(ErrorCode::to_response_error).collect()
                ))
            }
        };

        let response = self.exchange.run(operation, &self.directory).await?.response;
        let data = response
            .data
            .map(serde_json::from_value)
            .transpose()
            .map_err(QueryError::Decode)?;

        Ok(Response {
            data,
            errors: response.errors
        })
    }
}
