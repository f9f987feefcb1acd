use std::sync::Arc;

mod builder;
mod r#impl;

use crate::{
    exchanges::TerminatorExchange, Directory, Exchange, GraphQLQuery, QueryError, Request,
    Response
};
pub use builder::GatewayBuilder;
pub use r#impl::GatewayImpl;
use serde_json::Value;

/// The request gateway. Cheap to clone, every clone shares the same directory and exchanges.
#[repr(transparent)]
pub struct Gateway<M: Exchange = TerminatorExchange>(pub Arc<GatewayImpl<M>>);

impl<M: Exchange> Clone for Gateway<M> {
    fn clone(&self) -> Self {
        Gateway(self.0.clone())
    }
}

impl Gateway {
    pub fn builder(directory: Directory) -> GatewayBuilder {
        GatewayBuilder::new(directory)
    }
}

impl<M: Exchange> Gateway<M> {
    /// Run a wire request. Failures are reported inside the response.
    pub async fn execute(&self, request: Request) -> Response<Value> {
        self.0.execute(request).await
    }

    /// Run a typed operation and decode its data.
    pub async fn query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.query::<Q>(variables).await
    }

    pub fn directory(&self) -> &Directory {
        &self.0.directory
    }
}
