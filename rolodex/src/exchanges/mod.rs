//! The built-in exchanges.

use crate::{
    directory::Directory,
    error::ExchangeError,
    types::{Exchange, ExchangeResult, Operation}
};

mod resolve;
mod trace;

pub use resolve::ResolveExchange;
pub use trace::{TracingExchange, TracingExchangeImpl};

/// The terminating exchange.
/// This will always be the last exchange in the chain and will simply return an error if called.
pub struct TerminatorExchange;

#[async_trait]
impl Exchange for TerminatorExchange {
    async fn run(&self, _operation: Operation, _directory: &Directory) -> ExchangeResult {
        Err(ExchangeError::UnexpectedEndOfChain)
    }
}
