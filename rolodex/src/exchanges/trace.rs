use crate::{
    directory::Directory,
    types::{Exchange, ExchangeFactory, ExchangeResult, Operation}
};
use std::time::Instant;
use tracing::Instrument;

/// Logs every operation passing through it.
///
/// Each operation runs inside an `operation` span carrying its key, type and name. Completion is
/// logged at `debug`, failures of the chain at `warn`.
pub struct TracingExchange;

pub struct TracingExchangeImpl<TNext: Exchange> {
    next: TNext
}

impl<TNext: Exchange> ExchangeFactory<TNext> for TracingExchange {
    type Output = TracingExchangeImpl<TNext>;

    fn build(self, next: TNext) -> Self::Output {
        TracingExchangeImpl { next }
    }
}

#[async_trait]
impl<TNext: Exchange> Exchange for TracingExchangeImpl<TNext> {
    async fn run(&self, operation: Operation, directory: &Directory) -> ExchangeResult {
        let span = info_span!(
            "operation",
            key = operation.meta.key,
            kind = %operation.meta.operation_type,
            name = operation.meta.operation_name.as_deref().unwrap_or("<anonymous>")
        );
        let started = Instant::now();
        let involved_types = operation.meta.involved_types.join(",");

        let result = self
            .next
            .run(operation, directory)
            .instrument(span.clone())
            .await;

        let elapsed_us = started.elapsed().as_micros() as u64;
        span.in_scope(|| match &result {
            Ok(result) => debug!(
                errors = result.response.errors().len() as u64,
                types = %involved_types,
                elapsed_us,
                "operation completed"
            ),
            Err(e) => warn!(error = %e, elapsed_us, "operation failed")
        });

        result
    }
}

#[cfg(test)]
mod test {
    use super::TracingExchange;
    use crate::{
        exchanges::{ResolveExchange, TerminatorExchange},
        request::prepare,
        types::{Exchange, ExchangeFactory},
        Directory, ExchangeError, Request
    };

    #[tokio::test]
    async fn passes_results_through() {
        let directory = Directory::seeded();
        let exchange = TracingExchange.build(ResolveExchange.build(TerminatorExchange));
        let operation = prepare(&Request::new("{ people { id } }")).unwrap();
        let result = exchange.run(operation, &directory).await.unwrap();
        assert_eq!(result.response.data.unwrap()["people"][2]["id"], "3");
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let directory = Directory::seeded();
        let exchange = TracingExchange.build(TerminatorExchange);
        let operation = prepare(&Request::new("{ people { id } }")).unwrap();
        match exchange.run(operation, &directory).await {
            Err(ExchangeError::UnexpectedEndOfChain) => {}
            other => panic!("unexpected result: {:?}", other.map(|r| r.response))
        }
    }
}
