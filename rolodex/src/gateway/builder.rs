use crate::{
    exchanges::{ResolveExchange, TerminatorExchange, TracingExchange},
    gateway::{Gateway, GatewayImpl},
    Directory, Exchange, ExchangeFactory
};
use std::sync::Arc;

pub struct GatewayBuilder<M: Exchange = TerminatorExchange> {
    exchange: M,
    directory: Directory
}

impl GatewayBuilder<TerminatorExchange> {
    pub fn new(directory: Directory) -> Self {
        GatewayBuilder {
            exchange: TerminatorExchange,
            directory
        }
    }
}

impl<M: Exchange> GatewayBuilder<M> {
    /// Add the default exchanges to the chain. Keep in mind that exchanges are executed bottom to top, so the first one added will be the last one executed.
    pub fn with_default_exchanges(self) -> GatewayBuilder<impl Exchange> {
        self.with_exchange(ResolveExchange)
            .with_exchange(TracingExchange)
    }

    /// Add an exchange to the chain. Keep in mind that exchanges are executed bottom to top, so the first one added will be the last one executed.
    pub fn with_exchange<F>(self, exchange_factory: F) -> GatewayBuilder<F::Output>
    where
        F: ExchangeFactory<M>
    {
        let exchange = exchange_factory.build(self.exchange);
        GatewayBuilder {
            exchange,
            directory: self.directory
        }
    }

    pub fn build(self) -> Gateway<M> {
        let gateway = GatewayImpl {
            exchange: self.exchange,
            directory: self.directory
        };

        Gateway(Arc::new(gateway))
    }
}
