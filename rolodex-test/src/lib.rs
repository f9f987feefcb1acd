//! Typed operations and test helpers shared by the rolodex tests and benchmarks.

mod queries;
pub use queries::*;
use rolodex::{
    exchange::{Exchange, ExchangeFactory, ExchangeResult, Operation},
    Directory
};
use std::sync::{Arc, Mutex};

pub use queries::{all_people::AllPeople, edit_person::EditPerson};

pub type SyncCounter = Arc<Mutex<Counter>>;

#[derive(Debug)]
pub struct Counter {
    n: u32
}

impl Counter {
    pub fn sync() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self { n: 0 }))
    }

    pub fn inc_sync(counter: &Arc<Mutex<Self>>) {
        let mut this = counter.lock().unwrap();
        this.n += 1;
    }

    pub fn get_sync(counter: &Arc<Mutex<Self>>) -> u32 {
        counter.lock().unwrap().n
    }
}

/// Counts every operation that reaches it, then forwards.
pub struct CountingExchange(pub SyncCounter);

pub struct CountingExchangeImpl<TNext: Exchange> {
    counter: SyncCounter,
    next: TNext
}

impl<TNext: Exchange> ExchangeFactory<TNext> for CountingExchange {
    type Output = CountingExchangeImpl<TNext>;

    fn build(self, next: TNext) -> Self::Output {
        CountingExchangeImpl {
            counter: self.0,
            next
        }
    }
}

#[async_trait::async_trait]
impl<TNext: Exchange> Exchange for CountingExchangeImpl<TNext> {
    async fn run(&self, operation: Operation, directory: &Directory) -> ExchangeResult {
        Counter::inc_sync(&self.counter);
        self.next.run(operation, directory).await
    }
}
