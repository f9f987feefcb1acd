//! Diagnostics for the server binary.
//!
//! Everything goes to stderr so stdout only ever carries responses.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// An explicit filter wins over `RUST_LOG`. Defaults to `warn` if neither is set.
///
/// # Example
/// ```bash
/// RUST_LOG=rolodex=debug rolodex < requests.jsonl
/// ```
pub fn init(filter: Option<&str>) {
    let filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
