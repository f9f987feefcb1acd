//! Serve a rolodex directory over stdin and stdout.
//!
//! Each input line is a GraphQL request body, each output line the matching response body.

mod logging;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use rolodex::{config::SeedConfig, schema, Directory, Gateway};
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(
    name = "rolodex",
    version,
    about = "Answer GraphQL requests against an in-memory people directory"
)]
struct Args {
    /// Load the initial people from a TOML seed file instead of the built-in seed.
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,
    /// Print the schema in SDL form and exit.
    #[arg(long)]
    print_schema: bool,
    /// Tracing filter, e.g. `rolodex=debug`. Overrides `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Args::parse()).await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.print_schema {
        print!("{}", schema::print_schema());
        return Ok(());
    }

    logging::init(args.log.as_deref());

    let directory = match &args.seed {
        Some(path) => SeedConfig::load(path)?
            .into_directory()
            .with_context(|| format!("load seed file {}", path.display()))?,
        None => Directory::seeded()
    };
    tracing::info!(people = directory.len() as u64, "directory ready");

    let gateway = Gateway::builder(directory)
        .with_default_exchanges()
        .build();

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    while let Some(line) = lines.next_line().await.context("read request line")? {
        if let Some(response) = session::handle_line(&gateway, &line).await? {
            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
