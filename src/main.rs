mod cli;
mod config;
mod docker;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can raise the log level
    let cli = Cli::parse();
    utils::logger::init(cli.verbose)?;

    cli.execute().await
}
