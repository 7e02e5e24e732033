use clap::Parser;
use gcodeview::cli::{self, Cli};
use gcodeview::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json)?;

    cli::run(cli).await
}
