use clap::Parser;
use tracing::error;

use serp_forecast::cli::{Cli, run};
use serp_forecast::telemetry::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}
