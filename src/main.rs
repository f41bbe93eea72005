use clap::Parser;

use finsum::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    cli::run(cli).await
}
