use anyhow::Result;
use clap::Parser;
use coinbook::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    cli.run().await
}
