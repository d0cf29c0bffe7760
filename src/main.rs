use anyhow::Result;
use mailrelay::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
