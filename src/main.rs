use clap::Parser;
use lidar_archiver::cli::{run, Cli};
use lidar_archiver::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
