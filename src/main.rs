mod config;
mod engine;
mod tools;
mod utils;

use clap::Parser;
use eyre::Result;

#[derive(clap::Parser)]
#[command(version, about = "Estimate Hive block numbers from timestamps and back")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Print the timestamp of a block; future blocks are projected from the average block interval
    BlockToTs(tools::block_to_ts::Args),
    /// Print the earliest block estimated to be at or after a timestamp
    TsToBlock(tools::ts_to_block::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    match args.command {
        Command::BlockToTs(args) => tools::block_to_ts::run(args).await,
        Command::TsToBlock(args) => tools::ts_to_block::run(args).await,
    }
}
