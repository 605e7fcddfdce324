use clap::Parser;
use eyre::{eyre, Result};

use crate::config::NodeArgs;
use crate::engine::types::EstimatorError;
use crate::utils::format_timestamp;

#[derive(Clone, Debug, Parser)]
pub struct Args {
    /// Block number to look up (positive integer)
    pub block_num: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

/// Print the (estimated) timestamp of `args.block_num`.
pub async fn run(args: Args) -> Result<()> {
    let block_num = parse_block_num(&args.block_num)?;
    let estimator = super::build_estimator(&args.node)?;

    let timestamp = estimator
        .block_num_to_timestamp(block_num)
        .await
        .map_err(super::report)?;
    match timestamp {
        Some(ts) => {
            println!("{}", format_timestamp(&ts));
            Ok(())
        }
        None => Err(eyre!("Estimated timestamp for block {} is null.", block_num)),
    }
}

fn parse_block_num(raw: &str) -> std::result::Result<u64, EstimatorError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EstimatorError::InvalidInput(format!(
            "{:?} is not a valid block number",
            raw
        ))),
    }
}
