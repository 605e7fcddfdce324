use clap::Parser;
use eyre::{eyre, Result};

use crate::config::NodeArgs;
use crate::utils::{format_timestamp, parse_user_timestamp};

#[derive(Clone, Debug, Parser)]
pub struct Args {
    /// ISO date / RFC 3339 timestamp, or a unix epoch number in ms
    pub timestamp: String,

    /// Print the fractional estimate instead of rounding up to a whole block
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub node: NodeArgs,
}

/// Print the estimated earliest block at or after `args.timestamp`.
pub async fn run(args: Args) -> Result<()> {
    let timestamp = parse_user_timestamp(&args.timestamp)?;
    let estimator = super::build_estimator(&args.node)?;

    let estimate = estimator
        .timestamp_to_block_num(timestamp)
        .await
        .map_err(super::report)?;
    let Some(block_num) = estimate else {
        return Err(eyre!(
            "Estimated block number for {} is null.",
            format_timestamp(&timestamp)
        ));
    };

    println!("{}", render_block_num(block_num, args.raw));
    Ok(())
}

fn render_block_num(block_num: f64, raw: bool) -> String {
    if raw {
        block_num.to_string()
    } else {
        format!("{}", block_num.ceil() as u64)
    }
}
