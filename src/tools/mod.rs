//! 命令行子命令

pub mod block_to_ts;
pub mod ts_to_block;

use std::sync::Arc;

use eyre::{Report, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{EstimatorConfig, NodeArgs};
use crate::engine::{Estimator, EstimatorError, HiveConnector};

/// 日志输出到 stderr, stdout 只留结果; `RUST_LOG` 优先于 `--log-level`
fn init_logger(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_estimator(args: &NodeArgs) -> Result<Estimator> {
    init_logger(&args.log_level);

    let config = EstimatorConfig::from_args(args)?;
    debug!(
        rpc_url = %config.rpc_url,
        interval_ms = config.block_interval.as_millis(),
        timeout = ?config.timeout,
        "estimator configured"
    );

    let connector = HiveConnector::new(config.rpc_url, config.timeout);
    Ok(Estimator::new(Arc::new(connector), config.block_interval))
}

/// 节点往返失败时补充上下文, 输入错误原样上报
fn report(err: EstimatorError) -> Report {
    if err.is_data_source_failure() {
        Report::new(err).wrap_err("node request failed")
    } else {
        Report::new(err)
    }
}
