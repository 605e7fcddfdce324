use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::engine::types::{BlockInterval, EstimatorError, Result, DEFAULT_BLOCK_INTERVAL_MS};

/// 默认 Hive 节点
pub const DEFAULT_RPC_URL: &str = "https://api.hive.blog";

/// 节点与估算参数, 命令行优先, 其次环境变量 (含 .env)
#[derive(Clone, Debug, Parser)]
#[command(about = "Node configuration")]
pub struct NodeArgs {
    #[arg(long, env = "HIVE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Average block production interval in milliseconds
    #[arg(long, env = "BLOCK_INTERVAL_MS", default_value_t = DEFAULT_BLOCK_INTERVAL_MS)]
    pub block_interval_ms: u64,

    /// Per-request timeout for node round trips
    #[arg(long, env = "RPC_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// 校验后的运行配置
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub rpc_url: Url,
    pub block_interval: BlockInterval,
    pub timeout: Option<Duration>,
}

impl EstimatorConfig {
    pub fn from_args(args: &NodeArgs) -> Result<Self> {
        let rpc_url = Url::parse(&args.rpc_url)
            .map_err(|e| EstimatorError::ConfigError(format!("Invalid RPC URL {:?}: {}", args.rpc_url, e)))?;
        if !matches!(rpc_url.scheme(), "http" | "https") {
            return Err(EstimatorError::ConfigError(format!(
                "RPC URL must be http or https, got {:?}",
                rpc_url.scheme()
            )));
        }

        let block_interval = BlockInterval::from_millis(args.block_interval_ms)?;

        let timeout = match args.timeout_secs {
            Some(0) => {
                return Err(EstimatorError::ConfigError(
                    "RPC timeout must be greater than 0 seconds".to_string(),
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            rpc_url,
            block_interval,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> NodeArgs {
        NodeArgs {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            block_interval_ms: DEFAULT_BLOCK_INTERVAL_MS,
            timeout_secs: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EstimatorConfig::from_args(&args()).unwrap();
        assert_eq!(config.rpc_url.as_str(), "https://api.hive.blog/");
        assert_eq!(config.block_interval.as_millis(), 3000);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_parse_from_cli() {
        let parsed = NodeArgs::try_parse_from([
            "node",
            "--rpc-url",
            "http://localhost:8091",
            "--block-interval-ms",
            "1500",
            "--timeout-secs",
            "10",
        ])
        .unwrap();
        let config = EstimatorConfig::from_args(&parsed).unwrap();
        assert_eq!(config.rpc_url.port(), Some(8091));
        assert_eq!(config.block_interval.as_millis(), 1500);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut args = args();
        args.block_interval_ms = 0;
        assert!(matches!(
            EstimatorConfig::from_args(&args),
            Err(EstimatorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut args = args();
        args.rpc_url = "not a url".to_string();
        assert!(EstimatorConfig::from_args(&args).is_err());

        args.rpc_url = "ws://api.hive.blog".to_string();
        assert!(matches!(
            EstimatorConfig::from_args(&args),
            Err(EstimatorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut args = args();
        args.timeout_secs = Some(0);
        assert!(EstimatorConfig::from_args(&args).is_err());
    }
}
