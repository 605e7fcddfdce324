use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;

use crate::utils::time::node_timestamp;

/// 默认平均出块间隔 (毫秒)
pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 3000;

/// 参考点: 一次调用开始时节点报告的不可逆区块及其时间戳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub block_num: u64,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} @ {}", self.block_num, self.timestamp.to_rfc3339())
    }
}

/// 区块头 (只关心时间戳, 其余字段忽略)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    #[serde(deserialize_with = "node_timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// 平均出块间隔
///
/// 进程内固定不变, 所有估算共享同一个值, 不会根据链上数据动态校准。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInterval(u64);

impl BlockInterval {
    /// 创建出块间隔, 0 毫秒无意义
    pub fn from_millis(ms: u64) -> Result<Self> {
        if ms == 0 {
            return Err(EstimatorError::ConfigError(
                "block interval must be greater than 0 ms".to_string(),
            ));
        }
        Ok(Self(ms))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// `later - earlier` 对应的区块数 (可为小数, 可为负)
    pub fn blocks_between(&self, later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
        (later - earlier).num_milliseconds() as f64 / self.0 as f64
    }

    /// `blocks` 个区块对应的时长, 溢出时返回 `None`
    pub fn span(&self, blocks: i64) -> Option<Duration> {
        i64::try_from(self.0)
            .ok()
            .and_then(|ms| ms.checked_mul(blocks))
            .and_then(Duration::try_milliseconds)
    }
}

impl Default for BlockInterval {
    fn default() -> Self {
        Self(DEFAULT_BLOCK_INTERVAL_MS)
    }
}

/// 错误类型
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC call failed: {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    ParseResponse(String),

    #[error("Connection already closed")]
    ConnectionClosed,

    #[error("Node reported block {0} as irreversible but returned no header for it")]
    MissingReferenceHeader(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EstimatorError {
    /// 是否为数据源 (节点往返) 失败
    pub fn is_data_source_failure(&self) -> bool {
        !matches!(
            self,
            EstimatorError::InvalidInput(_) | EstimatorError::ConfigError(_)
        )
    }
}

impl From<serde_json::Error> for EstimatorError {
    fn from(e: serde_json::Error) -> Self {
        EstimatorError::ParseResponse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
