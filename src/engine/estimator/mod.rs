//! 区块号 / 时间戳估算器
//!
//! 每次调用都会新开一条连接, 取一次参考点, 然后按目标相对参考点的位置分三路:
//! 未来走纯算术推算, 过去查询节点并做一次修正, 相等直接返回参考点。

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::engine::source::{Connector, SourceGuard};
use crate::engine::types::{BlockInterval, EstimatorError, Reference, Result};

pub mod projection;
pub mod refinement;

pub use projection::*;
pub use refinement::*;

#[derive(Clone)]
pub struct Estimator {
    connector: Arc<dyn Connector>,
    interval: BlockInterval,
}

impl Estimator {
    pub fn new(connector: Arc<dyn Connector>, interval: BlockInterval) -> Self {
        Self { connector, interval }
    }

    /// 估算区块 `block_num` 的时间戳
    ///
    /// 过去的区块取节点上的真实时间戳, 节点没有该区块时返回 `None`。
    #[instrument(skip(self))]
    pub async fn block_num_to_timestamp(&self, block_num: u64) -> Result<Option<DateTime<Utc>>> {
        if block_num == 0 {
            return Err(EstimatorError::InvalidInput(
                "block number must be a positive integer".to_string(),
            ));
        }

        let (source, reference) = self.open_session().await?;
        let timestamp = if block_num > reference.block_num {
            debug!("target is ahead of reference, projecting forward");
            Some(estimate_future_timestamp(block_num, &reference, self.interval)?)
        } else if block_num < reference.block_num {
            debug!("target is behind reference, querying header");
            get_past_timestamp(&*source, block_num).await?
        } else {
            Some(reference.timestamp)
        };

        if timestamp.is_none() {
            info!(block_num, "node has no header for block");
        }
        Ok(timestamp)
    }

    /// 估算最早不早于 `timestamp` 的区块号 (可能带小数)
    ///
    /// 估算落在节点可查询范围之外时返回 `None`。
    #[instrument(skip(self))]
    pub async fn timestamp_to_block_num(&self, timestamp: DateTime<Utc>) -> Result<Option<f64>> {
        let (source, reference) = self.open_session().await?;
        let block_num = if timestamp > reference.timestamp {
            debug!("target is ahead of reference, projecting forward");
            Some(estimate_future_block_num(timestamp, &reference, self.interval))
        } else if timestamp < reference.timestamp {
            debug!("target is behind reference, refining from history");
            get_past_block_num(&*source, timestamp, &reference, self.interval).await?
        } else {
            // 毫秒精度的输入对上秒级精度的区块头, 实际上几乎不会相等
            Some(reference.block_num as f64)
        };

        if block_num.is_none() {
            info!("estimate falls outside queryable history");
        }
        Ok(block_num)
    }

    /// 打开新连接并获取参考点; 返回的守卫离开作用域时释放连接,
    /// 获取参考点失败时守卫在这里就被 drop
    async fn open_session(&self) -> Result<(SourceGuard, Reference)> {
        let source = SourceGuard::open(self.connector.as_ref()).await?;
        let reference = acquire_reference(&*source).await?;
        Ok((source, reference))
    }
}
