//! 参考点获取与反向修正: 需要查询节点

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::source::BlockSource;
use crate::engine::types::{BlockInterval, EstimatorError, Reference, Result};

/// 获取参考点: 当前不可逆区块号及其时间戳
pub async fn acquire_reference(source: &dyn BlockSource) -> Result<Reference> {
    let block_num = source.get_current_irreversible_block_num().await?;
    let header = source
        .get_block_header(block_num)
        .await?
        .ok_or(EstimatorError::MissingReferenceHeader(block_num))?;

    let reference = Reference {
        block_num,
        timestamp: header.timestamp,
    };
    debug!(%reference, "reference acquired");
    Ok(reference)
}

/// 查询历史区块的真实时间戳, 区块不存在时返回 `None`
pub async fn get_past_timestamp(
    source: &dyn BlockSource,
    block_num: u64,
) -> Result<Option<DateTime<Utc>>> {
    let header = source.get_block_header(block_num).await?;
    Ok(header.map(|h| h.timestamp))
}

/// 估算最早不早于 `timestamp` 的区块号
///
/// 先按平均间隔线性估算并查询该区块的真实时间戳; 若真实时间早于目标,
/// 再按差值做一次算术修正 (不再查询)。只修正一次, 出块速率波动较大时结果仍可能偏差。
pub async fn get_past_block_num(
    source: &dyn BlockSource,
    timestamp: DateTime<Utc>,
    reference: &Reference,
    interval: BlockInterval,
) -> Result<Option<f64>> {
    let delta = interval.blocks_between(reference.timestamp, timestamp);
    let block_num = (reference.block_num as f64 - delta).round();
    if block_num < 1.0 {
        debug!(block_num, "estimate falls before chain start");
        return Ok(None);
    }

    let Some(revised_timestamp) = get_past_timestamp(source, block_num as u64).await? else {
        debug!(block_num, "no header at estimated block");
        return Ok(None);
    };

    if revised_timestamp < timestamp {
        let correction = interval.blocks_between(timestamp, revised_timestamp);
        debug!(block_num, %revised_timestamp, correction, "estimate undershot, correcting");
        return Ok(Some(block_num + correction));
    }
    Ok(Some(block_num))
}
