//! 正向推算: 目标在参考点之后, 纯算术, 不访问节点

use chrono::{DateTime, Utc};

use crate::engine::types::{BlockInterval, EstimatorError, Reference, Result};

/// 按平均出块间隔推算未来区块的时间戳
///
/// 区块号过大, 推算结果超出可表示的时间范围时返回 `InvalidInput`。
pub fn estimate_future_timestamp(
    block_num: u64,
    reference: &Reference,
    interval: BlockInterval,
) -> Result<DateTime<Utc>> {
    let out_of_range = || {
        EstimatorError::InvalidInput(format!(
            "block {} is too far from reference block {} to estimate",
            block_num, reference.block_num
        ))
    };

    let difference = i64::try_from(block_num)
        .ok()
        .zip(i64::try_from(reference.block_num).ok())
        .and_then(|(target, anchor)| target.checked_sub(anchor))
        .ok_or_else(out_of_range)?;
    interval
        .span(difference)
        .and_then(|span| reference.timestamp.checked_add_signed(span))
        .ok_or_else(out_of_range)
}

/// 推算未来时间点对应的区块号, 结果可能带小数
pub fn estimate_future_block_num(
    timestamp: DateTime<Utc>,
    reference: &Reference,
    interval: BlockInterval,
) -> f64 {
    reference.block_num as f64 + interval.blocks_between(timestamp, reference.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference() -> Reference {
        Reference {
            block_num: 1000,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_future_timestamp_is_linear() {
        let r = reference();
        let interval = BlockInterval::default();

        for target in [1001u64, 1500, 1_000_000] {
            let expected = r.timestamp + Duration::milliseconds(3000 * (target as i64 - 1000));
            assert_eq!(estimate_future_timestamp(target, &r, interval).unwrap(), expected);
        }
    }

    #[test]
    fn test_future_timestamp_custom_interval() {
        let r = reference();
        let interval = BlockInterval::from_millis(400).unwrap();
        assert_eq!(
            estimate_future_timestamp(1010, &r, interval).unwrap(),
            r.timestamp + Duration::seconds(4)
        );
    }

    #[test]
    fn test_future_timestamp_out_of_range() {
        let r = Reference {
            block_num: 80_000_000,
            timestamp: Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap(),
        };
        let interval = BlockInterval::default();

        // 超出 chrono 可表示的最大日期
        assert!(matches!(
            estimate_future_timestamp(1_000_000_000_000_000, &r, interval),
            Err(EstimatorError::InvalidInput(_))
        ));
        // 区块差乘以间隔溢出 i64 毫秒
        assert!(matches!(
            estimate_future_timestamp(10_000_000_000_000_000, &r, interval),
            Err(EstimatorError::InvalidInput(_))
        ));
        // 区块号超出 i64
        assert!(matches!(
            estimate_future_timestamp(u64::MAX, &r, interval),
            Err(EstimatorError::InvalidInput(_))
        ));
        assert!(matches!(
            estimate_future_timestamp(i64::MAX as u64 + 1, &r, interval),
            Err(EstimatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_future_block_num_is_linear() {
        let r = reference();
        let interval = BlockInterval::default();

        assert_eq!(
            estimate_future_block_num(r.timestamp + Duration::seconds(300), &r, interval),
            1100.0
        );
        assert_eq!(
            estimate_future_block_num(r.timestamp + Duration::milliseconds(4500), &r, interval),
            1001.5
        );
    }

    #[test]
    fn test_round_trip_is_exact() {
        let r = reference();
        let interval = BlockInterval::default();

        let ts = estimate_future_timestamp(1500, &r, interval).unwrap();
        assert_eq!(estimate_future_block_num(ts, &r, interval), 1500.0);
    }
}
