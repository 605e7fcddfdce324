//! 时间工具

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::engine::types::{EstimatorError, Result};

/// 节点返回的时间戳格式 (不带时区, 按UTC解释)
pub const NODE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 解析节点时间戳, 例如 `2016-03-24T16:05:00`
pub fn parse_node_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, NODE_TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| EstimatorError::ParseResponse(format!("Invalid node timestamp {:?}: {}", raw, e)))
}

/// 解析用户输入的时间: 纯数字按 unix 毫秒处理, 否则按 RFC 3339 / ISO 日期处理
pub fn parse_user_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let invalid = || {
        EstimatorError::InvalidInput(format!(
            "{:?} is neither a valid ISO date nor a unix epoch number (in ms)",
            raw
        ))
    };

    if let Ok(epoch_ms) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(epoch_ms).single().ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(invalid)
}

/// 输出格式: RFC 3339, 毫秒精度, `Z` 结尾
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `#[serde(deserialize_with = "node_timestamp::deserialize")]` 用的反序列化模块
pub mod node_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    use super::parse_node_timestamp;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_node_timestamp(&raw).map_err(D::Error::custom)
    }
}
