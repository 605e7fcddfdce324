//! 数据源模块
//!
//! 估算器只通过这里的两个trait访问节点: `Connector` 打开连接, `BlockSource` 发起查询。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::ops::Deref;
use tracing::debug;

use crate::engine::types::{BlockHeader, Result};

pub mod hive;

pub use hive::*;

/// 一条已打开的节点连接
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// 当前不可逆区块号
    async fn get_current_irreversible_block_num(&self) -> Result<u64>;

    /// 按区块号获取区块头, 节点没有该区块时返回 `None`
    async fn get_block_header(&self, block_num: u64) -> Result<Option<BlockHeader>>;

    /// 释放连接
    fn close(&mut self);
}

/// 连接工厂, 每次调用打开一条新连接
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BlockSource>>;
}

/// 连接守卫: drop 时关闭连接, 覆盖正常返回、`None`、错误和 panic 所有路径
pub struct SourceGuard {
    source: Box<dyn BlockSource>,
}

impl SourceGuard {
    pub async fn open(connector: &dyn Connector) -> Result<Self> {
        let source = connector.open().await?;
        debug!("data source connection opened");
        Ok(Self { source })
    }
}

impl Deref for SourceGuard {
    type Target = dyn BlockSource;

    fn deref(&self) -> &Self::Target {
        self.source.as_ref()
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        self.source.close();
        debug!("data source connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::EstimatorError;

    #[tokio::test]
    async fn test_guard_closes_once_on_drop() {
        let mut connector = MockConnector::new();
        connector.expect_open().times(1).returning(|| {
            let mut source = MockBlockSource::new();
            source
                .expect_get_current_irreversible_block_num()
                .times(1)
                .returning(|| Ok(42));
            source.expect_close().times(1).return_const(());
            Ok(Box::new(source) as Box<dyn BlockSource>)
        });

        {
            let guard = SourceGuard::open(&connector).await.unwrap();
            assert_eq!(guard.get_current_irreversible_block_num().await.unwrap(), 42);
        }
    }

    #[tokio::test]
    async fn test_failed_open_has_nothing_to_close() {
        let mut connector = MockConnector::new();
        connector
            .expect_open()
            .times(1)
            .returning(|| Err(EstimatorError::Connection("refused".to_string())));

        let result = SourceGuard::open(&connector).await;
        assert!(matches!(result, Err(EstimatorError::Connection(_))));
    }
}
