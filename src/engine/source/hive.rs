//! Hive 节点数据源
//!
//! 通过 HTTP 上的 JSON-RPC 2.0 调用 `condenser_api`

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use super::{BlockSource, Connector};
use crate::engine::types::{BlockHeader, EstimatorError, Result};

const GET_DYNAMIC_GLOBAL_PROPERTIES: &str = "condenser_api.get_dynamic_global_properties";
const GET_BLOCK_HEADER: &str = "condenser_api.get_block_header";

/// Hive 连接工厂
#[derive(Debug, Clone)]
pub struct HiveConnector {
    rpc_url: Url,
    timeout: Option<Duration>,
}

impl HiveConnector {
    pub fn new(rpc_url: Url, timeout: Option<Duration>) -> Self {
        Self { rpc_url, timeout }
    }
}

#[async_trait]
impl Connector for HiveConnector {
    async fn open(&self) -> Result<Box<dyn BlockSource>> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EstimatorError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        debug!(url = %self.rpc_url, "opening hive connection");
        Ok(Box::new(HiveClient::new(client, self.rpc_url.clone())))
    }
}

/// 单条 Hive 连接
pub struct HiveClient {
    client: Option<Client>,
    rpc_url: Url,
    next_id: AtomicU64,
}

impl HiveClient {
    pub fn new(client: Client, rpc_url: Url) -> Self {
        Self {
            client: Some(client),
            rpc_url,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let client = self.client.as_ref().ok_or(EstimatorError::ConnectionClosed)?;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        trace!(?request, "rpc request");

        let body = client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        decode_response(&body)
    }
}

#[async_trait]
impl BlockSource for HiveClient {
    async fn get_current_irreversible_block_num(&self) -> Result<u64> {
        let props: DynamicGlobalProperties = self
            .call(GET_DYNAMIC_GLOBAL_PROPERTIES, json!([]))
            .await?
            .ok_or_else(|| {
                EstimatorError::ParseResponse(format!("{} returned no result", GET_DYNAMIC_GLOBAL_PROPERTIES))
            })?;
        Ok(props.last_irreversible_block_num)
    }

    async fn get_block_header(&self, block_num: u64) -> Result<Option<BlockHeader>> {
        self.call(GET_BLOCK_HEADER, json!([block_num])).await
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(url = %self.rpc_url, "hive connection closed");
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct DynamicGlobalProperties {
    last_irreversible_block_num: u64,
}

/// 解析 JSON-RPC 响应体; `result: null` 视为 `None`
fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>> {
    let response: RpcResponse<T> = serde_json::from_slice(body)?;
    if let Some(error) = response.error {
        return Err(EstimatorError::RpcError {
            code: error.code,
            message: error.message,
        });
    }
    Ok(response.result)
}
