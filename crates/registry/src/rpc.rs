//! JSON-RPC `eth_call` transport.

use crate::errors::*;
use async_trait::async_trait;
use land_types::Address;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-request timeout applied by [`JsonRpcTransport::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only contract call: send `data` to `to`, get the raw return data.
#[async_trait]
pub trait CallTransport: Send + Sync + std::fmt::Debug {
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>>;
}

/// HTTP JSON-RPC client issuing read-only contract calls.
///
/// Timeouts are enforced by the underlying HTTP client; callers above this
/// layer apply none of their own.
#[derive(Debug)]
pub struct JsonRpcTransport {
    endpoint: Url,
    http: Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

impl JsonRpcTransport {
    /// Create a transport for the given node URL (e.g. `https://mainnet.infura.io/`).
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        Self::with_http_client(endpoint, Client::builder().timeout(timeout).build()?)
    }

    /// Use an existing reqwest client (useful for custom TLS or middleware).
    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|_| RegistryError::InvalidEndpoint(endpoint.as_ref().to_string()))?;
        Ok(Self {
            endpoint,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute `eth_call` against the latest block and return the raw
    /// return data.
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = call_request(id, to, data);
        debug!(id, to = %to, "eth_call");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body = response.json::<RpcResponse>().await?;
        parse_call_response(body)
    }
}

#[async_trait]
impl CallTransport for JsonRpcTransport {
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        self.eth_call(to, data).await
    }
}

/// JSON-RPC 2.0 body for an `eth_call` at block tag `latest`.
pub fn call_request(id: u64, to: &Address, data: &[u8]) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "eth_call",
        "params": [
            { "to": to.to_lowercase().as_str(), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ],
    })
}

/// Extract return bytes, surfacing node-side errors (including reverts).
pub fn parse_call_response(body: RpcResponse) -> Result<Vec<u8>> {
    if let Some(error) = body.error {
        return Err(RegistryError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    let result = body
        .result
        .ok_or_else(|| RegistryError::malformed("response has neither result nor error"))?;
    let payload = result.strip_prefix("0x").unwrap_or(&result);
    hex::decode(payload).map_err(|e| RegistryError::malformed(format!("result is not hex: {e}")))
}
