//! HTTP JSON-RPC client for a single node endpoint

use super::NodeClient;
use crate::error::{TransferError, TransferResult};

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider, ProviderError, RpcError};
use tracing::{debug, warn};

/// Node client over plain HTTP, with the transport's default behavior
pub struct HttpNodeClient {
    /// Endpoint URL, kept for log context
    url: String,
    provider: Provider<Http>,
}

impl HttpNodeClient {
    /// Create a client for `url`. No request is made until the first call.
    pub fn new(url: &str) -> TransferResult<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| TransferError::Config(format!("Invalid RPC URL {}: {}", url, e)))?;

        debug!("Created HTTP node client for {}", url);

        Ok(Self {
            url: url.to_string(),
            provider,
        })
    }

    /// Endpoint this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn get_transaction_count(&self, address: Address) -> TransferResult<u64> {
        let count = self
            .provider
            .get_transaction_count(address, None)
            .await
            .map_err(|e| {
                warn!("Nonce fetch from {} failed: {}", self.url, e);
                TransferError::Network(format!("eth_getTransactionCount failed: {}", e))
            })?;

        if count > U256::from(u64::MAX) {
            return Err(TransferError::Network(format!(
                "Transaction count out of range: {}",
                count
            )));
        }

        Ok(count.as_u64())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> TransferResult<H256> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| classify_send_error(&self.url, e))?;

        Ok(pending.tx_hash())
    }
}

/// A JSON-RPC error object means the node refused the transaction; anything
/// else happened before the node could judge it.
fn classify_send_error(url: &str, err: ProviderError) -> TransferError {
    if let Some(resp) = RpcError::as_error_response(&err) {
        warn!(
            "Node {} rejected transaction (code {}): {}",
            url, resp.code, resp.message
        );
        return TransferError::rejected(resp.code, resp.message.clone());
    }

    warn!("Broadcast to {} failed: {}", url, err);
    TransferError::Network(format!("eth_sendRawTransaction failed: {}", err))
}
