//! Chain module - the JSON-RPC surface the submitter needs from a node
//!
//! Only two calls are consumed: reading an account's transaction count and
//! submitting raw signed bytes. Everything else a node offers is out of reach
//! on purpose so that test doubles stay small.

pub mod provider;

pub use provider::HttpNodeClient;

use crate::error::TransferResult;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256};

/// Read/submit access to a single Ethereum-compatible node
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Next valid nonce for `address` (`eth_getTransactionCount` at latest)
    async fn get_transaction_count(&self, address: Address) -> TransferResult<u64>;

    /// Submit pre-signed, pre-serialized transaction bytes
    async fn send_raw_transaction(&self, raw: Bytes) -> TransferResult<H256>;
}
