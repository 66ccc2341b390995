//! Transfer submitter - sign a legacy Ethereum value transfer locally and
//! broadcast it to a JSON-RPC node.
//!
//! The pass is strictly linear: read the sender's nonce, build the record,
//! sign it, submit the raw bytes. Nothing is retried and nothing waits for
//! inclusion.

pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod tx;
pub mod units;

pub use chain::{HttpNodeClient, NodeClient};
pub use config::Settings;
pub use error::{RejectReason, TransferError, TransferResult};
pub use tx::{
    broadcast, sign_transaction, SignedTransaction, Submission, TransactionRecord,
    TransactionSender, TransactionSigner, TransferRequest,
};
pub use units::{Amount, Unit};
