//! Transaction construction, signing and submission

mod builder;
mod nonce;
mod sender;
mod signer;

pub use builder::{TransactionRecord, TransferRequest};
pub use nonce::SenderLocks;
pub use sender::{broadcast, Submission, TransactionSender};
pub use signer::{sign_transaction, SignedTransaction, TransactionSigner};
