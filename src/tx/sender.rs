//! Broadcast and the nonce → build → sign → broadcast pipeline

use super::builder::{TransactionRecord, TransferRequest};
use super::nonce::SenderLocks;
use super::signer::{SignedTransaction, TransactionSigner};
use crate::chain::NodeClient;
use crate::error::TransferResult;

use ethers::types::H256;
use tracing::{debug, info, warn};

/// Outcome of a successful submission
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: TransactionRecord,
    /// Identifier reported by the node
    pub tx_hash: H256,
}

/// Submit signed bytes and return the node's transaction identifier.
///
/// The node's answer is returned as-is, even if it differs from the locally
/// computed hash.
pub async fn broadcast<C>(client: &C, signed: &SignedTransaction) -> TransferResult<H256>
where
    C: NodeClient + ?Sized,
{
    let tx_hash = client.send_raw_transaction(signed.raw.clone()).await?;

    if tx_hash != signed.hash {
        warn!(
            "Node reported hash {:?}, locally computed {:?}",
            tx_hash, signed.hash
        );
    }

    crate::metrics::record_tx_broadcast();
    Ok(tx_hash)
}

/// Runs submissions against one node client
pub struct TransactionSender<C> {
    client: C,
    locks: SenderLocks,
}

impl<C: NodeClient> TransactionSender<C> {
    /// Create a new transaction sender
    pub fn new(client: C) -> Self {
        Self {
            client,
            locks: SenderLocks::new(),
        }
    }

    /// Fetch the nonce, build, sign and broadcast a single transfer.
    ///
    /// Any failure stops the pass; nothing is retried.
    pub async fn submit(
        &self,
        request: &TransferRequest,
        signer: &TransactionSigner,
    ) -> TransferResult<Submission> {
        let result = self.submit_once(request, signer).await;
        if let Err(ref e) = result {
            crate::metrics::record_failure(e);
        }
        result
    }

    async fn submit_once(
        &self,
        request: &TransferRequest,
        signer: &TransactionSigner,
    ) -> TransferResult<Submission> {
        let sender = signer.address();
        let _guard = self.locks.acquire(sender).await;

        // Get nonce
        let nonce = self.client.get_transaction_count(sender).await?;
        crate::metrics::record_nonce_fetch();
        debug!("Nonce for {:?} is {}", sender, nonce);

        // Build transaction
        let record = request.build_record(nonce)?;
        debug!(
            "Built transfer of {} wei to {:?}, max cost {} wei",
            record.value,
            record.to,
            record.max_cost()
        );

        // Sign
        let signed = signer.sign(&record)?;
        crate::metrics::record_tx_signed();

        // Send
        let tx_hash = broadcast(&self.client, &signed).await?;
        info!(
            "Transaction sent: {:?} (nonce {}, from {:?})",
            tx_hash, nonce, sender
        );

        Ok(Submission { record, tx_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockNodeClient;
    use crate::error::{RejectReason, TransferError};
    use crate::units::Amount;
    use ethers::types::{Address, Bytes, Transaction, U256};
    use ethers::utils::rlp;
    use mockall::predicate::eq;
    use std::sync::{Arc, Mutex};
    use tokio_test::{assert_err, assert_ok};

    const SENDER_KEY: &str = "bcdf20249abf0ed6d944c0288fad489e33f66b3960d9e6229c1cd214ed3bbe31";
    const SENDER_ADDRESS: &str = "0x8943545177806ED17B9F23F0a21ee5948eCaa776";
    const RECIPIENT: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";

    fn request() -> TransferRequest {
        TransferRequest {
            to: RECIPIENT.parse().unwrap(),
            value: Amount::ether("1").unwrap(),
            gas_limit: 2_000_000,
            gas_price: Amount::gwei("50").unwrap(),
            chain_id: None,
        }
    }

    fn signer() -> TransactionSigner {
        TransactionSigner::from_hex(SENDER_KEY).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_transfer() {
        let signer = signer();
        let fixed_hash = H256::repeat_byte(0x42);
        let captured: Arc<Mutex<Option<Bytes>>> = Arc::new(Mutex::new(None));

        let mut client = MockNodeClient::new();
        client
            .expect_get_transaction_count()
            .with(eq(signer.address()))
            .times(1)
            .returning(|_| Ok(5));
        client.expect_send_raw_transaction().times(1).returning({
            let captured = captured.clone();
            move |raw| {
                *captured.lock().unwrap() = Some(raw);
                Ok(fixed_hash)
            }
        });

        let sender = TransactionSender::new(client);
        let submission = sender.submit(&request(), &signer).await.unwrap();

        assert_eq!(submission.tx_hash, fixed_hash);
        assert_eq!(
            submission.record,
            TransactionRecord {
                nonce: 5,
                to: RECIPIENT.parse().unwrap(),
                value: U256::from(1_000_000_000_000_000_000u64),
                gas_limit: U256::from(2_000_000u64),
                gas_price: U256::from(50_000_000_000u64),
                chain_id: None,
            }
        );

        let raw = captured.lock().unwrap().clone().unwrap();
        let decoded: Transaction = rlp::decode(&raw).unwrap();
        assert_eq!(decoded.nonce, U256::from(5u64));
        assert_eq!(
            decoded.recover_from().unwrap(),
            SENDER_ADDRESS.parse::<Address>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_nonce_failure_short_circuits() {
        let mut client = MockNodeClient::new();
        client
            .expect_get_transaction_count()
            .times(1)
            .returning(|_| Err(TransferError::Network("connection refused".into())));
        client.expect_send_raw_transaction().never();

        let sender = TransactionSender::new(client);
        let err = assert_err!(sender.submit(&request(), &signer()).await);

        assert!(matches!(err, TransferError::Network(_)));
    }

    #[tokio::test]
    async fn test_stale_nonce_surfaces_rejection() {
        let mut client = MockNodeClient::new();
        client.expect_get_transaction_count().returning(|_| Ok(4));
        client
            .expect_send_raw_transaction()
            .times(1)
            .returning(|_| Err(TransferError::rejected(-32000, "nonce too low")));

        let sender = TransactionSender::new(client);
        let err = sender.submit(&request(), &signer()).await.unwrap_err();

        assert!(err.is_nonce_mismatch());
        assert!(matches!(
            err,
            TransferError::Rejected {
                reason: RejectReason::NonceTooLow,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_broadcast_returns_node_hash_unchanged() {
        let record = request().build_record(0).unwrap();
        let signed = signer().sign(&record).unwrap();
        let node_hash = H256::repeat_byte(0x01);
        assert_ne!(node_hash, signed.hash);

        let mut client = MockNodeClient::new();
        let expected_raw = signed.raw.clone();
        client
            .expect_send_raw_transaction()
            .withf(move |raw| *raw == expected_raw)
            .returning(move |_| Ok(node_hash));

        let returned = assert_ok!(broadcast(&client, &signed).await);
        assert_eq!(returned, node_hash);
    }

    #[tokio::test]
    async fn test_replay_protected_submission() {
        let mut request = request();
        request.chain_id = Some(3_151_908);
        let signer = signer();
        let captured: Arc<Mutex<Option<Bytes>>> = Arc::new(Mutex::new(None));

        let mut client = MockNodeClient::new();
        client.expect_get_transaction_count().returning(|_| Ok(0));
        client.expect_send_raw_transaction().returning({
            let captured = captured.clone();
            move |raw| {
                *captured.lock().unwrap() = Some(raw);
                Ok(H256::zero())
            }
        });

        let sender = TransactionSender::new(client);
        let submission = sender.submit(&request, &signer).await.unwrap();
        assert_eq!(submission.record.chain_id, Some(3_151_908));

        let raw = captured.lock().unwrap().clone().unwrap();
        let decoded: Transaction = rlp::decode(&raw).unwrap();
        assert_eq!(decoded.chain_id, Some(U256::from(3_151_908u64)));
        assert_eq!(decoded.recover_from().unwrap(), signer.address());
    }
}
