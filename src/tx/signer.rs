//! Local secp256k1 signing of legacy transactions
//!
//! Records without a chain id are signed the pre-EIP-155 way (`v` = 27/28,
//! six-field sighash). With a chain id the sighash carries `chain_id, 0, 0`
//! and `v` = `35 + 2 * chain_id + recid`.

use super::builder::TransactionRecord;
use crate::error::{TransferError, TransferResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, Signature, TransactionRequest, H256};
use sha3::{Digest, Keccak256};
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

/// A record together with its signature and canonical encoding
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub record: TransactionRecord,
    pub signature: Signature,
    /// RLP of the signed legacy transaction, ready for `eth_sendRawTransaction`
    pub raw: Bytes,
    /// keccak256(raw)
    pub hash: H256,
}

impl SignedTransaction {
    /// Recover the signer's address from the signature over the record
    pub fn recover_sender(&self) -> TransferResult<Address> {
        let tx: TransactionRequest = (&self.record).into();
        let sighash = tx.sighash();
        self.signature
            .recover(sighash)
            .map_err(|e| TransferError::Signing(format!("Signature does not recover: {}", e)))
    }
}

/// Holds the sender key for the duration of a submission
#[derive(Clone)]
pub struct TransactionSigner {
    wallet: LocalWallet,
}

impl TransactionSigner {
    /// Build from raw key bytes; must be a valid non-zero scalar below the curve order
    pub fn from_bytes(key: &[u8]) -> TransferResult<Self> {
        if key.len() != 32 {
            return Err(TransferError::Signing(format!(
                "Private key must be 32 bytes, got {}",
                key.len()
            )));
        }

        let wallet = LocalWallet::from_bytes(key)
            .map_err(|e| TransferError::Signing(format!("Invalid private key: {}", e)))?;

        debug!("Loaded signer for {:?}", wallet.address());
        Ok(Self { wallet })
    }

    /// Build from a hex string, with or without a 0x prefix
    pub fn from_hex(key: &str) -> TransferResult<Self> {
        let trimmed = key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(stripped)
                .map_err(|e| TransferError::Signing(format!("Private key is not hex: {}", e)))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Read the key from an environment variable at call time
    pub fn from_env(var: &str) -> TransferResult<Self> {
        let key = Zeroizing::new(std::env::var(var).map_err(|_| {
            TransferError::Signing(format!("Environment variable {} is not set", var))
        })?);
        Self::from_hex(&key)
    }

    /// Sender address derived from the key
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Fail unless the key derives to `expected`
    pub fn ensure_address(&self, expected: Address) -> TransferResult<()> {
        let actual = self.address();
        if actual != expected {
            return Err(TransferError::Signing(format!(
                "Private key belongs to {:?}, expected {:?}",
                actual, expected
            )));
        }
        Ok(())
    }

    /// Sign a record and produce its raw encoding and hash
    pub fn sign(&self, record: &TransactionRecord) -> TransferResult<SignedTransaction> {
        let tx: TransactionRequest = record.into();

        // sign_hash yields v = 27 + recid
        let mut signature = self
            .wallet
            .sign_hash(tx.sighash())
            .map_err(|e| TransferError::Signing(e.to_string()))?;

        if let Some(chain_id) = record.chain_id {
            let recid = signature.v - 27;
            signature.v = chain_id
                .checked_mul(2)
                .and_then(|v| v.checked_add(35 + recid))
                .ok_or_else(|| {
                    TransferError::Signing(format!("Chain id {} too large for EIP-155", chain_id))
                })?;
        }

        let raw = tx.rlp_signed(&signature);
        let hash = H256::from_slice(&Keccak256::digest(&raw));

        debug!(
            nonce = record.nonce,
            hash = ?hash,
            "Signed transaction from {:?}",
            self.address()
        );

        Ok(SignedTransaction {
            record: record.clone(),
            signature,
            raw,
            hash,
        })
    }
}

impl fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Sign `record` with a raw 32-byte key
pub fn sign_transaction(record: &TransactionRecord, key: &[u8]) -> TransferResult<SignedTransaction> {
    TransactionSigner::from_bytes(key)?.sign(record)
}
