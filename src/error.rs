//! Error types for the transfer submitter

use std::fmt;
use thiserror::Error;

/// Main error type for the submitter
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure, unreachable node, or a response we could not parse
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error for the submitted transaction
    #[error("Transaction rejected ({reason}, code {code}): {message}")]
    Rejected {
        reason: RejectReason,
        code: i64,
        message: String,
    },

    #[error("Signing error: {0}")]
    Signing(String),
}

impl TransferError {
    /// Build a rejection, classifying the node's message
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        TransferError::Rejected {
            reason: RejectReason::from_message(&message),
            code,
            message,
        }
    }

    /// Stable label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Config(_) => "config",
            TransferError::Network(_) => "network",
            TransferError::Rejected { .. } => "rejected",
            TransferError::Signing(_) => "signing",
        }
    }

    /// Check if the node refused the transaction because of its nonce
    pub fn is_nonce_mismatch(&self) -> bool {
        matches!(
            self,
            TransferError::Rejected {
                reason: RejectReason::NonceTooLow | RejectReason::NonceTooHigh,
                ..
            }
        )
    }
}

/// Why a node refused a raw transaction, as far as its message tells us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NonceTooLow,
    NonceTooHigh,
    InsufficientFunds,
    Underpriced,
    AlreadyKnown,
    GasLimit,
    Other,
}

impl RejectReason {
    /// Classify a node error message.
    ///
    /// Clients word these differently (geth, erigon, nethermind, anvil), so
    /// matching is on lowercase substrings.
    pub fn from_message(message: &str) -> Self {
        let msg = message.to_lowercase();

        if msg.contains("nonce too low") || msg.contains("oldnonce") {
            RejectReason::NonceTooLow
        } else if msg.contains("nonce too high") || msg.contains("nonce gap") {
            RejectReason::NonceTooHigh
        } else if msg.contains("insufficient funds") || msg.contains("insufficient balance") {
            RejectReason::InsufficientFunds
        } else if msg.contains("underpriced") || msg.contains("fee too low") {
            RejectReason::Underpriced
        } else if msg.contains("already known") || msg.contains("already imported") {
            RejectReason::AlreadyKnown
        } else if msg.contains("gas limit") || msg.contains("intrinsic gas") {
            RejectReason::GasLimit
        } else {
            RejectReason::Other
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::NonceTooLow => "nonce too low",
            RejectReason::NonceTooHigh => "nonce too high",
            RejectReason::InsufficientFunds => "insufficient funds",
            RejectReason::Underpriced => "underpriced",
            RejectReason::AlreadyKnown => "already known",
            RejectReason::GasLimit => "gas limit",
            RejectReason::Other => "other",
        };
        f.write_str(s)
    }
}

/// Result type for submitter operations
pub type TransferResult<T> = Result<T, TransferError>;
