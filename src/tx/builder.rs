//! Transaction record construction

use crate::error::TransferResult;
use crate::units::Amount;

use ethers::types::{Address, TransactionRequest, U256};

/// Nonce-independent description of a value transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub to: Address,
    pub value: Amount,
    pub gas_limit: u64,
    pub gas_price: Amount,
    pub chain_id: Option<u64>,
}

impl TransferRequest {
    /// Fix the nonce and produce the record to sign
    pub fn build_record(&self, nonce: u64) -> TransferResult<TransactionRecord> {
        TransactionRecord::build(
            nonce,
            self.to,
            &self.value,
            self.gas_limit,
            &self.gas_price,
            self.chain_id,
        )
    }
}

/// Plain legacy transaction with every amount already in wei
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub nonce: u64,
    pub to: Address,
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub chain_id: Option<u64>,
}

impl TransactionRecord {
    /// Assemble a record, converting human units to wei
    pub fn build(
        nonce: u64,
        to: Address,
        value: &Amount,
        gas_limit: u64,
        gas_price: &Amount,
        chain_id: Option<u64>,
    ) -> TransferResult<Self> {
        Ok(Self {
            nonce,
            to,
            value: value.to_wei()?,
            gas_limit: U256::from(gas_limit),
            gas_price: gas_price.to_wei()?,
            chain_id,
        })
    }

    /// Upper bound on what the sender pays: value plus the full gas budget
    pub fn max_cost(&self) -> U256 {
        self.value
            .saturating_add(self.gas_limit.saturating_mul(self.gas_price))
    }
}

impl From<&TransactionRecord> for TransactionRequest {
    fn from(record: &TransactionRecord) -> Self {
        let tx = TransactionRequest::new()
            .to(record.to)
            .value(record.value)
            .nonce(record.nonce)
            .gas(record.gas_limit)
            .gas_price(record.gas_price);

        match record.chain_id {
            Some(chain_id) => tx.chain_id(chain_id),
            None => tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Address {
        "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1".parse().unwrap()
    }

    #[test]
    fn test_build_converts_units() {
        let record = TransactionRecord::build(
            5,
            recipient(),
            &Amount::ether("1").unwrap(),
            2_000_000,
            &Amount::gwei("50").unwrap(),
            None,
        )
        .unwrap();

        assert_eq!(record.nonce, 5);
        assert_eq!(record.to, recipient());
        assert_eq!(record.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(record.gas_limit, U256::from(2_000_000u64));
        assert_eq!(record.gas_price, U256::from(50_000_000_000u64));
        assert_eq!(record.chain_id, None);
    }

    #[test]
    fn test_request_builds_record_with_nonce() {
        let request = TransferRequest {
            to: recipient(),
            value: "21000".parse().unwrap(),
            gas_limit: 21_000,
            gas_price: "1 gwei".parse().unwrap(),
            chain_id: Some(1),
        };

        let first = request.build_record(0).unwrap();
        let second = request.build_record(1).unwrap();
        assert_eq!(first.nonce, 0);
        assert_eq!(second.nonce, 1);
        assert_eq!(first.value, second.value);
        assert_eq!(first.chain_id, Some(1));
    }

    #[test]
    fn test_max_cost() {
        let record = TransactionRecord::build(
            0,
            recipient(),
            &Amount::ether("1").unwrap(),
            2_000_000,
            &Amount::gwei("50").unwrap(),
            None,
        )
        .unwrap();

        // 1 ether + 2_000_000 * 50 gwei = 1.1 ether
        assert_eq!(
            record.max_cost(),
            U256::from(1_100_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_into_transaction_request() {
        let record = TransactionRecord::build(
            7,
            recipient(),
            &Amount::ether("1").unwrap(),
            21_000,
            &Amount::gwei("2").unwrap(),
            Some(5),
        )
        .unwrap();

        let tx: TransactionRequest = (&record).into();
        assert_eq!(tx.nonce, Some(U256::from(7u64)));
        assert_eq!(tx.gas, Some(U256::from(21_000u64)));
        assert_eq!(tx.gas_price, Some(U256::from(2_000_000_000u64)));
        assert_eq!(tx.value, Some(record.value));
        assert_eq!(tx.chain_id, Some(5u64.into()));
    }
}
