//! Human-readable amounts ("1 ether", "50 gwei") and their wei values

use crate::error::{TransferError, TransferResult};

use ethers::types::U256;
use ethers::utils::{parse_units, ParseUnits};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Decimal digits that always fit in a U256 (max is about 1.16e77)
const MAX_WEI_DIGITS: usize = 77;

/// Denomination of an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Wei,
    Gwei,
    Ether,
}

impl Unit {
    /// Power of ten that converts this unit into wei
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Gwei => 9,
            Unit::Ether => 18,
        }
    }
}

impl FromStr for Unit {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wei" => Ok(Unit::Wei),
            "gwei" => Ok(Unit::Gwei),
            "ether" | "eth" => Ok(Unit::Ether),
            other => Err(TransferError::Config(format!("Unknown unit: {}", other))),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Wei => "wei",
            Unit::Gwei => "gwei",
            Unit::Ether => "ether",
        };
        f.write_str(s)
    }
}

/// A decimal quantity in some unit, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Amount {
    quantity: String,
    unit: Unit,
}

impl Amount {
    pub fn new(quantity: impl Into<String>, unit: Unit) -> TransferResult<Self> {
        let quantity = quantity.into();
        validate_quantity(&quantity, unit)?;
        Ok(Self { quantity, unit })
    }

    pub fn ether(quantity: impl Into<String>) -> TransferResult<Self> {
        Self::new(quantity, Unit::Ether)
    }

    pub fn gwei(quantity: impl Into<String>) -> TransferResult<Self> {
        Self::new(quantity, Unit::Gwei)
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Convert to the smallest unit
    pub fn to_wei(&self) -> TransferResult<U256> {
        let parsed = parse_units(&self.quantity, self.unit.decimals())
            .map_err(|e| TransferError::Config(format!("Invalid amount {}: {}", self, e)))?;

        match parsed {
            ParseUnits::U256(wei) => Ok(wei),
            ParseUnits::I256(_) => Err(TransferError::Config(format!(
                "Amount must not be negative: {}",
                self
            ))),
        }
    }
}

/// Accepts "<quantity> <unit>" or a bare quantity in wei
impl FromStr for Amount {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let quantity = parts
            .next()
            .ok_or_else(|| TransferError::Config("Empty amount".to_string()))?;
        let unit = match parts.next() {
            Some(unit) => unit.parse()?,
            None => Unit::Wei,
        };
        if parts.next().is_some() {
            return Err(TransferError::Config(format!("Malformed amount: {}", s)));
        }
        Amount::new(quantity, unit)
    }
}

impl TryFrom<String> for Amount {
    type Error = TransferError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit)
    }
}

/// Plain unsigned decimal with no more fractional digits than the unit allows
fn validate_quantity(quantity: &str, unit: Unit) -> TransferResult<()> {
    let (whole, frac) = match quantity.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (quantity, ""),
    };

    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(frac) {
        return Err(TransferError::Config(format!(
            "Invalid quantity: {:?}",
            quantity
        )));
    }
    // Whole digits scaled to wei must stay below 10^77 to fit in 256 bits
    let significant = whole.trim_start_matches('0').len();
    if significant + unit.decimals() as usize > MAX_WEI_DIGITS {
        return Err(TransferError::Config(format!(
            "{} {} is too large",
            quantity, unit
        )));
    }
    if frac.len() > unit.decimals() as usize {
        return Err(TransferError::Config(format!(
            "{} has more precision than {} allows",
            quantity, unit
        )));
    }
    Ok(())
}
