//! Configuration management for the transfer submitter
//!
//! Loads configuration from TOML files with environment variable substitution.
//! The private key itself never lives in the file: only the name of the
//! environment variable that carries it.

use crate::error::TransferError;
use crate::tx::TransferRequest;
use crate::units::Amount;

use anyhow::{Context, Result};
use ethers::types::Address;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that points at the configuration file
pub const CONFIG_ENV: &str = "TRANSFER_CONFIG";

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern");
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub rpc: RpcConfig,
    pub wallet: WalletConfig,
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    /// When set, signatures carry EIP-155 replay protection for this chain
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Name of the environment variable holding the hex private key
    pub private_key_env: String,
    /// Optional sender address the key must derive to
    #[serde(default)]
    pub expected_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    pub to: String,
    pub value: Amount,
    pub gas_limit: u64,
    pub gas_price: Amount,
}

impl Settings {
    /// Load settings from the file named by `TRANSFER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&config_str)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(input: &str) -> Result<Self> {
        let config_str = substitute_env_vars(input);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration, reporting every problem at once
    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.rpc.url.trim().is_empty() {
            problems.push("rpc.url is empty".to_string());
        }
        if self.wallet.private_key_env.trim().is_empty() {
            problems.push("wallet.private_key_env is empty".to_string());
        }
        if let Err(e) = parse_address(&self.transfer.to) {
            problems.push(format!("transfer.to: {}", e));
        }
        if let Some(expected) = &self.wallet.expected_address {
            if let Err(e) = parse_address(expected) {
                problems.push(format!("wallet.expected_address: {}", e));
            }
        }
        if self.transfer.gas_limit == 0 {
            problems.push("transfer.gas_limit must be positive".to_string());
        }
        for (name, amount) in [
            ("transfer.value", &self.transfer.value),
            ("transfer.gas_price", &self.transfer.gas_price),
        ] {
            if let Err(e) = amount.to_wei() {
                problems.push(format!("{}: {}", name, e));
            }
        }

        if !problems.is_empty() {
            anyhow::bail!("Invalid configuration: {}", problems.join("; "));
        }
        Ok(())
    }

    /// The nonce-independent part of the transaction described by this file
    pub fn transfer_request(&self) -> Result<TransferRequest> {
        let to = parse_address(&self.transfer.to)?;
        Ok(TransferRequest {
            to,
            value: self.transfer.value.clone(),
            gas_limit: self.transfer.gas_limit,
            gas_price: self.transfer.gas_price.clone(),
            chain_id: self.rpc.chain_id,
        })
    }

    /// Expected sender address, if configured
    pub fn expected_sender(&self) -> Result<Option<Address>> {
        self.wallet
            .expected_address
            .as_deref()
            .map(parse_address)
            .transpose()
            .map_err(Into::into)
    }
}

/// Parse a 0x-prefixed 20-byte address
pub fn parse_address(input: &str) -> Result<Address, TransferError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|e| TransferError::Config(format!("Invalid address {:?}: {}", input, e)))
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
