//! Transfer submitter binary
//!
//! Reads `TRANSFER_CONFIG` (default `config/default.toml`), takes the sender
//! key from the environment variable the file names, submits one transfer and
//! prints the transaction hash.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use transfer_submitter::{HttpNodeClient, Settings, TransactionSender, TransactionSigner};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting transfer submitter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    let request = settings.transfer_request()?;

    // Key is read at call time and never stored in configuration
    let signer = TransactionSigner::from_env(&settings.wallet.private_key_env)
        .with_context(|| format!("Failed to load key from {}", settings.wallet.private_key_env))?;
    if let Some(expected) = settings.expected_sender()? {
        signer.ensure_address(expected)?;
    }
    info!("Connected wallet address: {:?}", signer.address());

    let client = HttpNodeClient::new(&settings.rpc.url)?;
    info!("Using node at {}", client.url());

    let sender = TransactionSender::new(client);
    let result = sender.submit(&request, &signer).await;

    debug!("Run metrics:\n{}", transfer_submitter::metrics::gather());

    match result {
        Ok(submission) => {
            info!(
                "Submitted nonce {} to {:?}",
                submission.record.nonce, submission.record.to
            );
            println!("{:?}", submission.tx_hash);
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Submission failed: {}", e);
            Err(e.into())
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,transfer_submitter=debug,hyper=warn,reqwest=warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
