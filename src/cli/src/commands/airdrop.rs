//! Airdrop command for the CLI wallet.

use crate::commands::KeySource;
use crate::config::CliConfig;
use crate::errors::WalletError;
use crate::rpc::{ChainRpc, JsonRpcClient};
use sol_core::{lamports_to_sol, Pubkey};
use tracing::info;

/// The result of a granted airdrop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropReceipt {
    /// The funded account
    pub recipient: Pubkey,
    /// The requested amount in lamports
    pub lamports: u64,
    /// The faucet transaction signature
    pub signature: String,
}

/// Runs the airdrop command against the configured endpoint.
pub async fn run(config: &CliConfig, source: &KeySource, lamports: u64) -> Result<AirdropReceipt, WalletError> {
    let rpc = JsonRpcClient::new(config)?;
    execute(&rpc, source, lamports).await
}

/// Requests `lamports` from the faucet for the account named by `source`.
pub async fn execute<R: ChainRpc + ?Sized>(
    rpc: &R,
    source: &KeySource,
    lamports: u64,
) -> Result<AirdropReceipt, WalletError> {
    let recipient = source.resolve()?;

    info!(
        "Requesting airdrop of {} SOL to {}",
        lamports_to_sol(lamports),
        recipient
    );
    let signature = rpc.request_airdrop(&recipient, lamports).await?;
    info!("Airdrop granted, transaction {}", signature);

    Ok(AirdropReceipt {
        recipient,
        lamports,
        signature,
    })
}
