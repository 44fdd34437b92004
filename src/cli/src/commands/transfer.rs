//! Transfer command for the CLI wallet.

use crate::config::CliConfig;
use crate::errors::WalletError;
use crate::rpc::{confirm_transaction, ChainRpc, JsonRpcClient};
use sol_core::{build_transfer, lamports_to_sol, KeypairFile, Pubkey};
use std::path::Path;
use tracing::{debug, info, warn};

/// The result of a confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// The sending account
    pub from: Pubkey,
    /// The receiving account
    pub to: Pubkey,
    /// The transferred amount in lamports
    pub lamports: u64,
    /// The transaction signature
    pub signature: String,
}

/// Runs the transfer command against the configured endpoint.
pub async fn run<P: AsRef<Path>>(
    config: &CliConfig,
    keypair_path: P,
    recipient: &str,
    lamports: u64,
) -> Result<TransferReceipt, WalletError> {
    let rpc = JsonRpcClient::new(config)?;
    execute(&rpc, config, keypair_path, recipient, lamports).await
}

/// Sends `lamports` from the keypair in `keypair_path` to `recipient` and
/// waits for confirmation.
///
/// The balance check and the submission are not atomic: another spend from
/// the same account between the two can still make the submission fail.
/// Submissions the node rejects are retried up to `transfer_attempts` times;
/// a lost response is not, since the transaction may already be on chain.
pub async fn execute<R: ChainRpc + ?Sized, P: AsRef<Path>>(
    rpc: &R,
    config: &CliConfig,
    keypair_path: P,
    recipient: &str,
    lamports: u64,
) -> Result<TransferReceipt, WalletError> {
    let sender = KeypairFile::load(keypair_path.as_ref())?.keypair()?;
    let from = sender.pubkey();
    let to: Pubkey = recipient.parse()?;

    let attempts = config.transfer_attempts.max(1);
    let mut attempt = 1;
    loop {
        let balance = rpc.get_balance(&from).await?;
        debug!("Sender {} balance: {} lamports", from, balance);
        if balance < lamports {
            return Err(WalletError::InsufficientBalance {
                balance,
                required: lamports,
            });
        }

        let blockhash = rpc.get_latest_blockhash().await?;
        let transaction = build_transfer(&from, &to, lamports, blockhash)?.sign(&sender)?;

        info!(
            "Transferring {} SOL from {} to {}",
            lamports_to_sol(lamports),
            from,
            to
        );
        let signature = match rpc.send_transaction(&transaction).await {
            Ok(signature) => signature,
            // Only a JSON-RPC error guarantees the node dropped the transaction
            Err(WalletError::Rejected { code, message, .. }) if attempt < attempts => {
                warn!(
                    "Submission rejected (attempt {}/{}): RPC error {}: {}",
                    attempt, attempts, code, message
                );
                attempt += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        confirm_transaction(
            rpc,
            &signature,
            config.commitment,
            config.poll_interval(),
            config.confirm_timeout(),
        )
        .await?;
        info!("Transfer confirmed, transaction {}", signature);

        return Ok(TransferReceipt {
            from,
            to,
            lamports,
            signature,
        });
    }
}
