//! Balance command for the CLI wallet.

use crate::commands::KeySource;
use crate::config::CliConfig;
use crate::errors::WalletError;
use crate::rpc::{ChainRpc, JsonRpcClient};
use rust_decimal::Decimal;
use sol_core::{lamports_to_sol, Pubkey};
use tracing::info;

/// The balance of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance {
    /// The queried account
    pub pubkey: Pubkey,
    /// The balance in lamports
    pub lamports: u64,
}

impl AccountBalance {
    /// Gets the balance in SOL.
    pub fn sol(&self) -> Decimal {
        lamports_to_sol(self.lamports)
    }
}

/// Runs the balance command against the configured endpoint.
pub async fn run(config: &CliConfig, source: &KeySource) -> Result<AccountBalance, WalletError> {
    let rpc = JsonRpcClient::new(config)?;
    execute(&rpc, source).await
}

/// Gets the balance of the account named by `source`.
pub async fn execute<R: ChainRpc + ?Sized>(
    rpc: &R,
    source: &KeySource,
) -> Result<AccountBalance, WalletError> {
    let pubkey = source.resolve()?;
    let lamports = rpc.get_balance(&pubkey).await?;

    let balance = AccountBalance { pubkey, lamports };
    info!("Balance of {}: {} SOL", pubkey, balance.sol());
    Ok(balance)
}
