//! Command line wallet: keypair generation, faucet airdrops, balance lookups
//! and SOL transfers over JSON-RPC.

pub mod app;
pub mod commands;
pub mod config;
pub mod errors;
pub mod rpc;

// Re-export commonly used types and functions
pub use app::{dispatch, Opt, Outcome};
pub use commands::{airdrop, balance, generate, transfer, KeySource};
pub use config::CliConfig;
pub use errors::WalletError;
pub use rpc::{ChainRpc, JsonRpcClient};
