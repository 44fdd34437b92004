//! Error types for the CLI wallet.

use rust_decimal::Decimal;
use sol_core::{lamports_to_sol, CoreError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the CLI wallet.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Invalid, missing or conflicting command line input. Raised before any I/O.
    #[error("{0}")]
    Usage(String),

    /// Keypair JSON that is malformed or lacks a required field.
    #[error("Invalid keypair file: {0}")]
    InvalidFileFormat(String),

    /// A string that does not decode to a public key.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The sender cannot cover the requested transfer.
    #[error(
        "Insufficient balance: current balance {} SOL, attempted transfer {} SOL",
        sol(.balance),
        sol(.required)
    )]
    InsufficientBalance {
        /// The sender's balance in lamports
        balance: u64,
        /// The requested amount in lamports
        required: u64,
    },

    /// A failure while talking to the RPC node: transport, HTTP or malformed response.
    ///
    /// The request may or may not have reached the node.
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error object, so the request was not applied.
    #[error("Network error: {method} failed with RPC error {code}: {message}")]
    Rejected {
        /// The JSON-RPC method
        method: String,
        /// The JSON-RPC error code
        code: i64,
        /// The node's error message
        message: String,
    },

    /// A submitted transaction did not reach the configured commitment in time.
    #[error("Timed out after {waited:?} waiting for confirmation of {signature}")]
    Timeout {
        /// The transaction signature
        signature: String,
        /// How long confirmation was awaited
        waited: Duration,
    },

    /// A keypair or config file could not be read or written.
    #[error("File error: {}: {source}", .path.display())]
    File {
        /// The file being accessed
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

fn sol(lamports: &u64) -> Decimal {
    lamports_to_sol(*lamports)
}

impl WalletError {
    /// Gets the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            WalletError::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl From<CoreError> for WalletError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidPublicKey { input, reason } => {
                WalletError::InvalidPublicKey(format!("{:?} ({})", input, reason))
            }
            CoreError::InvalidSecretKey(msg) | CoreError::InvalidFileFormat(msg) => {
                WalletError::InvalidFileFormat(msg)
            }
            CoreError::InvalidAmount { .. } => WalletError::Usage(error.to_string()),
            CoreError::TransactionBuild(msg) => WalletError::Network(msg),
            CoreError::Io { path, source } => WalletError::File { path, source },
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(error: reqwest::Error) -> Self {
        WalletError::Network(error.to_string())
    }
}
