//! Error types for the core crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error when a string does not decode to a 32-byte public key.
    #[error("Invalid public key {input:?}: {reason}")]
    InvalidPublicKey {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Error when secret key material is malformed or inconsistent.
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Error when a keypair document is malformed or lacks a required field.
    #[error("Invalid keypair file format: {0}")]
    InvalidFileFormat(String),

    /// Error when a SOL amount cannot be turned into lamports.
    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Error when a transaction cannot be compiled.
    #[error("Transaction build error: {0}")]
    TransactionBuild(String),

    /// Error when reading or writing a keypair file fails.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being accessed
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}
