//! Commands for the CLI wallet.

pub mod airdrop;
pub mod balance;
pub mod generate;
pub mod transfer;

use crate::errors::WalletError;
use sol_core::{KeypairFile, Pubkey};
use std::path::PathBuf;
use tracing::debug;

/// Where a command takes its target public key from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// The `publicKey` field of a keypair file
    File(PathBuf),
    /// A literal base58 public key
    PublicKey(String),
}

impl KeySource {
    /// Builds a key source from the `--file` and `--publicKey` flags.
    ///
    /// Exactly one of the two must be given.
    pub fn from_flags(file: Option<PathBuf>, public_key: Option<String>) -> Result<Self, WalletError> {
        match (file, public_key) {
            (Some(_), Some(_)) => Err(WalletError::Usage(
                "Please provide either a file or a public key, not both.".to_string(),
            )),
            (None, None) => Err(WalletError::Usage(
                "Please provide either a file or a public key.".to_string(),
            )),
            (Some(file), None) => Ok(KeySource::File(file)),
            (None, Some(key)) => Ok(KeySource::PublicKey(key)),
        }
    }

    /// Resolves the public key, reading the keypair file if needed.
    pub fn resolve(&self) -> Result<Pubkey, WalletError> {
        match self {
            KeySource::File(path) => {
                let file = KeypairFile::load(path)?;
                debug!("Loaded public key from {}", path.display());
                Ok(file.public_key()?)
            }
            KeySource::PublicKey(key) => Ok(key.parse()?),
        }
    }
}
