//! Configuration for the CLI wallet.

use crate::errors::WalletError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the RPC endpoint.
pub const ENDPOINT_ENV: &str = "SOL_RPC_URL";

/// Public devnet endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.devnet.solana.com";

/// Configuration for the CLI wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// The JSON-RPC endpoint to connect to
    pub endpoint: String,
    /// Commitment level for reads and confirmation
    pub commitment: Commitment,
    /// Deadline for a transfer to reach `commitment`
    pub confirm_timeout_secs: u64,
    /// Period between signature status polls
    pub poll_interval_ms: u64,
    /// Timeout for each HTTP request
    pub request_timeout_secs: u64,
    /// Total attempts for a transfer whose submission is rejected
    pub transfer_attempts: u32,
}

/// How settled a transaction or read must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    /// Gets the name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            commitment: Commitment::Confirmed,
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
            request_timeout_secs: 30,
            transfer_attempts: 1,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| WalletError::File {
                path: path.to_path_buf(),
                source,
            })?;

        serde_json::from_str(&contents).map_err(|e| {
            WalletError::Usage(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::Usage(format!("cannot serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), contents).map_err(|source| WalletError::File {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Applies the endpoint override from the environment, if set.
    pub fn with_env(mut self) -> Self {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
        self
    }

    /// Gets the confirmation deadline.
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// Gets the status polling period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Gets the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
