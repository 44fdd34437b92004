//! JSON-RPC client for the chain node.

use crate::config::{CliConfig, Commitment};
use crate::errors::WalletError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sol_core::{Pubkey, SignedTransaction};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Status of a submitted transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    /// Highest commitment the transaction has reached
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
    /// Execution error, if the transaction failed on chain
    #[serde(default)]
    pub err: Option<Value>,
}

/// The chain operations the wallet needs.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Gets the balance of an account in lamports.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WalletError>;

    /// Asks the faucet for `lamports`, returning the transaction signature.
    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<String, WalletError>;

    /// Gets a recent blockhash to anchor a new transaction.
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], WalletError>;

    /// Submits a signed transaction, returning its signature.
    async fn send_transaction(&self, transaction: &SignedTransaction) -> Result<String, WalletError>;

    /// Gets the status of a transaction, `None` if the node has not seen it.
    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, WalletError>;
}

/// Wrapper for responses that carry a `context` alongside the value.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

/// A ChainRpc backed by HTTP JSON-RPC 2.0.
#[derive(Debug)]
pub struct JsonRpcClient {
    client: reqwest::Client,
    endpoint: String,
    commitment: Commitment,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: &CliConfig) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            commitment: config.commitment,
            next_id: AtomicU64::new(1),
        })
    }

    /// Calls a JSON-RPC method and decodes its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!("RPC request to {}: {}", self.endpoint, request);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Network(format!("Failed to connect to {}: {}", self.endpoint, e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| WalletError::Network(format!("Failed to get response text: {}", e)))?;
        debug!("RPC response ({}) for {}: {}", status, method, response_text);

        if response_text.is_empty() {
            return Err(WalletError::Network(format!(
                "Empty response from node (HTTP {})",
                status
            )));
        }

        let response: Value = serde_json::from_str(&response_text).map_err(|e| {
            WalletError::Network(format!("Failed to parse response (HTTP {}): {}", status, e))
        })?;

        if let Some(error) = response.get("error") {
            if !error.is_null() {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                return Err(WalletError::Rejected {
                    method: method.to_string(),
                    code,
                    message,
                });
            }
        }

        let result = response
            .get("result")
            .cloned()
            .ok_or_else(|| WalletError::Network(format!("No result in response: {}", response_text)))?;

        serde_json::from_value(result)
            .map_err(|e| WalletError::Network(format!("Unexpected {} result: {}", method, e)))
    }
}

#[async_trait]
impl ChainRpc for JsonRpcClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WalletError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([pubkey.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<String, WalletError> {
        self.call(
            "requestAirdrop",
            json!([pubkey.to_string(), lamports, { "commitment": self.commitment.as_str() }]),
        )
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], WalletError> {
        let latest: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;

        let hash: Pubkey = latest
            .value
            .blockhash
            .parse()
            .map_err(|e| WalletError::Network(format!("Invalid blockhash from node: {}", e)))?;
        Ok(hash.to_bytes())
    }

    async fn send_transaction(&self, transaction: &SignedTransaction) -> Result<String, WalletError> {
        self.call(
            "sendTransaction",
            json!([
                transaction.to_base58(),
                {
                    "encoding": "base58",
                    "preflightCommitment": self.commitment.as_str(),
                }
            ]),
        )
        .await
    }

    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, WalletError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

/// Waits until `signature` reaches `commitment`, polling every `interval`.
///
/// Fails with `Network` if the transaction failed on chain and with `Timeout`
/// once `deadline` has elapsed.
pub async fn confirm_transaction<R: ChainRpc + ?Sized>(
    rpc: &R,
    signature: &str,
    commitment: Commitment,
    interval: Duration,
    deadline: Duration,
) -> Result<(), WalletError> {
    let poll = async {
        loop {
            if let Some(status) = rpc.get_signature_status(signature).await? {
                if let Some(err) = status.err {
                    return Err(WalletError::Network(format!(
                        "Transaction {} failed: {}",
                        signature, err
                    )));
                }
                if status.confirmation_status.map_or(false, |c| c >= commitment) {
                    info!("Transaction {} reached {}", signature, commitment.as_str());
                    return Ok(());
                }
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(deadline, poll)
        .await
        .map_err(|_| WalletError::Timeout {
            signature: signature.to_string(),
            waited: deadline,
        })?
}
