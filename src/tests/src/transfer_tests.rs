//! Transfer tests against a mock node.

use crate::mock_node::MockNode;
use sol_cli::app::{dispatch, Opt, Outcome};
use sol_cli::WalletError;
use sol_core::{Keypair, KeypairFile, LAMPORTS_PER_SOL};
use std::path::PathBuf;
use structopt::StructOpt;
use tempfile::{tempdir, TempDir};

/// Writes a fresh sender keypair and funds it on the node.
fn funded_sender(node: &MockNode, lamports: u64) -> (TempDir, PathBuf, String) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sender.json");
    let keypair = Keypair::generate();
    KeypairFile::from_keypair(&keypair).save(&path).unwrap();

    let pubkey = keypair.pubkey().to_string();
    node.set_balance(&pubkey, lamports);
    (dir, path, pubkey)
}

async fn transfer(node: &MockNode, file: &PathBuf, recipient: &str, amount: &str) -> Result<Outcome, WalletError> {
    let url = node.url();
    let opt = Opt::from_iter_safe([
        "sol-cli",
        "--url",
        url.as_str(),
        "transfer",
        "--file",
        file.to_str().unwrap(),
        "--recipient",
        recipient,
        "--amount",
        amount,
    ])
    .unwrap();
    dispatch(opt).await
}

/// Tests a confirmed transfer end to end, including signature verification by the node.
#[tokio::test]
async fn test_transfer_confirmed() {
    let node = MockNode::start();
    let (_dir, path, sender) = funded_sender(&node, 2 * LAMPORTS_PER_SOL);
    let recipient = Keypair::generate().pubkey().to_string();

    let outcome = transfer(&node, &path, &recipient, "0.5").await.unwrap();
    let receipt = match outcome {
        Outcome::Transferred(receipt) => receipt,
        other => panic!("unexpected outcome {:?}", other),
    };

    assert_eq!(receipt.from.to_string(), sender);
    assert_eq!(receipt.to.to_string(), recipient);
    assert_eq!(receipt.lamports, 500_000_000);
    assert_eq!(node.balance(&sender), 1_500_000_000);
    assert_eq!(node.balance(&recipient), 500_000_000);
    assert_eq!(
        node.calls(),
        vec!["getBalance", "getLatestBlockhash", "sendTransaction", "getSignatureStatuses"]
    );
}

/// Tests that an underfunded sender fails without submitting.
#[tokio::test]
async fn test_insufficient_balance() {
    let node = MockNode::start();
    let (_dir, path, sender) = funded_sender(&node, LAMPORTS_PER_SOL / 4);
    let recipient = Keypair::generate().pubkey().to_string();

    let err = transfer(&node, &path, &recipient, "1").await.unwrap_err();
    match &err {
        WalletError::InsufficientBalance { balance, required } => {
            assert_eq!(*balance, 250_000_000);
            assert_eq!(*required, 1_000_000_000);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Insufficient balance: current balance 0.25 SOL, attempted transfer 1 SOL"
    );
    assert_eq!(node.calls(), vec!["getBalance"]);
    assert_eq!(node.balance(&sender), 250_000_000);
}

/// Tests that a keypair file without secret material is rejected before any request.
#[tokio::test]
async fn test_missing_secret_key() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("public-only.json");
    let key = Keypair::generate().pubkey().to_string();
    std::fs::write(&path, serde_json::json!({ "publicKey": key }).to_string()).unwrap();
    node.set_balance(&key, LAMPORTS_PER_SOL);

    let err = transfer(&node, &path, &key, "0.1").await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidFileFormat(_)), "{:?}", err);
    assert!(node.calls().is_empty());
}

/// Tests that an invalid recipient is rejected before any request.
#[tokio::test]
async fn test_invalid_recipient() {
    let node = MockNode::start();
    let (_dir, path, _sender) = funded_sender(&node, LAMPORTS_PER_SOL);

    let err = transfer(&node, &path, "recipient", "0.1").await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidPublicKey(_)), "{:?}", err);
    assert!(node.calls().is_empty());
}

/// Tests that an unconfirmed transfer ends in a timeout instead of hanging.
#[tokio::test]
async fn test_confirmation_timeout() {
    let node = MockNode::start();
    node.withhold_confirmations();
    let (_dir, path, _sender) = funded_sender(&node, LAMPORTS_PER_SOL);
    let recipient = Keypair::generate().pubkey().to_string();
    let url = node.url();

    let opt = Opt::from_iter_safe([
        "sol-cli",
        "--url",
        url.as_str(),
        "--timeout",
        "1",
        "transfer",
        "-f",
        path.to_str().unwrap(),
        "-r",
        recipient.as_str(),
        "-a",
        "0.1",
    ])
    .unwrap();
    let err = dispatch(opt).await.unwrap_err();

    assert!(matches!(err, WalletError::Timeout { .. }), "{:?}", err);
    assert_eq!(err.exit_code(), 1);
    assert_eq!(
        node.calls().iter().filter(|m| *m == "sendTransaction").count(),
        1
    );
}
