//! End-to-end tests of the command line surface against a mock node.

use crate::mock_node::MockNode;
use serial_test::serial;
use sol_cli::app::{dispatch, Opt, Outcome};
use sol_cli::config::ENDPOINT_ENV;
use sol_cli::WalletError;
use sol_core::KeypairFile;
use std::path::Path;
use structopt::StructOpt;
use tempfile::tempdir;

/// Parses a command line, prefixing the program name.
fn opt(args: &[&str]) -> Opt {
    Opt::from_iter_safe(std::iter::once("sol-cli").chain(args.iter().copied())).unwrap()
}

/// Runs a command against the mock node.
async fn run(node: &MockNode, args: &[&str]) -> Result<Outcome, WalletError> {
    let url = node.url();
    let mut full = vec!["--url", url.as_str()];
    full.extend_from_slice(args);
    dispatch(opt(&full)).await
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Tests that a generated keypair file reads back to the same key material.
#[tokio::test]
async fn test_generate_round_trip() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.json");

    let outcome = run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();
    let pubkey = match outcome {
        Outcome::Generated { path: saved, pubkey } => {
            assert_eq!(saved, path);
            pubkey
        }
        other => panic!("unexpected outcome {:?}", other),
    };

    let contents = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["publicKey"].as_str().unwrap(), pubkey.to_string());
    assert_eq!(value["secretKey"].as_array().unwrap().len(), 64);

    let keypair = KeypairFile::load(&path).unwrap().keypair().unwrap();
    assert_eq!(keypair.pubkey(), pubkey);
    assert_eq!(&keypair.secret_bytes()[32..], pubkey.as_bytes());

    // Generating touches no network
    assert!(node.calls().is_empty());
}

/// Tests that a second generate replaces the first key.
#[tokio::test]
async fn test_generate_twice_overwrites() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.json");

    run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();
    let first = KeypairFile::load(&path).unwrap();
    run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();
    let second = KeypairFile::load(&path).unwrap();

    assert_ne!(first.public_key().unwrap(), second.public_key().unwrap());
    assert_ne!(
        first.keypair().unwrap().secret_bytes(),
        second.keypair().unwrap().secret_bytes()
    );
}

/// Tests that a fresh key reports a zero balance.
#[tokio::test]
async fn test_unfunded_balance_is_zero() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.json");
    run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();

    let outcome = run(&node, &["getbalance", "-f", path_str(&path)]).await.unwrap();
    match &outcome {
        Outcome::Balance(balance) => assert_eq!(balance.lamports, 0),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(outcome.to_string().ends_with(": 0 SOL"));
    assert_eq!(node.calls(), vec!["getBalance"]);
}

/// Tests that file and public key flags are mutually exclusive and one is required.
#[tokio::test]
async fn test_key_flags_exclusive_without_network() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.json");
    run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();
    let key = KeypairFile::load(&path).unwrap().public_key().unwrap().to_string();

    for cmd in ["airdrop", "getbalance"] {
        let err = run(&node, &[cmd, "-f", path_str(&path), "-p", &key])
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Usage(_)), "{}: {:?}", cmd, err);
        assert_eq!(err.exit_code(), 2);

        let err = run(&node, &[cmd]).await.unwrap_err();
        assert!(matches!(err, WalletError::Usage(_)), "{}: {:?}", cmd, err);
    }

    assert!(node.calls().is_empty());
}

/// Tests airdrops by file and by literal key.
#[tokio::test]
async fn test_airdrop_then_balance() {
    let node = MockNode::start();
    let dir = tempdir().unwrap();
    let path = dir.path().join("k.json");
    run(&node, &["generate", "-o", path_str(&path)]).await.unwrap();
    let key = KeypairFile::load(&path).unwrap().public_key().unwrap().to_string();

    let outcome = run(&node, &["airdrop", "-f", path_str(&path)]).await.unwrap();
    match outcome {
        Outcome::Airdropped(receipt) => {
            assert_eq!(receipt.recipient.to_string(), key);
            assert_eq!(receipt.lamports, 1_000_000_000);
            assert!(!receipt.signature.is_empty());
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    run(&node, &["airdrop", "--publicKey", &key, "--amount", "0.5"])
        .await
        .unwrap();
    assert_eq!(node.balance(&key), 1_500_000_000);

    let outcome = run(&node, &["getbalance", "-p", &key]).await.unwrap();
    assert_eq!(outcome.to_string(), format!("Balance of {}: 1.5 SOL", key));
}

/// Tests that a faucet rejection surfaces as a network error.
#[tokio::test]
async fn test_airdrop_rate_limited() {
    let node = MockNode::start();
    node.rate_limit_airdrops();
    let key = sol_core::Keypair::generate().pubkey().to_string();

    let err = run(&node, &["airdrop", "-p", &key]).await.unwrap_err();
    match &err {
        WalletError::Rejected { method, code, message } => {
            assert_eq!(method, "requestAirdrop");
            assert_eq!(*code, 429);
            assert!(message.contains("Too many requests"), "{}", message);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
}

/// Tests that malformed amounts and keys are rejected before any request.
#[tokio::test]
async fn test_bad_input_without_network() {
    let node = MockNode::start();
    let key = sol_core::Keypair::generate().pubkey().to_string();

    let err = run(&node, &["airdrop", "-p", &key, "-a", "one"]).await.unwrap_err();
    assert!(matches!(err, WalletError::Usage(_)));

    let err = run(&node, &["airdrop", "-p", &key, "-a", "-1"]).await.unwrap_err();
    assert!(matches!(err, WalletError::Usage(_)));

    let err = run(&node, &["getbalance", "-p", "0OIl"]).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidPublicKey(_)));

    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = run(&node, &["getbalance", "-f", path_str(&missing)]).await.unwrap_err();
    assert!(matches!(err, WalletError::File { .. }));

    assert!(node.calls().is_empty());
}

/// Tests that an unreachable endpoint is a network error.
#[tokio::test]
async fn test_unreachable_endpoint() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let key = sol_core::Keypair::generate().pubkey().to_string();
    let err = dispatch(opt(&["--url", &url, "getbalance", "-p", &key]))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Network(_)), "{:?}", err);
}

/// Tests that the endpoint can come from the environment or a config file.
#[tokio::test]
#[serial]
async fn test_endpoint_from_env_and_config() {
    let node = MockNode::start();
    let key = sol_core::Keypair::generate().pubkey().to_string();

    std::env::set_var(ENDPOINT_ENV, node.url());
    let result = dispatch(opt(&["getbalance", "-p", &key])).await;
    std::env::remove_var(ENDPOINT_ENV);
    result.unwrap();
    assert_eq!(node.calls().len(), 1);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({ "endpoint": node.url() }).to_string(),
    )
    .unwrap();
    dispatch(opt(&["--config", path_str(&config_path), "getbalance", "-p", &key]))
        .await
        .unwrap();
    assert_eq!(node.calls().len(), 2);
}
