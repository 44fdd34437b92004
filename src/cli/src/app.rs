//! Command line surface and dispatch.

use crate::commands::airdrop::{self, AirdropReceipt};
use crate::commands::balance::{self, AccountBalance};
use crate::commands::generate;
use crate::commands::transfer::{self, TransferReceipt};
use crate::commands::KeySource;
use crate::config::CliConfig;
use crate::errors::WalletError;
use sol_core::{lamports_to_sol, sol_to_lamports, Pubkey};
use std::fmt;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::debug;

/// Command line arguments for the CLI wallet.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "sol-cli",
    about = "Command line tool for basic wallet management and SOL airdrops"
)]
pub struct Opt {
    /// Path to a JSON configuration file
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// RPC endpoint, overriding the configuration and SOL_RPC_URL
    #[structopt(short, long)]
    pub url: Option<String>,

    /// Seconds to wait for a transfer to be confirmed
    #[structopt(long)]
    pub timeout: Option<u64>,

    /// Subcommand to run
    #[structopt(subcommand)]
    pub cmd: Command,
}

/// Subcommands for the CLI wallet.
#[derive(Debug, StructOpt)]
pub enum Command {
    /// Generates a new keypair and saves it as JSON
    #[structopt(name = "generate")]
    Generate {
        /// Output file name
        #[structopt(short, long, parse(from_os_str), default_value = "keypair.json")]
        output: PathBuf,
    },

    /// Airdrops SOL to a keypair file's public key or to a given public key
    #[structopt(name = "airdrop")]
    Airdrop {
        /// JSON file containing the keypair
        #[structopt(short, long, parse(from_os_str))]
        file: Option<PathBuf>,

        /// Public key to airdrop SOL to
        #[structopt(short = "p", long = "publicKey")]
        public_key: Option<String>,

        /// Amount of SOL to airdrop
        #[structopt(short, long, default_value = "1")]
        amount: String,
    },

    /// Fetches the balance of a keypair file's public key or of a given public key
    #[structopt(name = "getbalance")]
    GetBalance {
        /// JSON file containing the keypair
        #[structopt(short, long, parse(from_os_str))]
        file: Option<PathBuf>,

        /// Public key to check the balance of
        #[structopt(short = "p", long = "publicKey")]
        public_key: Option<String>,
    },

    /// Transfers SOL from the keypair in the JSON file to another public key
    #[structopt(name = "transfer")]
    Transfer {
        /// JSON file containing the sender's keypair
        #[structopt(short, long, parse(from_os_str), default_value = "keypair.json")]
        file: PathBuf,

        /// Recipient's public key
        #[structopt(short, long)]
        recipient: String,

        /// Amount of SOL to transfer
        #[structopt(short, long)]
        amount: String,
    },
}

/// A command whose flags have been checked. Building one performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Generate {
        output: PathBuf,
    },
    Airdrop {
        source: KeySource,
        lamports: u64,
    },
    GetBalance {
        source: KeySource,
    },
    Transfer {
        file: PathBuf,
        recipient: String,
        lamports: u64,
    },
}

impl TryFrom<Command> for Request {
    type Error = WalletError;

    fn try_from(cmd: Command) -> Result<Self, Self::Error> {
        Ok(match cmd {
            Command::Generate { output } => Request::Generate { output },
            Command::Airdrop {
                file,
                public_key,
                amount,
            } => Request::Airdrop {
                source: KeySource::from_flags(file, public_key)?,
                lamports: sol_to_lamports(&amount)?,
            },
            Command::GetBalance { file, public_key } => Request::GetBalance {
                source: KeySource::from_flags(file, public_key)?,
            },
            Command::Transfer {
                file,
                recipient,
                amount,
            } => Request::Transfer {
                file,
                recipient,
                lamports: sol_to_lamports(&amount)?,
            },
        })
    }
}

/// The successful result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Generated { path: PathBuf, pubkey: Pubkey },
    Airdropped(AirdropReceipt),
    Balance(AccountBalance),
    Transferred(TransferReceipt),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Generated { path, pubkey } => {
                write!(f, "Keypair {} saved to {}", pubkey, path.display())
            }
            Outcome::Airdropped(receipt) => write!(
                f,
                "Airdrop of {} SOL to {} successful. Transaction hash: {}",
                lamports_to_sol(receipt.lamports),
                receipt.recipient,
                receipt.signature
            ),
            Outcome::Balance(balance) => {
                write!(f, "Balance of {}: {} SOL", balance.pubkey, balance.sol())
            }
            Outcome::Transferred(receipt) => write!(
                f,
                "Transfer of {} SOL to {} successful. Transaction signature: {}",
                lamports_to_sol(receipt.lamports),
                receipt.to,
                receipt.signature
            ),
        }
    }
}

/// Builds the effective configuration.
///
/// Precedence, lowest first: defaults, config file, `SOL_RPC_URL`, `--url`, `--timeout`.
pub fn load_config(
    path: Option<&Path>,
    url: Option<String>,
    timeout: Option<u64>,
) -> Result<CliConfig, WalletError> {
    let mut config = match path {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    }
    .with_env();

    if let Some(url) = url {
        config.endpoint = url;
    }
    if let Some(timeout) = timeout {
        config.confirm_timeout_secs = timeout;
    }

    debug!("Using configuration {:?}", config);
    Ok(config)
}

/// Runs one parsed command line.
///
/// Flag errors are reported as `WalletError::Usage` before any file or
/// network access.
pub async fn dispatch(opt: Opt) -> Result<Outcome, WalletError> {
    let request = Request::try_from(opt.cmd)?;
    let config = load_config(opt.config.as_deref(), opt.url, opt.timeout)?;

    match request {
        Request::Generate { output } => {
            let pubkey = generate::run(&output).await?;
            Ok(Outcome::Generated {
                path: output,
                pubkey,
            })
        }
        Request::Airdrop { source, lamports } => {
            let receipt = airdrop::run(&config, &source, lamports).await?;
            Ok(Outcome::Airdropped(receipt))
        }
        Request::GetBalance { source } => {
            let balance = balance::run(&config, &source).await?;
            Ok(Outcome::Balance(balance))
        }
        Request::Transfer {
            file,
            recipient,
            lamports,
        } => {
            let receipt = transfer::run(&config, &file, &recipient, lamports).await?;
            Ok(Outcome::Transferred(receipt))
        }
    }
}
