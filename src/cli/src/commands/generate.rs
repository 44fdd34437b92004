//! Generate command for the CLI wallet.

use crate::errors::WalletError;
use sol_core::{Keypair, KeypairFile, Pubkey};
use std::path::Path;
use tracing::{debug, info};

/// Runs the generate command.
///
/// Any existing file at `output` is overwritten.
pub async fn run<P: AsRef<Path>>(output: P) -> Result<Pubkey, WalletError> {
    let output = output.as_ref();
    if output.exists() {
        debug!("Overwriting existing file {}", output.display());
    }

    let keypair = Keypair::generate();
    KeypairFile::from_keypair(&keypair).save(output)?;
    info!("Keypair {} saved to {}", keypair.pubkey(), output.display());

    Ok(keypair.pubkey())
}
