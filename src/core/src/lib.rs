//! Core primitives for the sol-cli wallet.
//!
//! This crate provides the key material, the on-disk keypair format, exact
//! SOL/lamport conversion and the compilation and signing of native transfer
//! transactions. It performs no network I/O.

pub mod errors;
pub mod keypair;
pub mod transaction;
pub mod types;

// Re-export commonly used types
pub use errors::CoreError;
pub use keypair::{Keypair, KeypairFile};
pub use transaction::{build_transfer, SignedTransaction, Transaction};
pub use types::{lamports_to_sol, sol_to_lamports, Pubkey, LAMPORTS_PER_SOL};
