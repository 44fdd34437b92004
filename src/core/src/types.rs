//! Public keys and amounts.

use crate::errors::CoreError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places of a SOL amount that still map to whole lamports.
const SOL_DECIMALS: u32 = 9;

/// A 32-byte account address, displayed and parsed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    /// Wraps raw key bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Borrows the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Pubkey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CoreError::InvalidPublicKey {
            input: s.to_string(),
            reason,
        };

        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| invalid(format!("base58 decode failed: {}", e)))?;

        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| invalid(format!("expected 32 bytes, got {}", v.len())))?;

        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Pubkey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pubkey> for String {
    fn from(key: Pubkey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

/// Converts a decimal SOL amount to lamports.
///
/// The conversion is exact: `"0.5"` is 500_000_000 lamports. Negative
/// amounts, amounts finer than one lamport and amounts that overflow a
/// `u64` are rejected.
pub fn sol_to_lamports(amount: &str) -> Result<u64, CoreError> {
    let invalid = |reason: &str| CoreError::InvalidAmount {
        input: amount.to_string(),
        reason: reason.to_string(),
    };

    let sol = Decimal::from_str(amount.trim()).map_err(|_| invalid("not a decimal number"))?;
    if sol.is_sign_negative() && !sol.is_zero() {
        return Err(invalid("amount must not be negative"));
    }

    let lamports = sol
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or_else(|| invalid("amount is too large"))?;
    if !lamports.fract().is_zero() {
        return Err(invalid("amount is finer than one lamport"));
    }

    lamports
        .to_u64()
        .ok_or_else(|| invalid("amount is too large"))
}

/// Converts lamports to SOL without loss of precision.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    let mut sol = Decimal::from(lamports);
    // Exact: dividing by 10^9 only moves the decimal point.
    sol.set_scale(SOL_DECIMALS).ok();
    sol.normalize()
}
