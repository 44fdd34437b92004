//! Native transfer transactions in the chain's compact wire format.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        program index u8, account indices, data
//! ```

use crate::errors::CoreError;
use crate::keypair::Keypair;
use crate::types::Pubkey;

/// The System Program address (32 zero bytes).
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// System Program `Transfer` instruction discriminant.
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// Appends `value` in compact-u16 encoding (7 bits per byte, high bit continues).
fn push_compact_u16(buf: &mut Vec<u8>, value: u16) {
    let mut rem = value;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if rem == 0 {
            break;
        }
    }
}

fn compact_len(len: usize) -> Result<u16, CoreError> {
    u16::try_from(len)
        .map_err(|_| CoreError::TransactionBuild(format!("length {} exceeds compact-u16", len)))
}

/// An account referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction before compilation into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Builds a System Program transfer of `lamports` from `from` to `to`.
pub fn transfer_instruction(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta {
                pubkey: *from,
                is_signer: true,
                is_writable: true,
            },
            AccountMeta {
                pubkey: *to,
                is_signer: false,
                is_writable: true,
            },
        ],
        data,
    }
}

/// An instruction with its accounts replaced by indices into the message keys.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CompiledInstruction {
    program_id_index: u8,
    account_indices: Vec<u8>,
    data: Vec<u8>,
}

/// An unsigned transaction message with a single fee payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    account_keys: Vec<Pubkey>,
    num_required_signatures: u8,
    num_readonly_signed: u8,
    num_readonly_unsigned: u8,
    recent_blockhash: [u8; 32],
    instructions: Vec<CompiledInstruction>,
}

/// Builds a transaction moving `lamports` from `from` (also the fee payer) to `to`.
pub fn build_transfer(
    from: &Pubkey,
    to: &Pubkey,
    lamports: u64,
    recent_blockhash: [u8; 32],
) -> Result<Transaction, CoreError> {
    Transaction::compile(&[transfer_instruction(from, to, lamports)], from, recent_blockhash)
}

impl Transaction {
    /// Compiles instructions into a message paid for by `fee_payer`.
    ///
    /// Account keys are ordered writable signers, read-only signers, writable
    /// non-signers, read-only non-signers, with the fee payer first.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: [u8; 32],
    ) -> Result<Self, CoreError> {
        let mut entries: Vec<AccountMeta> = Vec::new();
        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            match entries.iter_mut().find(|e| e.pubkey == pubkey) {
                Some(entry) => {
                    entry.is_signer |= is_signer;
                    entry.is_writable |= is_writable;
                }
                None => entries.push(AccountMeta {
                    pubkey,
                    is_signer,
                    is_writable,
                }),
            }
        };

        upsert(*fee_payer, true, true);
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps the fee payer ahead of other writable signers.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > usize::from(u8::MAX) {
            return Err(CoreError::TransactionBuild(format!(
                "too many accounts: {}",
                entries.len()
            )));
        }

        let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
        let num_readonly_signed = entries
            .iter()
            .filter(|e| e.is_signer && !e.is_writable)
            .count() as u8;
        let num_readonly_unsigned = entries
            .iter()
            .filter(|e| !e.is_signer && !e.is_writable)
            .count() as u8;

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, CoreError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| CoreError::TransactionBuild(format!("account {} not in message", key)))
        };

        let instructions = instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    account_indices: ix
                        .accounts
                        .iter()
                        .map(|meta| index_of(&meta.pubkey))
                        .collect::<Result<_, _>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self {
            account_keys,
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            recent_blockhash,
            instructions,
        })
    }

    /// Gets the fee payer.
    pub fn fee_payer(&self) -> Pubkey {
        self.account_keys[0]
    }

    /// Serializes the message (the bytes that get signed).
    pub fn message_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        push_compact_u16(&mut buf, compact_len(self.account_keys.len())?);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        push_compact_u16(&mut buf, compact_len(self.instructions.len())?);
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            push_compact_u16(&mut buf, compact_len(ix.account_indices.len())?);
            buf.extend_from_slice(&ix.account_indices);
            push_compact_u16(&mut buf, compact_len(ix.data.len())?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Signs the message with the fee payer's keypair.
    pub fn sign(&self, payer: &Keypair) -> Result<SignedTransaction, CoreError> {
        if self.num_required_signatures != 1 {
            return Err(CoreError::TransactionBuild(format!(
                "expected a single signer, message requires {}",
                self.num_required_signatures
            )));
        }
        if payer.pubkey() != self.fee_payer() {
            return Err(CoreError::TransactionBuild(format!(
                "signer {} is not the fee payer {}",
                payer.pubkey(),
                self.fee_payer()
            )));
        }

        let message = self.message_bytes()?;
        let signature = payer.sign(&message);

        Ok(SignedTransaction { signature, message })
    }
}

/// A single-signer transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    signature: [u8; 64],
    message: Vec<u8>,
}

impl SignedTransaction {
    /// Gets the transaction id: the base58 fee payer signature.
    pub fn signature(&self) -> String {
        bs58::encode(self.signature).into_string()
    }

    /// Serializes the transaction into its wire format.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(1 + 64 + self.message.len());
        push_compact_u16(&mut wire, 1);
        wire.extend_from_slice(&self.signature);
        wire.extend_from_slice(&self.message);
        wire
    }

    /// Serializes the wire format as base58 for JSON-RPC submission.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_wire()).into_string()
    }
}
