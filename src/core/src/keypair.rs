//! Key material and the on-disk keypair format.

use crate::errors::CoreError;
use crate::types::Pubkey;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Length of the secret key material: 32-byte seed followed by the public key.
pub const SECRET_KEY_LENGTH: usize = 64;

/// An Ed25519 keypair identifying an account and authorizing its transfers.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Creates a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuilds a keypair from its 64-byte secret key.
    ///
    /// The trailing 32 bytes must be the public key derived from the leading
    /// 32-byte seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let bytes: &[u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CoreError::InvalidSecretKey(format!(
                "expected {} bytes, got {}",
                SECRET_KEY_LENGTH,
                bytes.len()
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(bytes).map_err(|_| {
            CoreError::InvalidSecretKey("public half does not match the secret seed".to_string())
        })?;

        Ok(Self { signing_key })
    }

    /// Gets the public key.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Gets the 64-byte secret key (seed followed by public key).
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    /// Signs a message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

/// The JSON keypair document: `{ "publicKey": "<base58>", "secretKey": [64 bytes] }`.
///
/// Both fields are optional when reading so that commands which only need the
/// public key can accept files without secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypairFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret_key: Option<Vec<u8>>,
}

impl KeypairFile {
    /// Creates the document for a keypair.
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            public_key: Some(keypair.pubkey().to_string()),
            secret_key: Some(keypair.secret_bytes().to_vec()),
        }
    }

    /// Parses a keypair document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidFileFormat(e.to_string()))
    }

    /// Renders the document with 2-space indentation.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::InvalidFileFormat(e.to_string()))
    }

    /// Loads a keypair document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(io_error(path))?;

        debug!("Read keypair file {}", path.display());
        Self::from_json(&contents)
    }

    /// Saves the document, replacing any existing file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let contents = self.to_json()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }

        File::create(path)
            .and_then(|mut file| file.write_all(contents.as_bytes()))
            .map_err(io_error(path))
    }

    /// Gets the public key, requiring the `publicKey` field.
    ///
    /// The key is not checked against the secret key.
    pub fn public_key(&self) -> Result<Pubkey, CoreError> {
        let key = self.public_key.as_deref().ok_or_else(|| {
            CoreError::InvalidFileFormat("public key not found".to_string())
        })?;
        key.parse()
    }

    /// Gets the full keypair, requiring both the `publicKey` and `secretKey` fields.
    pub fn keypair(&self) -> Result<Keypair, CoreError> {
        match (&self.public_key, &self.secret_key) {
            (Some(_), Some(secret)) => Keypair::from_secret_bytes(secret),
            _ => Err(CoreError::InvalidFileFormat(
                "public key or secret key not found".to_string(),
            )),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CoreError + '_ {
    move |source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
