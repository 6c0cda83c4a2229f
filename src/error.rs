//! Crate-wide error taxonomy.
//!
//! Every core operation returns `Result<T, CoreError>`; the core never prints
//! or logs an error itself (that is the CLI layer's job — see [`crate::cli`]).
//! Variants are grouped the way §7 of the specification groups them:
//! validation, authentication/authorization, resource, integrity/format,
//! transport, local I/O, and user-driven errors.

use std::path::PathBuf;

/// A core operation's failure. Never wraps key material.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    // --- Validation ---
    #[error("mnemonic must have 12 words, got {0}")]
    InvalidWordCount(usize),

    #[error("word {word:?} at position {index} is not in the BIP39 English list")]
    InvalidWord { index: usize, word: String },

    #[error("mnemonic checksum does not match")]
    InvalidChecksum,

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid bucket name: {0}")]
    InvalidBucketName(String),

    // --- Authentication / Authorization ---
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("access denied{}", resource.as_ref().map(|r| format!(" to {r}")).unwrap_or_default())]
    AccessDenied { resource: Option<String> },

    #[error("decryption failed: wrong mnemonic or corrupted configuration")]
    DecryptionFailed,

    #[error("AEAD authentication failed while opening a frame")]
    AuthFailure,

    // --- Resource ---
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("bucket not empty: {0}")]
    BucketNotEmpty(String),

    #[error("no configuration found")]
    ConfigNotFound,

    #[error("no vault named {0:?}")]
    VaultNotFound(String),

    // --- Integrity / Format ---
    #[error("ciphertext truncated inside a frame")]
    Truncated,

    #[error("integrity check failed: {0}")]
    IntegrityCheckFailed(String),

    #[error("unsupported configuration version {0}")]
    UnsupportedVersion(u32),

    // --- Transport ---
    #[error("request failed: status {status}{}{}",
        code.as_ref().map(|c| format!(", code {c}")).unwrap_or_default(),
        message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    RequestFailed {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    // --- Local I/O ---
    #[error("file access failed at {path}: {source}")]
    FileAccessFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret store error: {0}")]
    SecretStore(String),

    // --- User ---
    #[error("operation cancelled by user")]
    UserCancelled,

    #[error("a mnemonic is required but none was available")]
    MnemonicRequired,
}

impl CoreError {
    /// Whether a caller may retry this error without new user input.
    ///
    /// `AuthFailure` and `DecryptionFailed` are terminal per §7; a
    /// `RequestFailed` with a 5xx status may be retried, 4xx is terminal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::RequestFailed { status, .. } if *status >= 500)
    }

    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::FileAccessFailed { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
