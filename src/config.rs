//! Application constants and cryptographic parameters.
//!
//! This module defines the core constants used throughout the crate: chunk
//! sizing for the streaming codec, AEAD parameter widths, key-derivation
//! iteration counts, filesystem layout, and default S3 settings. These
//! constants are the single source of truth for the on-wire and on-disk
//! formats specified in §3 and §6 of the specification.

/// Plaintext chunk size for non-terminal stream-codec frames: 1 MiB.
pub const CHUNK: usize = 1024 * 1024;

/// Per-frame overhead: 12-byte nonce + 16-byte GCM tag.
pub const FRAME_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Symmetric key length in bytes (Master Key and Data Key are both this size).
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA512 iteration count for the BIP39 seed derivation.
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Output length of the BIP39 seed produced by PBKDF2, in bytes.
pub const BIP39_SEED_LEN: usize = 64;

/// PBKDF2 salt for BIP39 seed derivation: the literal word "mnemonic".
pub const BIP39_SALT: &[u8] = b"mnemonic";

/// HKDF salt used to domain-separate the Master Key from the raw BIP39 seed.
pub const HKDF_SALT: &[u8] = b"cybs3-vault";

/// Current Config format version. Loading a higher version is a fatal
/// `UnsupportedVersion` error (forward-compat guard).
pub const CONFIG_VERSION: u32 = 2;

/// Name of the directory under `$HOME` holding all local state.
pub const APP_DIR_NAME: &str = ".cybs3";

/// Name of the encrypted configuration file inside [`APP_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.enc";

/// Legacy plaintext settings file, read only during migration.
pub const LEGACY_SETTINGS_FILE: &str = ".cybs3.json";

/// Legacy encrypted vaults file, read only during migration.
pub const LEGACY_VAULTS_FILE: &str = ".cybs3.vaults";

/// Environment variable carrying a whitespace-separated mnemonic.
pub const ENV_MNEMONIC: &str = "CYBS3_MNEMONIC";

/// Hard-coded fallback region when no other source supplies one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Hard-coded fallback endpoint host when no other source supplies one.
pub const DEFAULT_ENDPOINT: &str = "s3.amazonaws.com";

/// Request timeout for list/head/delete operations.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum upload timeout floor, regardless of payload size.
pub const UPLOAD_TIMEOUT_FLOOR_SECS: u64 = 300;

/// Upload timeout scaling factor: seconds of allowance per MiB of payload.
pub const UPLOAD_TIMEOUT_SECS_PER_MIB: u64 = 2;

/// Time-to-first-byte timeout for downloads.
pub const DOWNLOAD_TTFB_TIMEOUT_SECS: u64 = 30;
