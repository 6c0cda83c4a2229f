//! AEAD Primitive (component C2 of the specification).
//!
//! A thin single-shot wrapper around AES-256-GCM. No associated data is
//! used; every [`seal`] call draws a fresh random 12-byte nonce and returns
//! the combined `nonce ∥ ciphertext ∥ tag` blob described in §4.2.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::config::{NONCE_LEN, TAG_LEN};
use crate::error::{CoreError, Result};

/// Seals `plaintext` under `key`, returning `nonce(12) ∥ ciphertext ∥ tag(16)`.
///
/// Every call uses a fresh, uniformly random nonce; no per-key counter is
/// maintained (§4.2's invariant). This bounds the safe lifetime of a single
/// key to roughly 2^32 calls before nonce collision becomes non-negligible
/// — acceptable here because the Data Key is per-install and the Master Key
/// is per-rotation (see the open question on nonce exhaustion in §9).
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // A fresh random nonce under a 32-byte key cannot fail to encrypt.
    let ciphertext = cipher.encrypt(nonce, plaintext).expect("AES-256-GCM encryption is infallible for valid inputs");

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    blob
}

/// Opens a blob produced by [`seal`]. Fails with `AuthFailure` if the blob
/// is shorter than the minimum frame size or the GCM tag does not verify.
pub fn open(key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(CoreError::AuthFailure);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(key.into());
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher.decrypt(nonce, ciphertext).map_err(|_| CoreError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trips() {
        let key = [7u8; 32];
        let plaintext = b"the quick brown fox";
        let blob = seal(&key, plaintext);
        assert_eq!(open(&key, &blob).unwrap(), plaintext);
    }

    #[test]
    fn two_seals_use_different_nonces() {
        let key = [1u8; 32];
        let a = seal(&key, b"same plaintext");
        let b = seal(&key, b"same plaintext");
        assert_ne!(a[..12], b[..12]);
    }

    #[test]
    fn wrong_key_fails_auth() {
        let blob = seal(&[1u8; 32], b"secret");
        assert!(matches!(open(&[2u8; 32], &blob), Err(CoreError::AuthFailure)));
    }

    #[test]
    fn too_short_blob_fails_auth() {
        assert!(matches!(open(&[0u8; 32], &[0u8; 10]), Err(CoreError::AuthFailure)));
    }

    #[test]
    fn flipped_tag_fails_auth() {
        let key = [3u8; 32];
        let mut blob = seal(&key, b"integrity matters");
        let last = blob.len() - 1;
        blob[last] ^= 0xFF;
        assert!(matches!(open(&key, &blob), Err(CoreError::AuthFailure)));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = [9u8; 32];
        let blob = seal(&key, b"");
        assert_eq!(open(&key, &blob).unwrap(), b"");
    }
}
