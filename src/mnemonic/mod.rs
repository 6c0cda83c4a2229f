//! KDF / Mnemonic Gate (component C1 of the specification).
//!
//! A 12-word BIP39 English mnemonic is the single root of trust for local
//! state: [`derive_master_key`] turns it into the 32-byte Master Key that
//! wraps the encrypted configuration (§4.1). The BIP39 word list and
//! checksum algorithm come from the `bip39` crate; the two-step
//! PBKDF2-HMAC-SHA512 → HKDF-SHA256 derivation is implemented explicitly
//! here so it matches §4.1's contract byte-for-byte.

use hkdf::Hkdf;
use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use crate::config::{BIP39_SALT, BIP39_SEED_LEN, HKDF_SALT, KEY_LEN, PBKDF2_ROUNDS};
use crate::error::{CoreError, Result};
use crate::secret::MasterKey;

/// A validated 12-word BIP39 English mnemonic.
///
/// Carries entropy only; never persisted as plaintext (§3). Zeroized on
/// drop via the `bip39` crate's own `zeroize` feature.
pub struct Mnemonic(bip39::Mnemonic);

impl Mnemonic {
    /// The twelve words, in order.
    #[must_use]
    pub fn words(&self) -> Vec<&'static str> {
        self.0.word_iter().collect()
    }

    fn phrase(&self) -> String {
        self.words().join(" ")
    }
}

/// Validates a whitespace-separated 12-word mnemonic.
///
/// Fails with `InvalidWordCount` if the count is not 12, `InvalidWord` if
/// any word is outside the BIP39 English list, or `InvalidChecksum` if the
/// trailing checksum nibble does not match SHA-256 of the entropy.
pub fn validate_mnemonic(phrase: &str) -> Result<Mnemonic> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != 12 {
        return Err(CoreError::InvalidWordCount(words.len()));
    }

    match bip39::Mnemonic::parse_in(bip39::Language::English, phrase) {
        Ok(m) => Ok(Mnemonic(m)),
        Err(bip39::Error::BadWordCount(n)) => Err(CoreError::InvalidWordCount(n)),
        Err(bip39::Error::UnknownWord(index)) => Err(CoreError::InvalidWord {
            index,
            word: words.get(index).map(|w| (*w).to_string()).unwrap_or_default(),
        }),
        Err(bip39::Error::BadChecksum) => Err(CoreError::InvalidChecksum),
        Err(other) => Err(CoreError::InvalidMnemonic(other.to_string())),
    }
}

/// Generates a fresh 12-word mnemonic from a CSPRNG: 128 bits of entropy
/// plus the standard 4-bit BIP39 checksum.
pub fn generate_mnemonic() -> Result<Mnemonic> {
    bip39::Mnemonic::generate_in(bip39::Language::English, 12)
        .map(Mnemonic)
        .map_err(|e| CoreError::InvalidMnemonic(e.to_string()))
}

/// Derives the 32-byte Master Key from a mnemonic (§4.1).
///
/// Step 1 (BIP39 seed): PBKDF2-HMAC-SHA512 over `words joined by a single
/// space`, salt `b"mnemonic"`, 2048 rounds, 64-byte output — the standard
/// BIP39 seed with no passphrase.
///
/// Step 2 (domain separation): HKDF-SHA256 over that seed, salt
/// `b"cybs3-vault"`, empty info, 32-byte output. Keeping these as two
/// distinct steps (rather than collapsing to a single KDF call) preserves
/// compatibility with the BIP39 seed standard while leaving room for
/// sibling keys derived from the same seed in future versions.
#[must_use]
pub fn derive_master_key(mnemonic: &Mnemonic) -> MasterKey {
    let phrase = mnemonic.phrase();

    let mut seed = [0u8; BIP39_SEED_LEN];
    pbkdf2_hmac::<Sha512>(phrase.as_bytes(), BIP39_SALT, PBKDF2_ROUNDS, &mut seed);

    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), &seed);
    let mut key = [0u8; KEY_LEN];
    hk.expand(&[], &mut key).expect("32-byte output is within HKDF-SHA256's valid range");

    seed.zeroize();
    MasterKey::new(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_then_validate_round_trips() {
        let m = generate_mnemonic().unwrap();
        let phrase = m.phrase();
        validate_mnemonic(&phrase).unwrap();
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let err = validate_mnemonic("abandon abandon abandon").unwrap_err();
        assert!(matches!(err, CoreError::InvalidWordCount(3)));
    }

    #[test]
    fn unknown_word_is_rejected() {
        let m = generate_mnemonic().unwrap();
        let mut words = m.words();
        words[0] = "notarealbip39word";
        let phrase = words.join(" ");
        let err = validate_mnemonic(&phrase).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWord { index: 0, .. }));
    }

    #[test]
    fn single_word_swap_breaks_checksum_or_word_list() {
        let m = generate_mnemonic().unwrap();
        let mut words = m.words();
        // Swapping the last word (which carries checksum bits) with a
        // different valid word very likely breaks the checksum.
        words[11] = if words[11] == "zoo" { "abandon" } else { "zoo" };
        let phrase = words.join(" ");
        let err = validate_mnemonic(&phrase);
        assert!(matches!(err, Err(CoreError::InvalidChecksum) | Err(CoreError::InvalidWord { .. })));
    }

    #[test]
    fn derivation_is_deterministic() {
        let m = generate_mnemonic().unwrap();
        let k1 = derive_master_key(&m);
        let k2 = derive_master_key(&m);
        assert_eq!(k1.expose(), k2.expose());
    }

    #[test]
    fn different_mnemonics_derive_different_keys() {
        let m1 = generate_mnemonic().unwrap();
        let m2 = generate_mnemonic().unwrap();
        let k1 = derive_master_key(&m1);
        let k2 = derive_master_key(&m2);
        assert_ne!(k1.expose(), k2.expose());
    }
}
