//! Secret-handling newtypes.
//!
//! [`Secret<T>`] is a general heap-allocated secret wrapper (used for the
//! mnemonic phrase and passwords). [`MasterKey`] and [`DataKey`] are the
//! two fixed-size 32-byte keys from §3 of the specification: distinct types
//! so the two can never be swapped by accident at a call site, zeroized on
//! drop, and never printed.

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretBox};
use zeroize::ZeroizeOnDrop;

use crate::config::KEY_LEN;

pub struct Secret<T: Zeroize> {
    inner: SecretBox<T>,
}

impl<T: Zeroize> Secret<T> {
    pub fn new(data: T) -> Self {
        Self { inner: SecretBox::new(Box::new(data)) }
    }

    pub fn expose_secret(&self) -> &T {
        self.inner.expose_secret()
    }
}

impl<T: Zeroize> From<SecretBox<T>> for Secret<T> {
    fn from(secret: SecretBox<T>) -> Self {
        Self { inner: secret }
    }
}

pub type SecretBytes = Secret<Vec<u8>>;
pub type SecretString = Secret<String>;

impl SecretBytes {
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl SecretString {
    pub fn from_str(s: &str) -> Self {
        Self::new(s.to_owned())
    }
}

/// The Master Key (§3): wraps/unwraps the Config, lives for one invocation.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

/// The Data Key (§3): encrypts every object body, persists inside Config.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_LEN]);

macro_rules! symmetric_key {
    ($ty:ident, $label:literal) => {
        impl $ty {
            #[must_use]
            pub fn new(bytes: [u8; KEY_LEN]) -> Self {
                Self(bytes)
            }

            /// Exposes the raw key bytes. Every call site is grep-able by
            /// design — prefer passing the newtype through APIs instead.
            #[must_use]
            pub fn expose(&self) -> &[u8; KEY_LEN] {
                &self.0
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!($label, "(redacted)"))
            }
        }
    };
}

symmetric_key!(MasterKey, "MasterKey");
symmetric_key!(DataKey, "DataKey");
