//! Storage key derivation.
//!
//! A [`StoreKey`] is a pure function of a message's Message-ID: 32 bytes
//! squeezed from the BLAKE3 extendable output over the identifier bytes. Its
//! text form (unpadded RFC 4648 base32, 52 characters) names the record file,
//! so the existence of that file is what marks a message as archived.

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use thiserror::Error;

/// Length of a key in bytes.
pub const KEY_LEN: usize = 32;

/// Deterministic, fixed-size pseudonym of a Message-ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey([u8; KEY_LEN]);

impl StoreKey {
    /// Wraps raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE32_NOPAD.encode(&self.0))
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({self})")
    }
}

/// Error parsing a key from its base32 text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    /// Not valid unpadded base32.
    #[error("invalid base32: {0}")]
    Encoding(#[from] data_encoding::DecodeError),
    /// Decoded to the wrong number of bytes.
    #[error("expected {KEY_LEN} bytes, got {0}")]
    Length(usize),
}

impl FromStr for StoreKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = BASE32_NOPAD.decode(s.as_bytes())?;
        let len = bytes.len();
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| KeyParseError::Length(len))?;
        Ok(Self(bytes))
    }
}

/// Derives [`StoreKey`]s from Message-IDs.
///
/// The default deriver is unkeyed. A deriver built with [`KeyDeriver::keyed`]
/// uses BLAKE3's keyed mode, so its keys are unrelated to unkeyed ones; a
/// store must always be written with the same secret.
#[derive(Clone, Default)]
pub struct KeyDeriver {
    secret: Option<[u8; KEY_LEN]>,
}

impl KeyDeriver {
    /// Creates an unkeyed deriver.
    #[must_use]
    pub const fn new() -> Self {
        Self { secret: None }
    }

    /// Creates a deriver keyed with a 32-byte secret.
    #[must_use]
    pub const fn keyed(secret: [u8; KEY_LEN]) -> Self {
        Self {
            secret: Some(secret),
        }
    }

    /// Returns true if a secret is configured.
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        self.secret.is_some()
    }

    /// Derives the key for `message_id`.
    #[must_use]
    pub fn derive(&self, message_id: &str) -> StoreKey {
        let mut hasher = match &self.secret {
            Some(secret) => blake3::Hasher::new_keyed(secret),
            None => blake3::Hasher::new(),
        };
        hasher.update(message_id.as_bytes());

        let mut out = [0u8; KEY_LEN];
        hasher.finalize_xof().fill(&mut out);
        StoreKey(out)
    }
}

impl fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDeriver")
            .field("keyed", &self.is_keyed())
            .finish()
    }
}
