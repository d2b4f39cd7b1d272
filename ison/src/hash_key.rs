// SPDX-License-Identifier: Apache-2.0

//! Secret key material for bucket hashing.
//!
//! Every [`Dict`](crate::Dict) hashes its keys with SipHash keyed by a
//! [`HashKey`]. Unless a map is given its own key, it uses the process-wide
//! key installed by [`init`] or [`init_with_key`]. If neither was called,
//! the first map created draws a random key.
//!
//! Calling `init` from several threads while other threads are already
//! creating maps is unsupported: the process key is whichever lands first.

use std::sync::OnceLock;

use log::{debug, warn};

static PROCESS_KEY: OnceLock<HashKey> = OnceLock::new();

/// 128 bits of SipHash key material.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HashKey([u8; 16]);

impl HashKey {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Draws a fresh key from the operating system's random source.
    pub fn random() -> Result<Self, getrandom::Error> {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The process-wide key, initializing it on first use.
    pub(crate) fn process() -> HashKey {
        *PROCESS_KEY.get_or_init(|| {
            debug!("Hash key used before init(), drawing one now");
            key_or_fallback(HashKey::random())
        })
    }
}

// Key bytes stay out of logs and panic messages.
impl core::fmt::Debug for HashKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashKey(..)")
    }
}

/// Outcome of a one-time initialization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// A key was already installed; it stays in effect.
    AlreadyInitialized,
    /// The operating system could not provide random bytes.
    Entropy,
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::AlreadyInitialized => f.write_str("Hash key already initialized"),
            InitError::Entropy => f.write_str("No randomness available for hash key"),
        }
    }
}

impl std::error::Error for InitError {}

/// Installs a random process-wide hash key. Call once at startup, before
/// any map is created.
pub fn init() -> Result<(), InitError> {
    let key = HashKey::random().map_err(|e| {
        debug!("getrandom failed: {e}");
        InitError::Entropy
    })?;
    init_with_key(key)
}

/// Installs a fixed process-wide hash key, for reproducible bucket layouts.
pub fn init_with_key(key: HashKey) -> Result<(), InitError> {
    PROCESS_KEY
        .set(key)
        .map_err(|_| InitError::AlreadyInitialized)
}

fn key_or_fallback(random: Result<HashKey, getrandom::Error>) -> HashKey {
    match random {
        Ok(key) => key,
        Err(e) => {
            // Without entropy the layout is predictable, but maps still work.
            warn!("getrandom failed: {e}, using a predictable address-derived hash key");
            let seed = &PROCESS_KEY as *const _ as usize as u64;
            let mut bytes = [0u8; 16];
            bytes[..8].copy_from_slice(&seed.to_le_bytes());
            bytes[8..].copy_from_slice(&seed.rotate_left(29).to_le_bytes());
            HashKey(bytes)
        }
    }
}
