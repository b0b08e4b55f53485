//! Header key configurations and the prober that picks one.
//!
//! Seven45 headers are encrypted under one of a small set of fixed key/IV
//! combinations. Nothing in the file says which, so each configuration is
//! tried in declaration order until the first four decrypted bytes equal
//! [`SEVEN45_MAGIC`].
//!
//! Only the PS3 header IV and the PS3 update IV are the values shipped
//! packages use. The shared AES key, the default header IV and the default
//! IV are placeholders: with the built-in configurations, packages from the
//! games will not decrypt. Supply the real tables through [`KeyProber::new`].

use tracing::{debug, trace};

use crate::crypto;
use crate::{Error, Result};

/// Magic value at the start of every decrypted header (little-endian u32).
pub const SEVEN45_MAGIC: u32 = 0x745;

/// One key/IV combination for the header cipher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    /// Short label used in logs.
    pub name: &'static str,
    /// AES-128 key.
    pub key: [u8; 16],
    /// Mask applied to the first decrypted block.
    pub header_iv: [u8; 16],
    /// CBC chaining IV.
    pub iv: [u8; 16],
}

/// Placeholder for the shared AES key. Not the key used by shipped packages.
const KEY: [u8; 16] = [
    0x3B, 0x97, 0x0E, 0xC2, 0x5A, 0x61, 0xF4, 0x08, 0x9D, 0x2C, 0x77, 0xB1, 0x46, 0xE3, 0x1F, 0xA8,
];

/// Placeholder for the default header mask. Not the shipped value.
const DEFAULT_HEADER_IV: [u8; 16] = [
    0xC4, 0x1D, 0x6E, 0x93, 0x27, 0xB8, 0x50, 0x0F, 0xE9, 0x72, 0x3A, 0xD5, 0x8C, 0x14, 0x61, 0xBE,
];

/// Placeholder for the default chaining IV. Not the shipped value.
const DEFAULT_IV: [u8; 16] = [
    0x6F, 0xA2, 0x19, 0x5C, 0xD0, 0x87, 0x3E, 0xF1, 0x24, 0x9B, 0x4D, 0x70, 0xE6, 0x0A, 0xB5, 0x38,
];

/// Header mask used by PS3 packages.
const HEADER_IV_PS3: [u8; 16] = [
    0x0A, 0x58, 0xB8, 0xDE, 0x0A, 0x71, 0x03, 0x44, 0x5C, 0x73, 0x71, 0x7F, 0xDA, 0xCE, 0x2B, 0x64,
];

/// Chaining IV used by PS3 update packages.
const IV_PS3_UPDATE: [u8; 16] = [
    0x58, 0x6B, 0x74, 0xAE, 0x0D, 0x58, 0x1E, 0x3C, 0x8B, 0xC1, 0xA7, 0x15, 0xBF, 0xE0, 0x25, 0x33,
];

/// Default configuration. Built entirely from placeholder values.
pub const DEFAULT_CONFIG: KeyConfig = KeyConfig {
    name: "default",
    key: KEY,
    header_iv: DEFAULT_HEADER_IV,
    iv: DEFAULT_IV,
};

/// Configuration with the PS3 header mask, over the placeholder key and IV.
pub const HEADER_CONFIG: KeyConfig = KeyConfig {
    name: "header",
    key: KEY,
    header_iv: HEADER_IV_PS3,
    iv: DEFAULT_IV,
};

/// Configuration with the PS3 update IV, over the placeholder key and header mask.
pub const UPDATE_CONFIG: KeyConfig = KeyConfig {
    name: "update",
    key: KEY,
    header_iv: DEFAULT_HEADER_IV,
    iv: IV_PS3_UPDATE,
};

/// The built-in configurations in probe order.
///
/// Every entry uses the placeholder AES key, so none of them opens a shipped
/// package. Build a [`KeyProber`] with the real key tables for that.
pub const BUILTIN_CONFIGS: [KeyConfig; 3] = [DEFAULT_CONFIG, HEADER_CONFIG, UPDATE_CONFIG];

/// Tries key configurations in order against a raw header.
#[derive(Debug, Clone)]
pub struct KeyProber {
    configs: Vec<KeyConfig>,
}

impl KeyProber {
    /// Prober over a custom ordered list of configurations.
    pub fn new(configs: Vec<KeyConfig>) -> Self {
        Self { configs }
    }

    pub fn configs(&self) -> &[KeyConfig] {
        &self.configs
    }

    /// Return the first configuration whose decryption yields the magic.
    ///
    /// Only the first cipher block is decrypted.
    pub fn probe(&self, raw: &[u8]) -> Option<&KeyConfig> {
        self.configs.iter().find(|config| {
            let magic = crypto::decrypt_magic(config, raw);
            trace!(config = config.name, ?magic, "probing header key");
            magic == Some(SEVEN45_MAGIC)
        })
    }

    /// Pick a configuration and decrypt the whole header with it.
    pub fn decrypt(&self, raw: &[u8]) -> Result<(&KeyConfig, Vec<u8>)> {
        let config = self.probe(raw).ok_or(Error::NoMatchingKey)?;
        debug!(config = config.name, len = raw.len(), "selected header key");
        let header = crypto::decrypt_header(config, raw);
        Ok((config, header))
    }
}

impl Default for KeyProber {
    fn default() -> Self {
        Self::new(BUILTIN_CONFIGS.to_vec())
    }
}
