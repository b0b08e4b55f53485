//! Seven45 package reader.
//!
//! A package is an AES-encrypted header file (`*.hdr.e.2`) plus numbered
//! content volumes (`*.pk0`, `*.pk1`, ...) next to it. The header is
//! decrypted under the first matching [`KeyConfig`] and describes the
//! directory tree; every file points at a byte range in one volume.
//!
//! # Example
//!
//! ```no_run
//! use gamearc_seven45::Seven45Package;
//!
//! let package = Seven45Package::open("songs.hdr.e.2")?;
//! for file in package.root().files() {
//!     println!("{} ({} bytes)", file.path(), file.len());
//! }
//! # Ok::<(), gamearc_seven45::Error>(())
//! ```

mod crypto;
mod error;
mod keys;
mod package;
mod probe;
mod records;
mod tables;

#[cfg(test)]
mod fixture;

pub use crypto::{decrypt_header, decrypt_in_place, decrypt_magic, encrypt_header, BLOCK_SIZE};
pub use error::{Error, Result};
pub use keys::{
    KeyConfig, KeyProber, BUILTIN_CONFIGS, DEFAULT_CONFIG, HEADER_CONFIG, SEVEN45_MAGIC,
    UPDATE_CONFIG,
};
pub use package::{volume_path, Seven45Package, FORMAT_NAME};
pub use probe::{has_header_suffix, probe_bytes, probe_file, probe_file_with, HEADER_SUFFIX};
pub use records::{DirEntry, FileEntry, OffsetEntry, Seven45Header};
pub use tables::{HeaderTables, PLACEHOLDER_NAME};
