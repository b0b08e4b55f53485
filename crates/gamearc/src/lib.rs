//! gamearc - read-only virtual file system over game archive containers.
//!
//! This crate ties the format readers together behind one entry point that
//! detects the container type and returns a common [`Archive`] handle.
//!
//! # Crates
//!
//! - [`gamearc_common`] - Binary reading, path hashing, the directory tree and [`Archive`]
//! - [`gamearc_fsgimg`] - FSG-FILE-SYSTEM (`FSGIMG`) single-file images
//! - [`gamearc_seven45`] - Seven45 encrypted-header packages with `.pk<N>` volumes
//!
//! # Example
//!
//! ```no_run
//! use gamearc::prelude::*;
//!
//! let archive = open_archive("songs.hdr.e.2")?;
//! for node in archive.walk() {
//!     if let Some(file) = node.as_file() {
//!         println!("{} ({} bytes)", file.path(), file.len());
//!     }
//! }
//! # Ok::<(), gamearc::Error>(())
//! ```

mod error;
mod registry;

pub use gamearc_common as common;
pub use gamearc_fsgimg as fsgimg;
pub use gamearc_seven45 as seven45;

pub use error::{Error, Result};
pub use gamearc_common::Archive;
pub use registry::{open_archive, probe_format, Format};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{open_archive, probe_format, Format};
    pub use gamearc_common::{
        path_hash, Archive, DataLocator, Directory, File, Node, PathHash, StreamRef, Volume,
    };
    pub use gamearc_fsgimg::FsgImage;
    pub use gamearc_seven45::{KeyConfig, KeyProber, Seven45Package};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
