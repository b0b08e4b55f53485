//! Common utilities for gamearc.
//!
//! This crate provides the foundations shared by the archive format crates:
//!
//! - [`BinaryReader`] - Zero-copy, offset-addressed reading from byte slices
//! - [`hash`] - The path hash used by FSG-FILE-SYSTEM descriptor tables
//! - [`vfs`] - Arena-backed directory tree with borrowed node views
//! - [`Volume`] - Memory-mapped or owned backing streams
//! - [`Archive`] - The read-only handle owning a tree and its streams

mod archive;
mod error;
mod reader;
mod volume;

pub mod hash;
pub mod vfs;

pub use archive::Archive;
pub use error::{Error, Result};
pub use hash::{path_hash, path_hash_bytes, PathHash};
pub use reader::BinaryReader;
pub use vfs::{
    decode_name, DataLocator, DirId, Directory, File, FileId, FileReader, Node, StreamRef, Tree,
    TreeBuilder, Walk,
};
pub use volume::Volume;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
