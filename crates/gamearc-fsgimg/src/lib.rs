//! FSG-FILE-SYSTEM image reader.
//!
//! An image is a single big-endian file holding:
//!
//! - A fixed header starting with the null-terminated magic `FSG-FILE-SYSTEM`
//! - A descriptor table of `(path hash, type, detail offset)` records
//! - Detail records holding each entry's data offset (in 1 KiB units from
//!   the header's base offset) and size
//! - Directory listings and file data in the data region
//!
//! The root listing sits at the base offset. Listing entries are matched to
//! descriptors by hashing their full path with [`gamearc_common::path_hash`].
//!
//! # Example
//!
//! ```no_run
//! use gamearc_fsgimg::FsgImage;
//!
//! let image = FsgImage::open("GAME.IMG")?;
//! for file in image.root().files() {
//!     println!("{}: {} bytes", file.name(), file.len());
//! }
//! # Ok::<(), gamearc_fsgimg::Error>(())
//! ```

mod descriptor;
mod error;
mod header;
mod image;
mod listing;

#[cfg(test)]
mod fixture;

pub use descriptor::{resolve_data_offset, Descriptor, DescriptorTable, DATA_OFFSET_SHIFT};
pub use error::{Error, Result};
pub use header::{FsgHeader, FSG_MAGIC, HEADER_SIZE};
pub use image::{FsgImage, FORMAT_NAME};
pub use listing::{build_tree, MAX_DEPTH};

/// Check whether a buffer looks like an FSG-FILE-SYSTEM image.
pub fn probe(data: &[u8]) -> bool {
    header::has_magic(data)
}
