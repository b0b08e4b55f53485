//! Fixed-layout records of a decrypted Seven45 header.
//!
//! All integers are little-endian. Records are read with zerocopy and are
//! packed, so copy fields into locals before borrowing them.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Header preamble.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Seven45Header {
    /// Always [`crate::SEVEN45_MAGIC`] once decrypted
    pub magic: u32,
    pub version: u32,
    pub block_size: u32,
    pub num_files: u32,
    /// Purpose unknown
    pub num_unk: u32,
    pub num_dirs: u32,
    pub reserved: [u8; 8],
    /// Absolute offset of the string table
    pub string_table_offset: u32,
    /// Size of the string table in bytes
    pub string_table_size: u32,
    pub num_offsets: u32,
}

/// File entry (48 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FileEntry {
    pub reserved: [u8; 6],
    /// Index into the directory table
    pub dir_num: u16,
    /// Index into the string table
    pub string_num: u32,
    /// Index into the offset table
    pub offset_num: u32,
    /// File size in bytes
    pub size: u64,
    pub reserved_2: [u8; 16],
    pub timestamp: i64,
}

/// Directory entry (12 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DirEntry {
    /// Hash of the directory path. Not used for lookup.
    pub path_hash: u32,
    /// Index of the parent directory; must precede this entry
    pub parent: i32,
    /// Index into the string table
    pub string_num: u32,
}

/// Offset table entry (8 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct OffsetEntry {
    /// Byte offset within the content volume
    pub pk_offset: u32,
    /// Content volume index (`.pk<N>`)
    pub pk_num: u16,
    pub reserved: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<Seven45Header>(), 48);
        assert_eq!(std::mem::size_of::<FileEntry>(), 48);
        assert_eq!(std::mem::size_of::<DirEntry>(), 12);
        assert_eq!(std::mem::size_of::<OffsetEntry>(), 8);
    }
}
