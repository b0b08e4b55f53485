//! Synthetic header and package builders for tests.

use zerocopy::IntoBytes;

use crate::records::{DirEntry, FileEntry, OffsetEntry, Seven45Header};
use crate::SEVEN45_MAGIC;

pub fn file_entry(dir_num: u16, string_num: u32, offset_num: u32, size: u64) -> FileEntry {
    FileEntry {
        reserved: [0; 6],
        dir_num,
        string_num,
        offset_num,
        size,
        reserved_2: [0; 16],
        timestamp: 0,
    }
}

pub fn dir_entry(parent: i32, string_num: u32) -> DirEntry {
    DirEntry {
        path_hash: 0,
        parent,
        string_num,
    }
}

pub fn offset_entry(pk_offset: u32, pk_num: u16) -> OffsetEntry {
    OffsetEntry {
        pk_offset,
        pk_num,
        reserved: 0,
    }
}

/// Builds a plaintext header.
#[derive(Default)]
pub struct HeaderBuilder {
    files: Vec<FileEntry>,
    dirs: Vec<DirEntry>,
    strings: Vec<Vec<u8>>,
    offsets: Vec<OffsetEntry>,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, entry: FileEntry) -> Self {
        self.files.push(entry);
        self
    }

    pub fn dir(mut self, entry: DirEntry) -> Self {
        self.dirs.push(entry);
        self
    }

    pub fn strings(mut self, strings: &[&str]) -> Self {
        self.strings.extend(strings.iter().map(|s| s.as_bytes().to_vec()));
        self
    }

    pub fn raw_string(mut self, string: &[u8]) -> Self {
        self.strings.push(string.to_vec());
        self
    }

    pub fn offset(mut self, entry: OffsetEntry) -> Self {
        self.offsets.push(entry);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut table = Vec::new();
        for string in &self.strings {
            table.extend_from_slice(string);
            table.push(0);
        }

        let header_len = std::mem::size_of::<Seven45Header>();
        let string_table_offset = header_len
            + self.files.len() * std::mem::size_of::<FileEntry>()
            + self.dirs.len() * std::mem::size_of::<DirEntry>();

        let header = Seven45Header {
            magic: SEVEN45_MAGIC,
            version: 1,
            block_size: 0x8000,
            num_files: self.files.len() as u32,
            num_unk: 0,
            num_dirs: self.dirs.len() as u32,
            reserved: [0; 8],
            string_table_offset: string_table_offset as u32,
            string_table_size: table.len() as u32,
            num_offsets: self.offsets.len() as u32,
        };

        let mut data = header.as_bytes().to_vec();
        for entry in &self.files {
            data.extend_from_slice(entry.as_bytes());
        }
        for entry in &self.dirs {
            data.extend_from_slice(entry.as_bytes());
        }
        data.extend_from_slice(&table);
        for entry in &self.offsets {
            data.extend_from_slice(entry.as_bytes());
        }
        data
    }
}
