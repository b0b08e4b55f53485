//! Header table parsing and tree assembly.

use gamearc_common::{
    decode_name, BinaryReader, DataLocator, DirId, StreamRef, Tree, TreeBuilder,
};
use tracing::{debug, warn};
use zerocopy::FromBytes;

use crate::records::{DirEntry, FileEntry, OffsetEntry, Seven45Header};
use crate::{Error, Result, SEVEN45_MAGIC};

/// Name given to files whose string index is out of range.
pub const PLACEHOLDER_NAME: &str = "ERROR_FILENAME";

/// Every table of a decrypted header, in file order.
#[derive(Debug, Clone)]
pub struct HeaderTables {
    pub header: Seven45Header,
    pub files: Vec<FileEntry>,
    pub dirs: Vec<DirEntry>,
    /// The string table, decoded for display. Its length need not match
    /// the file count.
    pub strings: Vec<String>,
    pub offsets: Vec<OffsetEntry>,
}

impl HeaderTables {
    /// Parse a decrypted header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let header: Seven45Header = reader.read_struct()?;
        let magic = header.magic;
        if magic != SEVEN45_MAGIC {
            return Err(Error::InvalidMagic {
                expected: SEVEN45_MAGIC,
                actual: magic,
            });
        }

        let files = read_records::<FileEntry>(&mut reader, header.num_files)?;
        let dirs = read_records::<DirEntry>(&mut reader, header.num_dirs)?;

        let table_start = u64::from(header.string_table_offset);
        let table_end = table_start + u64::from(header.string_table_size);
        if reader.position() as u64 != table_start {
            debug!(
                position = reader.position(),
                table_start, "string table does not directly follow the directory entries"
            );
        }
        reader.seek_to(table_start)?;

        let mut strings = Vec::new();
        while (reader.position() as u64) < table_end {
            strings.push(decode_name(reader.read_cstring()?).into_owned());
        }

        let offsets = read_records::<OffsetEntry>(&mut reader, header.num_offsets)?;

        let version = header.version;
        debug!(
            version,
            files = files.len(),
            dirs = dirs.len(),
            strings = strings.len(),
            offsets = offsets.len(),
            "parsed Seven45 header tables"
        );

        Ok(Self {
            header,
            files,
            dirs,
            strings,
            offsets,
        })
    }

    /// Number of content volumes: one past the highest referenced volume index.
    pub fn volume_count(&self) -> usize {
        self.offsets
            .iter()
            .map(|entry| usize::from(entry.pk_num) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Assemble the directory tree.
    ///
    /// Directory 0 is the root. Every other directory must name an earlier
    /// one as its parent, so a single ascending pass suffices.
    pub fn build_tree(&self) -> Result<Tree> {
        let mut builder = TreeBuilder::new();
        let mut dir_ids = Vec::with_capacity(self.dirs.len().max(1));
        dir_ids.push(DirId::ROOT);

        for (index, entry) in self.dirs.iter().enumerate().skip(1) {
            let parent = entry.parent;
            let parent_id = usize::try_from(parent)
                .ok()
                .filter(|&p| p < index)
                .map(|p| dir_ids[p])
                .ok_or(Error::InvalidParent { index, parent })?;

            let string_num = entry.string_num;
            let name = self
                .strings
                .get(string_num as usize)
                .ok_or(Error::DirectoryNameOutOfRange {
                    index,
                    string_num,
                    strings: self.strings.len(),
                })?;
            dir_ids.push(builder.add_dir(parent_id, name.as_str()));
        }

        for (index, entry) in self.files.iter().enumerate() {
            let (string_num, dir_num, offset_num, size) =
                (entry.string_num, entry.dir_num, entry.offset_num, entry.size);

            let name = match self.strings.get(string_num as usize) {
                Some(name) => name.as_str(),
                None => {
                    warn!(index, string_num, "file name index out of range, using placeholder");
                    PLACEHOLDER_NAME
                }
            };

            let dir = *dir_ids
                .get(usize::from(dir_num))
                .ok_or(Error::DirectoryIndexOutOfRange {
                    index,
                    dir_num,
                    dirs: dir_ids.len(),
                })?;

            let offset = self
                .offsets
                .get(offset_num as usize)
                .ok_or(Error::OffsetIndexOutOfRange {
                    index,
                    offset_num,
                    offsets: self.offsets.len(),
                })?;

            let locator = DataLocator::new(
                StreamRef::Volume(offset.pk_num),
                u64::from(offset.pk_offset),
                size,
            );
            builder.add_file(dir, name, locator);
        }

        Ok(builder.finish())
    }
}

fn read_records<T: FromBytes>(reader: &mut BinaryReader<'_>, count: u32) -> Result<Vec<T>> {
    let count = count as usize;
    let capacity = count.min(reader.remaining() / std::mem::size_of::<T>());
    let mut records = Vec::with_capacity(capacity);
    for _ in 0..count {
        records.push(reader.read_struct()?);
    }
    Ok(records)
}
