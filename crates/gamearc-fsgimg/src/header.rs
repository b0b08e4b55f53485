//! FSG-FILE-SYSTEM image header.

use gamearc_common::BinaryReader;
use tracing::warn;

use crate::{Error, Result};

/// Image magic, including its null terminator.
pub const FSG_MAGIC: &[u8; 16] = b"FSG-FILE-SYSTEM\0";

/// Size of the fixed header: magic plus ten big-endian u32 fields.
pub const HEADER_SIZE: usize = FSG_MAGIC.len() + 10 * 4;

/// Sectors are 128 KiB.
const SECTOR_SHIFT: u32 = 17;

/// Fixed-layout image preamble. All fields are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsgHeader {
    /// Always 2 in known images.
    pub version: u32,
    pub header_length: u32,
    pub num_sectors: u32,
    /// Points at the list of used sectors. Not needed for file resolution.
    pub sector_map_offset: u32,
    /// Start of the data region; data offsets are stored relative to it.
    pub base_offset: u32,
    pub read_buffer_size: u32,
    /// Always 8 in known images.
    pub unknown: u32,
    pub num_files: u32,
    pub zero: u32,
    pub checksum: u32,
}

impl FsgHeader {
    /// Parse the header from the start of the image.
    pub fn parse(reader: &mut BinaryReader<'_>) -> Result<Self> {
        reader
            .expect_magic(FSG_MAGIC)
            .map_err(|_| Error::InvalidMagic)?;

        let header = Self {
            version: reader.read_u32_be()?,
            header_length: reader.read_u32_be()?,
            num_sectors: reader.read_u32_be()?,
            sector_map_offset: reader.read_u32_be()?,
            base_offset: reader.read_u32_be()?,
            read_buffer_size: reader.read_u32_be()?,
            unknown: reader.read_u32_be()?,
            num_files: reader.read_u32_be()?,
            zero: reader.read_u32_be()?,
            checksum: reader.read_u32_be()?,
        };

        if header.version != 2 || header.unknown != 8 || header.zero != 0 {
            warn!(
                version = header.version,
                unknown = header.unknown,
                zero = header.zero,
                "unexpected constant fields in FSG-FILE-SYSTEM header"
            );
        }

        Ok(header)
    }

    /// Number of entries in the per-sector type table.
    ///
    /// Covers every sector up to the end of the data region, counted in
    /// 128 KiB units from the start of the image.
    pub fn sector_table_len(&self) -> usize {
        self.num_sectors as usize + (self.base_offset >> SECTOR_SHIFT) as usize
    }

    /// [`Self::sector_table_len`] limited to what an image of `image_len`
    /// bytes can hold. The header value is not trusted for allocation.
    pub fn bounded_sector_table_len(&self, image_len: usize) -> usize {
        let max_sectors = image_len.div_ceil(1 << SECTOR_SHIFT);
        let len = (self.num_sectors as usize).min(max_sectors)
            + (self.base_offset >> SECTOR_SHIFT) as usize;
        if len < self.sector_table_len() {
            warn!(
                num_sectors = self.num_sectors,
                max_sectors, "sector count exceeds image size, clamping sector table"
            );
        }
        len
    }
}

/// Check whether a buffer starts with the image magic.
pub fn has_magic(data: &[u8]) -> bool {
    data.starts_with(FSG_MAGIC)
}
