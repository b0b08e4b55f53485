//! Hash-indexed file descriptor table.

use gamearc_common::{BinaryReader, PathHash};
use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::{FsgHeader, Result};

/// Data offsets are stored in 1 KiB units relative to the header's base offset.
pub const DATA_OFFSET_SHIFT: u32 = 10;

/// Size of one `(hash, type, detail offset)` record.
const RECORD_SIZE: usize = 8;

/// One descriptor record, with its detail record resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub hash: PathHash,
    /// Type tag byte. Carried through but not interpreted.
    pub kind: u8,
    /// 24-bit offset of the detail record within the image.
    pub detail_offset: u32,
    /// Absolute offset of the file data or directory listing.
    pub data_offset: u64,
    /// Size in bytes.
    pub size: u32,
}

/// Compute an absolute data offset from a stored detail value.
#[inline]
pub fn resolve_data_offset(raw: u32, base_offset: u32) -> u64 {
    (u64::from(raw) << DATA_OFFSET_SHIFT) + u64::from(base_offset)
}

/// Mapping from path hash to descriptor.
///
/// If two records carry the same hash, the later one wins.
#[derive(Debug, Default)]
pub struct DescriptorTable {
    entries: HashMap<PathHash, Descriptor>,
}

impl DescriptorTable {
    /// Read `header.num_files` records starting at the reader's position,
    /// then resolve every record's detail entry against `image`.
    pub fn parse(image: &[u8], reader: &mut BinaryReader<'_>, header: &FsgHeader) -> Result<Self> {
        let count = header.num_files as usize;
        let mut entries = HashMap::with_capacity(count.min(reader.remaining() / RECORD_SIZE));

        for _ in 0..count {
            let hash = PathHash(reader.read_u32_be()?);
            let kind = reader.read_u8()?;
            let detail_offset = reader.read_u24_be()?;

            let descriptor = Descriptor {
                hash,
                kind,
                detail_offset,
                data_offset: 0,
                size: 0,
            };
            if entries.insert(hash, descriptor).is_some() {
                debug!(%hash, "duplicate path hash, later descriptor replaces earlier one");
            }
        }

        for descriptor in entries.values_mut() {
            let mut detail = BinaryReader::new_at(image, u64::from(descriptor.detail_offset))?;
            let raw = detail.read_u32_be()?;
            descriptor.data_offset = resolve_data_offset(raw, header.base_offset);
            descriptor.size = detail.read_u32_be()?;
            trace!(
                hash = %descriptor.hash,
                data_offset = descriptor.data_offset,
                size = descriptor.size,
                "resolved descriptor"
            );
        }

        Ok(Self { entries })
    }

    #[inline]
    pub fn get(&self, hash: PathHash) -> Option<&Descriptor> {
        self.entries.get(&hash)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, WriteBytesExt};

    use super::*;

    fn header(num_files: u32, base_offset: u32) -> FsgHeader {
        FsgHeader {
            version: 2,
            header_length: 0,
            num_sectors: 0,
            sector_map_offset: 0,
            base_offset,
            read_buffer_size: 0,
            unknown: 8,
            num_files,
            zero: 0,
            checksum: 0,
        }
    }

    fn record(data: &mut Vec<u8>, hash: u32, kind: u8, detail: u32) {
        data.write_u32::<BigEndian>(hash).unwrap();
        data.write_u8(kind).unwrap();
        data.write_u24::<BigEndian>(detail).unwrap();
    }

    #[test]
    fn test_resolve_data_offset() {
        assert_eq!(resolve_data_offset(4, 0x1000), 0x2000);
        assert_eq!(resolve_data_offset(0, 0x1000), 0x1000);
        // No 32-bit overflow for large stored values.
        assert_eq!(resolve_data_offset(u32::MAX, 0), u64::from(u32::MAX) << 10);
    }

    #[test]
    fn test_parse_resolves_details() {
        let mut image = Vec::new();
        record(&mut image, 0xAAAA_0001, 1, 0x10);
        image.resize(0x10, 0);
        image.write_u32::<BigEndian>(4).unwrap();
        image.write_u32::<BigEndian>(123).unwrap();

        let mut reader = BinaryReader::new(&image);
        let table = DescriptorTable::parse(&image, &mut reader, &header(1, 0x1000)).unwrap();

        let descriptor = table.get(PathHash(0xAAAA_0001)).unwrap();
        assert_eq!(descriptor.kind, 1);
        assert_eq!(descriptor.detail_offset, 0x10);
        assert_eq!(descriptor.data_offset, 0x2000);
        assert_eq!(descriptor.size, 123);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_hash_last_wins() {
        let mut image = Vec::new();
        record(&mut image, 0x1234, 0, 0x10);
        record(&mut image, 0x1234, 0, 0x18);
        image.resize(0x10, 0);
        for (raw, size) in [(1u32, 10u32), (2, 20)] {
            image.write_u32::<BigEndian>(raw).unwrap();
            image.write_u32::<BigEndian>(size).unwrap();
        }

        let mut reader = BinaryReader::new(&image);
        let table = DescriptorTable::parse(&image, &mut reader, &header(2, 0)).unwrap();

        assert_eq!(table.len(), 1);
        let descriptor = table.get(PathHash(0x1234)).unwrap();
        assert_eq!(descriptor.detail_offset, 0x18);
        assert_eq!(descriptor.data_offset, 2 << 10);
        assert_eq!(descriptor.size, 20);
    }

    #[test]
    fn test_oversized_count_is_eof_not_allocation() {
        let mut image = Vec::new();
        record(&mut image, 1, 0, 0);

        let mut reader = BinaryReader::new(&image);
        let err = DescriptorTable::parse(&image, &mut reader, &header(u32::MAX, 0)).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Common(gamearc_common::Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_detail_past_end_is_error() {
        let mut image = Vec::new();
        record(&mut image, 1, 0, 0xFF_FFFF);

        let mut reader = BinaryReader::new(&image);
        assert!(DescriptorTable::parse(&image, &mut reader, &header(1, 0)).is_err());
    }
}
