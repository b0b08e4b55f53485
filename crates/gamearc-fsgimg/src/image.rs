//! FSG-FILE-SYSTEM image reader.

use std::path::Path;

use gamearc_common::{Archive, BinaryReader, Directory, Volume};
use tracing::debug;

use crate::listing::build_tree;
use crate::{DescriptorTable, Error, FsgHeader, Result};

/// Format name reported by [`Archive::format`].
pub const FORMAT_NAME: &str = "FSGIMG";

/// An opened FSG-FILE-SYSTEM image.
///
/// File contents live in the image itself, so every file's locator points
/// at the header stream.
pub struct FsgImage {
    header: FsgHeader,
    sector_types: Box<[u8]>,
    archive: Archive,
}

impl FsgImage {
    /// Memory-map and parse an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let volume = Volume::map(path).map_err(|err| match err {
            gamearc_common::Error::Io(io) => Error::Io(io),
            other => Error::Common(other),
        })?;
        Self::from_volume(name, volume)
    }

    /// Parse an image held in memory.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let volume = Volume::from_vec(name.clone(), data);
        Self::from_volume(name, volume)
    }

    /// Parse an image from an already opened stream.
    pub fn from_volume(name: impl Into<String>, volume: Volume) -> Result<Self> {
        let data = volume.as_bytes();
        let mut reader = BinaryReader::new(data);

        let header = FsgHeader::parse(&mut reader)?;
        debug!(
            files = header.num_files,
            base_offset = header.base_offset,
            sectors = header.num_sectors,
            "parsed FSG-FILE-SYSTEM header"
        );

        let sector_len = header.bounded_sector_table_len(data.len());
        let sector_types = vec![0u8; sector_len].into_boxed_slice();
        let descriptors = DescriptorTable::parse(data, &mut reader, &header)?;
        let tree = build_tree(data, &descriptors, u64::from(header.base_offset))?;

        let archive = Archive::new(FORMAT_NAME, name, volume, Vec::new(), tree)?;
        Ok(Self {
            header,
            sector_types,
            archive,
        })
    }

    #[inline]
    pub fn header(&self) -> &FsgHeader {
        &self.header
    }

    /// Per-sector type tags, sized to cover the sector range.
    #[inline]
    pub fn sector_types(&self) -> &[u8] {
        &self.sector_types
    }

    #[inline]
    pub fn root(&self) -> Directory<'_> {
        self.archive.root()
    }

    #[inline]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn into_archive(self) -> Archive {
        self.archive
    }
}

impl std::fmt::Debug for FsgImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsgImage")
            .field("header", &self.header)
            .field("archive", &self.archive)
            .finish()
    }
}
