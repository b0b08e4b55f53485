//! The archive handle shared by every format.

use tracing::debug;

use crate::vfs::{DataLocator, DirId, Directory, Node, StreamRef, Tree, Walk};
use crate::{Error, Result, Volume};

/// A parsed, read-only archive.
///
/// Owns the header stream, every content volume and the directory tree.
/// Node views borrow the archive, so they cannot outlive the streams they
/// read from. Dropping the archive unmaps or frees every stream.
pub struct Archive {
    format: &'static str,
    name: String,
    header: Volume,
    volumes: Vec<Volume>,
    tree: Tree,
}

impl Archive {
    /// Assemble an archive, checking that every file's data range lies
    /// inside the stream it points at.
    pub fn new(
        format: &'static str,
        name: impl Into<String>,
        header: Volume,
        volumes: Vec<Volume>,
        tree: Tree,
    ) -> Result<Self> {
        let archive = Self {
            format,
            name: name.into(),
            header,
            volumes,
            tree,
        };
        archive.validate_locators()?;

        debug!(
            format,
            name = %archive.name,
            dirs = archive.tree.dir_count(),
            files = archive.tree.file_count(),
            volumes = archive.volumes.len(),
            "archive assembled"
        );
        Ok(archive)
    }

    /// Short name of the container format.
    #[inline]
    pub fn format(&self) -> &'static str {
        self.format
    }

    /// Archive name (usually the header file name).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root directory.
    #[inline]
    pub fn root(&self) -> Directory<'_> {
        Directory::new(self, DirId::ROOT)
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn header(&self) -> &Volume {
        &self.header
    }

    #[inline]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    #[inline]
    pub fn file_count(&self) -> usize {
        self.tree.file_count()
    }

    #[inline]
    pub fn dir_count(&self) -> usize {
        self.tree.dir_count()
    }

    /// Combined length of the header and every content volume.
    pub fn total_size(&self) -> u64 {
        self.header.len() + self.volumes.iter().map(Volume::len).sum::<u64>()
    }

    /// Resolve a stream reference.
    pub fn stream(&self, stream: StreamRef) -> Option<&Volume> {
        match stream {
            StreamRef::Header => Some(&self.header),
            StreamRef::Volume(index) => self.volumes.get(index as usize),
        }
    }

    /// Depth-first walk over every node below the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self.root())
    }

    /// Look up a node by slash-separated path (ASCII case-insensitive).
    ///
    /// A leading `/` is optional; the empty path names the root.
    pub fn find(&self, path: &str) -> Option<Node<'_>> {
        let mut node = Node::Dir(self.root());
        for part in path.split('/').filter(|part| !part.is_empty()) {
            node = node.as_dir()?.get(part)?;
        }
        Some(node)
    }

    /// Bytes addressed by a locator. Locators were validated at construction.
    pub(crate) fn data(&self, locator: &DataLocator) -> &[u8] {
        self.stream(locator.stream)
            .and_then(|volume| volume.slice(locator.offset, locator.length))
            .unwrap_or_default()
    }

    fn validate_locators(&self) -> Result<()> {
        for id in self.tree.file_ids() {
            let locator = self.tree.locator(id);
            let volume = self.stream(locator.stream).ok_or_else(|| {
                let volume = match locator.stream {
                    StreamRef::Volume(index) => index,
                    StreamRef::Header => 0,
                };
                Error::UnknownVolume {
                    path: self.tree.file_path(id),
                    volume,
                    available: self.volumes.len(),
                }
            })?;

            let in_bounds = locator
                .offset
                .checked_add(locator.length)
                .is_some_and(|end| end <= volume.len());
            if !in_bounds {
                return Err(Error::LocatorOutOfBounds {
                    path: self.tree.file_path(id),
                    offset: locator.offset,
                    length: locator.length,
                    stream_len: volume.len(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("format", &self.format)
            .field("name", &self.name)
            .field("dirs", &self.tree.dir_count())
            .field("files", &self.tree.file_count())
            .field("volumes", &self.volumes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::vfs::TreeBuilder;

    fn sample() -> Archive {
        let mut builder = TreeBuilder::new();
        let data = builder.add_dir(DirId::ROOT, "Data");
        builder.add_file(data, "a.bin", DataLocator::new(StreamRef::Volume(0), 2, 3));
        builder.add_file(DirId::ROOT, "readme", DataLocator::new(StreamRef::Header, 0, 4));
        Archive::new(
            "test",
            "sample",
            Volume::from_vec("hdr", b"HDR!".to_vec()),
            vec![Volume::from_vec("pk0", b"..abc..".to_vec())],
            builder.finish(),
        )
        .unwrap()
    }

    #[test]
    fn test_find_and_read() {
        let archive = sample();
        let file = archive.find("/data/A.BIN").unwrap().as_file().unwrap();
        assert_eq!(file.read(), b"abc");
        assert_eq!(file.path(), "Data/a.bin");
        assert_eq!(file.parent().name(), "Data");

        let mut contents = String::new();
        file.open().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "abc");

        assert_eq!(archive.find("readme").unwrap().as_file().unwrap().read(), b"HDR!");
        assert!(archive.find("").unwrap().as_dir().unwrap().is_root());
        assert!(archive.find("data/missing").is_none());
        assert!(archive.find("readme/child").is_none());
    }

    #[test]
    fn test_walk_is_depth_first() {
        let archive = sample();
        let paths: Vec<String> = archive.walk().map(|node| node.path()).collect();
        assert_eq!(paths, ["Data", "Data/a.bin", "readme"]);
        assert_eq!(archive.total_size(), 4 + 7);
    }

    #[test]
    fn test_out_of_bounds_locator_rejected() {
        let mut builder = TreeBuilder::new();
        builder.add_file(DirId::ROOT, "big", DataLocator::new(StreamRef::Volume(0), 5, 10));
        let err = Archive::new(
            "test",
            "bad",
            Volume::from_vec("hdr", Vec::new()),
            vec![Volume::from_vec("pk0", vec![0; 8])],
            builder.finish(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::LocatorOutOfBounds { stream_len: 8, .. }
        ));
    }

    #[test]
    fn test_unknown_volume_rejected() {
        let mut builder = TreeBuilder::new();
        builder.add_file(DirId::ROOT, "x", DataLocator::new(StreamRef::Volume(3), 0, 0));
        let err = Archive::new(
            "test",
            "bad",
            Volume::from_vec("hdr", Vec::new()),
            Vec::new(),
            builder.finish(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownVolume { volume: 3, available: 0, .. }));
    }
}
