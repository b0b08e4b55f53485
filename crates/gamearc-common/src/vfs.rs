//! Read-only virtual file tree.
//!
//! Nodes live in flat arenas inside a [`Tree`] and refer to each other by
//! [`DirId`] / [`FileId`]. A child's parent link is just an id, so the tree
//! has no ownership cycles. [`Directory`] and [`File`] are cheap borrowed
//! views that resolve those ids through the owning [`Archive`].

use std::borrow::Cow;
use std::io::Cursor;

use crate::Archive;

/// Identifier of a directory within a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirId(u32);

impl DirId {
    /// The synthetic root directory, always present.
    pub const ROOT: DirId = DirId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a file within a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which archive stream a file's bytes live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StreamRef {
    /// The archive's header stream.
    Header,
    /// A numbered content volume.
    Volume(u16),
}

/// Lazy location of a file's contents. No bytes are copied at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataLocator {
    pub stream: StreamRef,
    pub offset: u64,
    pub length: u64,
}

impl DataLocator {
    pub const fn new(stream: StreamRef, offset: u64, length: u64) -> Self {
        Self {
            stream,
            offset,
            length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildRef {
    Dir(DirId),
    File(FileId),
}

#[derive(Debug)]
struct DirData {
    name: String,
    parent: Option<DirId>,
    children: Vec<ChildRef>,
}

#[derive(Debug)]
struct FileData {
    name: String,
    parent: DirId,
    locator: DataLocator,
}

/// Immutable directory tree produced by a [`TreeBuilder`].
#[derive(Debug)]
pub struct Tree {
    dirs: Vec<DirData>,
    files: Vec<FileData>,
}

impl Tree {
    /// Number of directories, including the root.
    #[inline]
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Iterate over every file id in insertion order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len() as u32).map(FileId)
    }

    pub fn dir_name(&self, id: DirId) -> &str {
        &self.dirs[id.index()].name
    }

    pub fn dir_parent(&self, id: DirId) -> Option<DirId> {
        self.dirs[id.index()].parent
    }

    pub fn file_name(&self, id: FileId) -> &str {
        &self.files[id.index()].name
    }

    pub fn file_parent(&self, id: FileId) -> DirId {
        self.files[id.index()].parent
    }

    pub fn locator(&self, id: FileId) -> DataLocator {
        self.files[id.index()].locator
    }

    /// Slash-separated path of a directory, relative to the root (`""` for the root).
    pub fn dir_path(&self, id: DirId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(dir) = current {
            let data = &self.dirs[dir.index()];
            if data.parent.is_some() {
                parts.push(data.name.as_str());
            }
            current = data.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Slash-separated path of a file, relative to the root.
    pub fn file_path(&self, id: FileId) -> String {
        let data = &self.files[id.index()];
        let parent = self.dir_path(data.parent);
        if parent.is_empty() {
            data.name.clone()
        } else {
            format!("{}/{}", parent, data.name)
        }
    }

    fn children(&self, id: DirId) -> &[ChildRef] {
        &self.dirs[id.index()].children
    }
}

/// Incrementally assembles a [`Tree`].
///
/// The root directory exists from the start. Ids handed out by the builder
/// are the only way to name a parent, so every parent precedes its children.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
}

impl TreeBuilder {
    /// Name given to the synthetic root directory.
    pub const ROOT_NAME: &'static str = "/";

    pub fn new() -> Self {
        Self {
            tree: Tree {
                dirs: vec![DirData {
                    name: Self::ROOT_NAME.to_string(),
                    parent: None,
                    children: Vec::new(),
                }],
                files: Vec::new(),
            },
        }
    }

    /// Append a subdirectory to `parent` and return its id.
    pub fn add_dir(&mut self, parent: DirId, name: impl Into<String>) -> DirId {
        let id = DirId(self.tree.dirs.len() as u32);
        self.tree.dirs.push(DirData {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.tree.dirs[parent.index()].children.push(ChildRef::Dir(id));
        id
    }

    /// Append a file to `parent` and return its id.
    pub fn add_file(
        &mut self,
        parent: DirId,
        name: impl Into<String>,
        locator: DataLocator,
    ) -> FileId {
        let id = FileId(self.tree.files.len() as u32);
        self.tree.files.push(FileData {
            name: name.into(),
            parent,
            locator,
        });
        self.tree.dirs[parent.index()].children.push(ChildRef::File(id));
        id
    }

    pub fn finish(self) -> Tree {
        self.tree
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a stored name for display.
///
/// Valid UTF-8 is kept as is; anything else is read one byte per character
/// (Latin-1), so every name decodes and no byte is lost.
pub fn decode_name(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(name) => Cow::Borrowed(name),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Reader over one file's bytes, bounded to its data range.
pub type FileReader<'a> = Cursor<&'a [u8]>;

/// Borrowed view of a directory.
#[derive(Clone, Copy)]
pub struct Directory<'a> {
    archive: &'a Archive,
    id: DirId,
}

impl<'a> Directory<'a> {
    pub(crate) fn new(archive: &'a Archive, id: DirId) -> Self {
        Self { archive, id }
    }

    #[inline]
    pub fn id(&self) -> DirId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.archive.tree().dir_name(self.id)
    }

    /// Whether this is the archive root.
    pub fn is_root(&self) -> bool {
        self.id == DirId::ROOT
    }

    pub fn parent(&self) -> Option<Directory<'a>> {
        self.archive
            .tree()
            .dir_parent(self.id)
            .map(|id| Directory::new(self.archive, id))
    }

    /// Path relative to the archive root.
    pub fn path(&self) -> String {
        self.archive.tree().dir_path(self.id)
    }

    /// Children in insertion order, directories and files interleaved.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let archive = self.archive;
        archive.tree().children(self.id).iter().map(move |child| match *child {
            ChildRef::Dir(id) => Node::Dir(Directory::new(archive, id)),
            ChildRef::File(id) => Node::File(File::new(archive, id)),
        })
    }

    pub fn dirs(&self) -> impl Iterator<Item = Directory<'a>> + 'a {
        self.children().filter_map(|node| match node {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = File<'a>> + 'a {
        self.children().filter_map(|node| match node {
            Node::File(file) => Some(file),
            Node::Dir(_) => None,
        })
    }

    /// Find a direct child by name (ASCII case-insensitive).
    pub fn get(&self, name: &str) -> Option<Node<'a>> {
        self.children()
            .find(|node| node.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Debug for Directory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Borrowed view of a file.
#[derive(Clone, Copy)]
pub struct File<'a> {
    archive: &'a Archive,
    id: FileId,
}

impl<'a> File<'a> {
    pub(crate) fn new(archive: &'a Archive, id: FileId) -> Self {
        Self { archive, id }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.archive.tree().file_name(self.id)
    }

    pub fn parent(&self) -> Directory<'a> {
        Directory::new(self.archive, self.archive.tree().file_parent(self.id))
    }

    /// Path relative to the archive root.
    pub fn path(&self) -> String {
        self.archive.tree().file_path(self.id)
    }

    pub fn locator(&self) -> DataLocator {
        self.archive.tree().locator(self.id)
    }

    /// Size of the file in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.locator().length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The file's bytes, borrowed from the backing stream.
    pub fn read(&self) -> &'a [u8] {
        self.archive.data(&self.locator())
    }

    /// Open a seekable reader bounded to the file's data range.
    pub fn open(&self) -> FileReader<'a> {
        Cursor::new(self.read())
    }
}

impl std::fmt::Debug for File<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("locator", &self.locator())
            .finish()
    }
}

/// A directory or a file.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Dir(Directory<'a>),
    File(File<'a>),
}

impl<'a> Node<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Node::Dir(dir) => dir.name(),
            Node::File(file) => file.name(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Node::Dir(dir) => dir.path(),
            Node::File(file) => file.path(),
        }
    }

    pub fn as_dir(&self) -> Option<Directory<'a>> {
        match self {
            Node::Dir(dir) => Some(*dir),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<File<'a>> {
        match self {
            Node::File(file) => Some(*file),
            Node::Dir(_) => None,
        }
    }
}

/// Depth-first, pre-order walk over every node below a directory.
pub struct Walk<'a> {
    stack: Vec<Node<'a>>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(root: Directory<'a>) -> Self {
        let mut stack: Vec<Node<'a>> = root.children().collect();
        stack.reverse();
        Self { stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Node::Dir(dir) = node {
            let start = self.stack.len();
            self.stack.extend(dir.children());
            self.stack[start..].reverse();
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_insertion_order() {
        let mut builder = TreeBuilder::new();
        let a = builder.add_dir(DirId::ROOT, "a");
        builder.add_file(DirId::ROOT, "z.bin", DataLocator::new(StreamRef::Header, 0, 1));
        let b = builder.add_dir(a, "b");
        let file = builder.add_file(b, "leaf.txt", DataLocator::new(StreamRef::Volume(1), 8, 4));
        let tree = builder.finish();

        assert_eq!(tree.dir_count(), 3);
        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.dir_name(DirId::ROOT), "/");
        assert_eq!(tree.dir_parent(DirId::ROOT), None);
        assert_eq!(tree.dir_parent(b), Some(a));
        assert_eq!(tree.dir_path(b), "a/b");
        assert_eq!(tree.file_path(file), "a/b/leaf.txt");
        assert_eq!(
            tree.children(DirId::ROOT),
            &[ChildRef::Dir(a), ChildRef::File(FileId(0))]
        );
    }

    #[test]
    fn test_decode_name() {
        assert_eq!(decode_name(b"plain.txt"), "plain.txt");
        assert_eq!(decode_name("süd".as_bytes()), "süd");
        assert_eq!(decode_name(b"caf\xE9"), "caf\u{e9}");
    }

    #[test]
    fn test_root_paths() {
        let mut builder = TreeBuilder::default();
        let file = builder.add_file(DirId::ROOT, "top", DataLocator::new(StreamRef::Header, 0, 0));
        let tree = builder.finish();

        assert_eq!(tree.dir_path(DirId::ROOT), "");
        assert_eq!(tree.file_path(file), "top");
    }
}
