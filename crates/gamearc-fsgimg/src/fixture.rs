//! Synthetic image builder for tests.

use std::collections::HashMap;

use byteorder::{BigEndian, WriteBytesExt};
use gamearc_common::path_hash_bytes;

use crate::header::{FSG_MAGIC, HEADER_SIZE};

const SLOT: usize = 1 << crate::DATA_OFFSET_SHIFT;

pub enum Entry {
    Dir(Vec<u8>, Vec<Entry>),
    File(Vec<u8>, Vec<u8>),
}

pub fn dir(name: &str, children: Vec<Entry>) -> Entry {
    Entry::Dir(name.as_bytes().to_vec(), children)
}

pub fn file(name: &str, data: &[u8]) -> Entry {
    raw_file(name.as_bytes(), data)
}

/// A file whose stored name is arbitrary bytes.
pub fn raw_file(name: &[u8], data: &[u8]) -> Entry {
    Entry::File(name.to_vec(), data.to_vec())
}

struct Node {
    path: Vec<u8>,
    content: Vec<u8>,
    slot: usize,
}

#[derive(Default)]
pub struct ImageBuilder {
    entries: Vec<Entry>,
    base_offset: Option<u32>,
    tags: HashMap<Vec<u8>, char>,
    omitted: Vec<Vec<u8>>,
    sizes: HashMap<Vec<u8>, u32>,
    num_files: Option<u32>,
    num_sectors: Option<u32>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn base_offset(mut self, base_offset: u32) -> Self {
        self.base_offset = Some(base_offset);
        self
    }

    /// Replace the listing tag written for `path`.
    pub fn corrupt_tag(mut self, path: &str, tag: char) -> Self {
        self.tags.insert(path.as_bytes().to_vec(), tag);
        self
    }

    /// Leave `path` out of the descriptor table.
    pub fn omit_descriptor(mut self, path: &str) -> Self {
        self.omitted.push(path.as_bytes().to_vec());
        self
    }

    /// Store a different size than the real content length for `path`.
    pub fn override_size(mut self, path: &str, size: u32) -> Self {
        self.sizes.insert(path.as_bytes().to_vec(), size);
        self
    }

    /// Write a different file count into the header than the table holds.
    pub fn override_num_files(mut self, num_files: u32) -> Self {
        self.num_files = Some(num_files);
        self
    }

    /// Write a different sector count into the header.
    pub fn override_num_sectors(mut self, num_sectors: u32) -> Self {
        self.num_sectors = Some(num_sectors);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut nodes = Vec::new();
        let mut next_slot = 0;
        let root_listing = self.listing(b"", &self.entries);
        next_slot += slots_for(root_listing.len());
        self.collect(b"", &self.entries, &mut nodes, &mut next_slot);

        let described: Vec<&Node> = nodes
            .iter()
            .filter(|node| !self.omitted.contains(&node.path))
            .collect();

        let tables_end = HEADER_SIZE + described.len() * 16;
        let base_offset = self
            .base_offset
            .unwrap_or_else(|| tables_end.next_multiple_of(0x1000).max(0x1000) as u32);
        assert!(base_offset as usize >= tables_end, "base offset overlaps tables");

        let total = base_offset as usize + next_slot * SLOT;
        let num_sectors = self
            .num_sectors
            .unwrap_or(total.div_ceil(0x2_0000) as u32);

        let mut image = FSG_MAGIC.to_vec();
        for field in [
            2,
            HEADER_SIZE as u32,
            num_sectors,
            0x180,
            base_offset,
            0x8000,
            8,
            self.num_files.unwrap_or(described.len() as u32),
            0,
            0,
        ] {
            image.write_u32::<BigEndian>(field).unwrap();
        }

        let details_start = HEADER_SIZE + described.len() * 8;
        for (i, node) in described.iter().enumerate() {
            image.write_u32::<BigEndian>(path_hash_bytes(&node.path).value()).unwrap();
            image.write_u8(0).unwrap();
            image
                .write_u24::<BigEndian>((details_start + i * 8) as u32)
                .unwrap();
        }
        for node in &described {
            let size = self
                .sizes
                .get(&node.path)
                .copied()
                .unwrap_or(node.content.len() as u32);
            image.write_u32::<BigEndian>(node.slot as u32).unwrap();
            image.write_u32::<BigEndian>(size).unwrap();
        }

        image.resize(total, 0);
        place(&mut image, base_offset as usize, &root_listing);
        for node in &nodes {
            place(&mut image, base_offset as usize + node.slot * SLOT, &node.content);
        }
        image
    }

    fn collect(&self, parent: &[u8], entries: &[Entry], nodes: &mut Vec<Node>, next_slot: &mut usize) {
        for entry in entries {
            let (path, content, children) = match entry {
                Entry::Dir(name, children) => {
                    let path = join(parent, name);
                    let listing = self.listing(&path, children);
                    (path, listing, Some(children))
                }
                Entry::File(name, data) => (join(parent, name), data.clone(), None),
            };
            let slot = *next_slot;
            *next_slot += slots_for(content.len());
            nodes.push(Node {
                path: path.clone(),
                content,
                slot,
            });
            if let Some(children) = children {
                self.collect(&path, children, nodes, next_slot);
            }
        }
    }

    fn listing(&self, parent: &[u8], entries: &[Entry]) -> Vec<u8> {
        let mut listing = Vec::new();
        for entry in entries {
            let (default_tag, name) = match entry {
                Entry::Dir(name, _) => ('D', name),
                Entry::File(name, _) => ('F', name),
            };
            let tag = self
                .tags
                .get(&join(parent, name))
                .copied()
                .unwrap_or(default_tag);
            listing.push(tag as u8);
            listing.extend_from_slice(name);
            listing.push(0);
        }
        listing.push(0);
        listing
    }
}

fn join(parent: &[u8], name: &[u8]) -> Vec<u8> {
    let mut path = parent.to_vec();
    if !path.is_empty() {
        path.push(b'/');
    }
    path.extend_from_slice(name);
    path
}

fn slots_for(len: usize) -> usize {
    len.div_ceil(SLOT).max(1)
}

fn place(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}
