//! Directory tree reconstruction from name listings.
//!
//! A listing is a run of null-terminated entries ending with an empty one.
//! Each entry is a one-character tag (`D` or `F`) followed by the name. The
//! full path of an entry is hashed to find its descriptor; for a directory
//! the descriptor points at the child listing.

use gamearc_common::{
    decode_name, path_hash_bytes, BinaryReader, DataLocator, DirId, StreamRef, Tree, TreeBuilder,
};
use tracing::trace;

use crate::{DescriptorTable, Error, Result};

/// Nesting limit for listings. Guards against listings that point back at
/// one of their ancestors.
pub const MAX_DEPTH: usize = 256;

const TAG_DIR: u8 = b'D';
const TAG_FILE: u8 = b'F';

/// Build the tree whose root listing starts at `root_offset`.
///
/// Every nested listing is read through its own [`BinaryReader`], so the
/// parent's position needs no saving or restoring around the descent.
pub fn build_tree(image: &[u8], descriptors: &DescriptorTable, root_offset: u64) -> Result<Tree> {
    let mut walker = ListingWalker {
        image,
        descriptors,
        builder: TreeBuilder::new(),
    };
    walker.read_listing(DirId::ROOT, root_offset, b"", 0)?;
    Ok(walker.builder.finish())
}

struct ListingWalker<'a> {
    image: &'a [u8],
    descriptors: &'a DescriptorTable,
    builder: TreeBuilder,
}

impl ListingWalker<'_> {
    fn read_listing(&mut self, dir: DirId, offset: u64, path: &[u8], depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::ListingTooDeep {
                path: decode_name(path).into_owned(),
                max: MAX_DEPTH,
            });
        }

        let mut reader = BinaryReader::new_at(self.image, offset)?;
        loop {
            let entry = reader.read_cstring()?;
            let Some((&tag, name)) = entry.split_first() else {
                break;
            };

            if tag != TAG_DIR && tag != TAG_FILE {
                return Err(Error::InvalidEntryTag {
                    tag: char::from(tag),
                    directory: decode_name(path).into_owned(),
                });
            }

            let mut child_path = Vec::with_capacity(path.len() + name.len() + 1);
            if !path.is_empty() {
                child_path.extend_from_slice(path);
                child_path.push(b'/');
            }
            child_path.extend_from_slice(name);

            let hash = path_hash_bytes(&child_path);
            let descriptor = *self.descriptors.get(hash).ok_or_else(|| Error::MissingDescriptor {
                path: decode_name(&child_path).into_owned(),
                hash,
            })?;

            let name = decode_name(name);
            if tag == TAG_DIR {
                trace!(
                    path = %decode_name(&child_path),
                    offset = descriptor.data_offset,
                    "entering directory"
                );
                let child = self.builder.add_dir(dir, name);
                self.read_listing(child, descriptor.data_offset, &child_path, depth + 1)?;
            } else {
                let locator = DataLocator::new(
                    StreamRef::Header,
                    descriptor.data_offset,
                    u64::from(descriptor.size),
                );
                trace!(path = %decode_name(&child_path), ?locator, "file");
                self.builder.add_file(dir, name, locator);
            }
        }
        Ok(())
    }
}
