//! Seven45 package reader: encrypted header plus `.pk<N>` content volumes.

use std::path::{Path, PathBuf};

use gamearc_common::{Archive, Directory, FileId, Volume};
use tracing::{debug, info};

use crate::probe::HEADER_SUFFIX;
use crate::records::{FileEntry, Seven45Header};
use crate::tables::HeaderTables;
use crate::{Error, KeyConfig, KeyProber, Result};

/// Format name reported by [`Archive::format`].
pub const FORMAT_NAME: &str = "Seven45";

/// An opened Seven45 package.
///
/// The decrypted header is kept in memory as the archive's header stream;
/// file contents are read from the memory-mapped content volumes.
pub struct Seven45Package {
    header: Seven45Header,
    key_config: KeyConfig,
    entries: Vec<FileEntry>,
    archive: Archive,
}

impl Seven45Package {
    /// Open a package from its `.hdr.e.2` header file using the built-in keys.
    ///
    /// The built-in key is a placeholder (see [`crate::BUILTIN_CONFIGS`]); use
    /// [`Self::open_with`] with the real key tables for shipped packages.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &KeyProber::default())
    }

    /// Open a package, probing the given key configurations.
    ///
    /// Content volumes are looked up next to the header file.
    pub fn open_with<P: AsRef<Path>>(path: P, prober: &KeyProber) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let raw = std::fs::read(path)?;
        let (config, plain) = prober.decrypt(&raw)?;
        let tables = HeaderTables::parse(&plain)?;

        let count = tables.volume_count();
        let mut volumes = Vec::with_capacity(count);
        for index in 0..count {
            volumes.push(map_volume(&volume_path(path, index))?);
        }

        info!(path = %path.display(), key = config.name, volumes = count, "opening Seven45 package");
        Self::assemble(name, config.clone(), plain, tables, volumes)
    }

    /// Build a package from an encrypted header and already opened volumes.
    ///
    /// `volumes[n]` backs `.pk<n>`. Extra volumes are kept but unused.
    pub fn from_parts(
        name: impl Into<String>,
        raw_header: &[u8],
        volumes: Vec<Volume>,
        prober: &KeyProber,
    ) -> Result<Self> {
        let (config, plain) = prober.decrypt(raw_header)?;
        let tables = HeaderTables::parse(&plain)?;

        let expected = tables.volume_count();
        if volumes.len() < expected {
            return Err(Error::MissingVolumes {
                expected,
                found: volumes.len(),
            });
        }

        Self::assemble(name.into(), config.clone(), plain, tables, volumes)
    }

    fn assemble(
        name: String,
        key_config: KeyConfig,
        plain: Vec<u8>,
        tables: HeaderTables,
        volumes: Vec<Volume>,
    ) -> Result<Self> {
        let tree = tables.build_tree()?;
        let header = Volume::from_vec(format!("{name} (decrypted)"), plain);
        let archive = Archive::new(FORMAT_NAME, name, header, volumes, tree)?;
        debug!(files = archive.file_count(), dirs = archive.dir_count(), "Seven45 tree built");

        Ok(Self {
            header: tables.header,
            key_config,
            entries: tables.files,
            archive,
        })
    }

    #[inline]
    pub fn header(&self) -> &Seven45Header {
        &self.header
    }

    /// The key configuration that decrypted the header.
    #[inline]
    pub fn key_config(&self) -> &KeyConfig {
        &self.key_config
    }

    /// The raw entry behind a file, including its timestamp.
    pub fn file_entry(&self, id: FileId) -> Option<&FileEntry> {
        self.entries.get(id.index())
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

impl std::fmt::Debug for Seven45Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seven45Package")
            .field("key", &self.key_config.name)
            .field("archive", &self.archive)
            .finish()
    }
}

/// Path of content volume `index` for the given header path.
///
/// The `.hdr.e.2` suffix (any case) is replaced by `.pk<index>`. A header
/// without the suffix gets `.pk<index>` appended.
pub fn volume_path(header_path: &Path, index: usize) -> PathBuf {
    let file_name = header_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = if file_name.to_ascii_lowercase().ends_with(HEADER_SUFFIX) {
        &file_name[..file_name.len() - HEADER_SUFFIX.len()]
    } else {
        file_name.as_str()
    };

    header_path.with_file_name(format!("{stem}.pk{index}"))
}

fn map_volume(path: &Path) -> Result<Volume> {
    Volume::map(path).map_err(|err| match err {
        gamearc_common::Error::Io(io) => Error::Io(std::io::Error::new(
            io.kind(),
            format!("content volume {}: {io}", path.display()),
        )),
        other => Error::Common(other),
    })
}
