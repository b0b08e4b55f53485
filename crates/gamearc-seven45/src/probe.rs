//! Seven45 format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::trace;

use crate::crypto::BLOCK_SIZE;
use crate::KeyProber;

/// File name suffix of a Seven45 header (matched ignoring ASCII case).
pub const HEADER_SUFFIX: &str = ".hdr.e.2";

/// Whether a file name ends with the header suffix.
pub fn has_header_suffix(name: &str) -> bool {
    name.len() >= HEADER_SUFFIX.len()
        && name.as_bytes()[name.len() - HEADER_SUFFIX.len()..]
            .eq_ignore_ascii_case(HEADER_SUFFIX.as_bytes())
}

/// Check a candidate by name and leading bytes.
pub fn probe_bytes(name: &str, data: &[u8], prober: &KeyProber) -> bool {
    has_header_suffix(name) && prober.probe(data).is_some()
}

/// Check a candidate file on disk with the built-in keys.
///
/// Unreadable files are reported as no match. The built-in key is a
/// placeholder, so shipped packages only match through [`probe_file_with`]
/// and a prober holding the real key tables.
pub fn probe_file<P: AsRef<Path>>(path: P) -> bool {
    probe_file_with(path, &KeyProber::default())
}

/// Check a candidate file on disk, reading only its first cipher block.
pub fn probe_file_with<P: AsRef<Path>>(path: P, prober: &KeyProber) -> bool {
    let path = path.as_ref();
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if !has_header_suffix(name) {
        return false;
    }

    let mut block = [0u8; BLOCK_SIZE];
    let read = File::open(path).and_then(|mut file| file.read_exact(&mut block));
    if let Err(err) = read {
        trace!(path = %path.display(), %err, "cannot read probe block");
        return false;
    }
    prober.probe(&block).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypt_header;
    use crate::{SEVEN45_MAGIC, UPDATE_CONFIG};

    fn encrypted_magic() -> Vec<u8> {
        let mut plain = SEVEN45_MAGIC.to_le_bytes().to_vec();
        plain.resize(48, 0);
        encrypt_header(&UPDATE_CONFIG, &plain)
    }

    #[test]
    fn test_suffix() {
        assert!(has_header_suffix("songs.hdr.e.2"));
        assert!(has_header_suffix("SONGS.HDR.E.2"));
        assert!(has_header_suffix(".hdr.e.2"));
        assert!(!has_header_suffix("songs.hdr.e"));
        assert!(!has_header_suffix("songs.pk0"));
        assert!(!has_header_suffix("ë"));
    }

    #[test]
    fn test_probe_requires_name_and_key() {
        let prober = KeyProber::default();
        let data = encrypted_magic();
        assert!(probe_bytes("a.hdr.e.2", &data, &prober));
        assert!(!probe_bytes("a.bin", &data, &prober));
        assert!(!probe_bytes("a.hdr.e.2", &[0u8; 48], &prober));
    }

    #[test]
    fn test_probe_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Pack.hdr.e.2");
        std::fs::write(&good, encrypted_magic()).unwrap();
        let renamed = dir.path().join("Pack.bin");
        std::fs::write(&renamed, encrypted_magic()).unwrap();
        let short = dir.path().join("short.hdr.e.2");
        std::fs::write(&short, b"tiny").unwrap();

        assert!(probe_file(&good));
        assert!(!probe_file(&renamed));
        assert!(!probe_file(&short));
        assert!(!probe_file(dir.path().join("missing.hdr.e.2")));
    }
}
