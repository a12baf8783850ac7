use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::io;

/// Location of the script inside the extension archive
pub const EXTENSION_JS_PATH: &str = "resources/extension-touch.js";
const FILE_MODE: u32 = 0o644;

/// Packs a single file into a gzip compressed tar archive
pub fn create_tar_gz(path: &str, data: &[u8]) -> io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(FILE_MODE);
    header.set_mtime(Utc::now().timestamp().max(0) as u64);
    builder.append_data(&mut header, path, data)?;

    let encoder = builder.into_inner()?;
    encoder.finish()
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_archive_contains_script() {
        let archive = create_tar_gz(EXTENSION_JS_PATH, b"console.log('touch');").unwrap();

        let mut tar = tar::Archive::new(GzDecoder::new(archive.as_slice()));
        let mut entries = tar.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();

        assert_eq!(entry.path().unwrap().to_str(), Some(EXTENSION_JS_PATH));
        assert_eq!(entry.header().mode().unwrap(), 0o644);

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "console.log('touch');");
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }
}
