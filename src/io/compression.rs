//! Gzip support for compressed dataset bundles.
//!
//! Binary arrays of a dataset description are stored as `<id>.gz` files
//! when gzip fetching is enabled.

use std::io::{Read, Write};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Check for the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Decompress a gzip member.
///
/// Anything that is not a valid gzip stream is a [`Error::ContainerUnpack`].
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    if !is_gzip(data) {
        return Err(Error::ContainerUnpack("missing gzip header".into()));
    }
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::ContainerUnpack(e.to_string()))?;
    Ok(out)
}

/// Compress data as a gzip member.
///
/// `level` is clamped to 0-9 (0 stores, 9 is max compression).
pub fn gzip(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_gunzip() {
        let original = b"0123456789abcdef".repeat(64);
        let packed = gzip(&original, 6).unwrap();
        assert!(is_gzip(&packed));
        assert!(packed.len() < original.len());
        assert_eq!(gunzip(&packed).unwrap(), original);
    }

    #[test]
    fn test_gunzip_rejects_plain_bytes() {
        let err = gunzip(b"not compressed").unwrap_err();
        assert!(matches!(err, Error::ContainerUnpack(_)));
    }

    #[test]
    fn test_gunzip_rejects_bad_method() {
        // Valid magic, compression method 0 instead of deflate
        let bogus = [0x1f, 0x8b, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 1, 2, 3];
        let err = gunzip(&bogus).unwrap_err();
        assert!(matches!(err, Error::ContainerUnpack(_)));
    }
}
