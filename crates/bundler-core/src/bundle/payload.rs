//! Reading the payload back out of a bundle.
//!
//! Uses the same rule as the bootstrap script: the payload begins on the
//! line after the first line starting with [`SENTINEL`].

use crate::BundleError;
use crate::Result;
use crate::bundle::template::SENTINEL;
use flate2::read::GzDecoder;
use std::path::Path;
use tar::Archive;

/// Returns the byte offset where the payload starts, or `None` if no line
/// starts with the sentinel.
///
/// # Examples
///
/// ```
/// use bundler_core::bundle::payload::payload_offset;
///
/// let bundle = b"#!/bin/bash\nexit 0\n\n__BUNDLER_ARCHIVE__\n\x1f\x8b";
/// assert_eq!(payload_offset(bundle), Some(bundle.len() - 2));
/// assert_eq!(payload_offset(b"#!/bin/bash\n"), None);
/// ```
#[must_use]
pub fn payload_offset(bundle: &[u8]) -> Option<usize> {
    let marker = SENTINEL.as_bytes();
    let mut start = 0;
    while start < bundle.len() {
        let end = bundle[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bundle.len(), |i| start + i + 1);
        if bundle[start..end].starts_with(marker) {
            return Some(end);
        }
        start = end;
    }
    None
}

/// Reads the raw payload bytes of the bundle at `path`.
pub fn read_payload<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut bytes = std::fs::read(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let offset = payload_offset(&bytes).ok_or_else(|| invalid(path, "no archive sentinel line"))?;
    bytes.drain(..offset);
    Ok(bytes)
}

/// Lists the entry names stored in the payload, in archive order.
pub fn list_payload<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let payload = read_payload(path)?;
    let mut archive = Archive::new(GzDecoder::new(payload.as_slice()));

    let entries = archive
        .entries()
        .map_err(|e| invalid(path, &e.to_string()))?;
    entries
        .map(|entry| {
            let entry = entry.map_err(|e| invalid(path, &e.to_string()))?;
            Ok(String::from_utf8_lossy(&entry.path_bytes()).into_owned())
        })
        .collect()
}

/// Extracts the payload into `destination`, as the bootstrap's `--unpack`
/// flag does.
pub fn unpack_payload<P: AsRef<Path>, Q: AsRef<Path>>(path: P, destination: Q) -> Result<()> {
    let path = path.as_ref();
    let payload = read_payload(path)?;
    let mut archive = Archive::new(GzDecoder::new(payload.as_slice()));
    archive
        .unpack(destination.as_ref())
        .map_err(|e| invalid(path, &e.to_string()))
}

fn invalid(path: &Path, reason: &str) -> BundleError {
    BundleError::InvalidPayload {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
