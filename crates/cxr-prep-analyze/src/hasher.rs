//! Full-content BLAKE3 fingerprints.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;

use cxr_prep_core::{ContentHash, PrepError};

const BUFFER_SIZE: usize = 64 * 1024;

/// Hash the full content of the file at `path`.
///
/// Every call reads the whole file; nothing is cached between calls.
pub fn hash_file(path: &Path) -> Result<ContentHash, PrepError> {
    hash_file_sized(path).map(|(hash, _)| hash)
}

/// Hash a file and return the number of bytes read alongside the digest.
pub fn hash_file_sized(path: &Path) -> Result<(ContentHash, u64), PrepError> {
    let file = File::open(path).map_err(|e| PrepError::io(path, e))?;
    hash_reader(file).map_err(|e| PrepError::io(path, e))
}

/// Hash everything a reader yields until EOF.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<(ContentHash, u64)> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((ContentHash::new(*hasher.finalize().as_bytes()), total))
}
