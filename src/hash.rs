//! BLAKE3 content hashing for idempotent installs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{Result, fs as fs_error};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| fs_error::read_failed(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_error::read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Whether `dest` already exists with the same bytes as `src`.
///
/// Sizes are compared first so differing files are rejected without hashing.
pub fn same_content(src: &Path, dest: &Path) -> Result<bool> {
    let Ok(dest_meta) = dest.metadata() else {
        return Ok(false);
    };
    if !dest_meta.is_file() {
        return Ok(false);
    }
    let src_meta = src.metadata().map_err(|e| fs_error::read_failed(src, e))?;
    if src_meta.len() != dest_meta.len() {
        return Ok(false);
    }
    Ok(hash_file(src)? == hash_file(dest)?)
}
