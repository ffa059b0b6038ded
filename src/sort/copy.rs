//! Atomic file copy, used when a sort input has no data rows

use super::run_store::sibling_path;
use crate::types::{map_file_error, CsvDeltaError};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Copy `src` to `dest` through a temporary sibling and a final rename
///
/// 1. Stream `src` into `<dest>.copy`
/// 2. Flush and sync to disk
/// 3. Rename onto `dest`
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(CsvDeltaError)` - IO error or other failure
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, CsvDeltaError> {
    let tmp_path = sibling_path(dest, "copy");

    let mut src_file = File::open(src).map_err(|e| map_file_error(src, e))?;
    let mut tmp_file = File::create(&tmp_path).map_err(|e| map_file_error(&tmp_path, e))?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file
            .read(&mut buffer)
            .map_err(|e| map_file_error(src, e))?;

        if bytes_read == 0 {
            break; // EOF
        }

        tmp_file
            .write_all(&buffer[0..bytes_read])
            .map_err(|e| map_file_error(&tmp_path, e))?;
        total_bytes += bytes_read as u64;
    }

    tmp_file
        .sync_all()
        .map_err(|e| map_file_error(&tmp_path, e))?;

    // Drop the file handle before rename (required on Windows)
    drop(tmp_file);

    fs::rename(&tmp_path, dest).map_err(|e| map_file_error(&tmp_path, e))?;

    Ok(total_bytes)
}
