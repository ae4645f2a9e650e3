// Collision-free sequential junk file names

use std::path::Path;

use crate::error::GenerationError;

pub const FILE_PREFIX: &str = "JunkFile_";
pub const FILE_EXTENSION: &str = "dat";

/// `JunkFile_00000042.dat` for index 42.
pub fn file_name(index: u64) -> String {
    format!("{FILE_PREFIX}{index:08}.{FILE_EXTENSION}")
}

/// First free name at or after `start_index`, plus the next index worth trying.
pub fn next_available_name(
    directory: &Path,
    start_index: u64,
) -> Result<(String, u64), GenerationError> {
    let mut index = start_index;
    loop {
        let name = file_name(index);
        if !occupied(&directory.join(&name))? {
            return Ok((name, index + 1));
        }
        index += 1;
    }
}

/// Forward scan from 0 to the first unused index; done once per run.
pub fn find_start_index(directory: &Path) -> Result<u64, GenerationError> {
    let (_, next) = next_available_name(directory, 0)?;
    Ok(next - 1)
}

fn occupied(path: &Path) -> Result<bool, GenerationError> {
    path.try_exists()
        .map_err(|e| GenerationError::io("checking", path, e))
}
