// Run request and size units

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::GenerationError;

/// How many files a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    /// Exactly `file_count` files of `file_size_bytes` each (capped by free space).
    FixedCount,
    /// Keep writing files until the target volume has no free space left.
    FillDrive,
}

/// File size units offered by the front-end; binary multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Gbyte,
    Mbyte,
    Kbyte,
    Byte,
}

impl SizeUnit {
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Gbyte => 1024 * 1024 * 1024,
            SizeUnit::Mbyte => 1024 * 1024,
            SizeUnit::Kbyte => 1024,
            SizeUnit::Byte => 1,
        }
    }

    /// `value` expressed in bytes; overflow is a validation error.
    pub fn to_bytes(self, value: u64) -> Result<u64, GenerationError> {
        value.checked_mul(self.multiplier()).ok_or_else(|| {
            GenerationError::Validation(format!("file size {} {:?} overflows u64", value, self))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub target_directory: PathBuf,
    pub mode: GenerationMode,
    /// Per-file size. In fill mode this is also the nominal size of every file but the last.
    pub file_size_bytes: u64,
    /// Only meaningful for [`GenerationMode::FixedCount`].
    pub file_count: u64,
}

impl RunRequest {
    pub fn fixed_count(target_directory: impl Into<PathBuf>, file_size_bytes: u64, file_count: u64) -> Self {
        Self {
            target_directory: target_directory.into(),
            mode: GenerationMode::FixedCount,
            file_size_bytes,
            file_count,
        }
    }

    pub fn fill_drive(target_directory: impl Into<PathBuf>, file_size_bytes: u64) -> Self {
        Self {
            target_directory: target_directory.into(),
            mode: GenerationMode::FillDrive,
            file_size_bytes,
            file_count: 0,
        }
    }

    /// Checks done before any I/O besides the directory lookup.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.file_size_bytes == 0 {
            return Err(GenerationError::Validation(
                "file size must be greater than 0 bytes".into(),
            ));
        }
        if self.mode == GenerationMode::FixedCount && self.file_count == 0 {
            return Err(GenerationError::Validation(
                "number of files must be greater than 0".into(),
            ));
        }
        if !self.target_directory.is_dir() {
            return Err(GenerationError::Validation(
                "Please specify a valid output folder.".into(),
            ));
        }
        Ok(())
    }
}
