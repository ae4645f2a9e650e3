// Target file count and byte goal for a run

use crate::error::GenerationError;
use crate::models::{GenerationMode, RunRequest};

/// Ceiling of `numerator / denominator`; 0 when the denominator is 0.
pub fn ceil_divide(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    numerator.div_ceil(denominator)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationPlan {
    pub mode: GenerationMode,
    pub files_target: u64,
    /// Nominal size of each file; the actual size is clamped to free space at write time.
    pub file_size_bytes: u64,
    /// Never more than the free space observed when planning.
    pub total_bytes_goal: u64,
}

pub fn plan(request: &RunRequest, initial_free_bytes: u64) -> Result<GenerationPlan, GenerationError> {
    if request.file_size_bytes == 0 {
        return Err(GenerationError::Validation(
            "file size must be greater than 0 bytes".into(),
        ));
    }

    let (files_target, total_bytes_goal) = match request.mode {
        GenerationMode::FixedCount => (
            request.file_count,
            request
                .file_count
                .saturating_mul(request.file_size_bytes)
                .min(initial_free_bytes),
        ),
        GenerationMode::FillDrive => (
            ceil_divide(initial_free_bytes, request.file_size_bytes),
            initial_free_bytes,
        ),
    };

    if files_target == 0 {
        let reason = match request.mode {
            GenerationMode::FixedCount => "number of files must be greater than 0".to_string(),
            GenerationMode::FillDrive => format!(
                "no free space on the volume holding {}",
                request.target_directory.display()
            ),
        };
        return Err(GenerationError::Validation(reason));
    }

    Ok(GenerationPlan {
        mode: request.mode,
        files_target,
        file_size_bytes: request.file_size_bytes,
        total_bytes_goal,
    })
}

impl GenerationPlan {
    /// Size of the next file: nominal size, clamped to free space and to what is left of the goal.
    pub fn next_file_size(&self, bytes_written: u64, free_bytes: u64) -> u64 {
        self.file_size_bytes
            .min(free_bytes)
            .min(self.total_bytes_goal.saturating_sub(bytes_written))
    }
}

/// Whether the run should start another file. Both modes stop at the planned target;
/// fill mode also stops early once the volume reports no free space.
pub fn should_continue(free_bytes: u64, files_completed: u64, files_target: u64) -> bool {
    free_bytes > 0 && files_completed < files_target
}
