// Chunked random-data file writer with cooperative cancellation

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::cancel::CancellationToken;
use crate::error::GenerationError;
use crate::random_source::RandomByteSource;

/// 1 MiB; bounds memory use and cancellation latency.
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 1024 * 1024;

#[derive(Debug)]
pub enum WriteOutcome {
    Completed,
    /// Cancellation was observed before a chunk; the partial file stays on disk.
    Cancelled,
    Failed(GenerationError),
}

/// Writes `total_bytes` of random data to `path` in chunks of at most `chunk_size_bytes`.
///
/// `cancel` is checked before every chunk. `on_chunk_written` receives the size of each
/// chunk after it was written, so the caller's totals only ever count whole chunks.
pub fn write_file(
    path: &Path,
    total_bytes: u64,
    chunk_size_bytes: u64,
    source: &mut dyn RandomByteSource,
    cancel: &CancellationToken,
    mut on_chunk_written: impl FnMut(u64),
) -> WriteOutcome {
    if chunk_size_bytes == 0 {
        return WriteOutcome::Failed(GenerationError::Validation(
            "chunk size must be greater than 0 bytes".into(),
        ));
    }

    let mut file = match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
    {
        Ok(f) => f,
        Err(e) => return WriteOutcome::Failed(GenerationError::io("creating", path, e)),
    };

    let buf_len = chunk_size_bytes.min(total_bytes) as usize;
    let mut buffer = vec![0u8; buf_len];
    let mut written: u64 = 0;

    while written < total_bytes {
        if cancel.is_cancelled() {
            tracing::debug!(path = %path.display(), written, "write cancelled");
            return WriteOutcome::Cancelled;
        }
        let len = chunk_size_bytes.min(total_bytes - written) as usize;
        let chunk = &mut buffer[..len];
        source.fill(chunk);
        if let Err(e) = file.write_all(chunk) {
            return WriteOutcome::Failed(GenerationError::io("writing", path, e));
        }
        written += len as u64;
        tracing::trace!(path = %path.display(), written, "chunk written");
        on_chunk_written(len as u64);
    }

    // Delayed-allocation filesystems may only report a full disk here.
    if let Err(e) = file.sync_all() {
        return WriteOutcome::Failed(GenerationError::io("syncing", path, e));
    }
    WriteOutcome::Completed
}
