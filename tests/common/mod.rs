// Shared test helpers: free-space fakes and directory inspection

#![allow(dead_code)]

use junkgen::disk_repo::FreeSpaceProbe;
use junkgen::namer::FILE_PREFIX;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Always reports the same free space.
pub struct FixedProbe(pub u64);

impl FreeSpaceProbe for FixedProbe {
    fn free_bytes(&self, _path: &Path) -> u64 {
        self.0
    }
}

/// Starts at `initial` and shrinks by exactly the bytes of junk files present in `dir`.
pub struct ShrinkingProbe {
    pub initial: u64,
    pub dir: PathBuf,
}

impl FreeSpaceProbe for ShrinkingProbe {
    fn free_bytes(&self, _path: &Path) -> u64 {
        self.initial.saturating_sub(junk_bytes(&self.dir))
    }
}

/// Fixed free space, but every probe takes `delay` (stretches a run for cancellation tests).
pub struct SlowProbe {
    pub free: u64,
    pub delay: Duration,
}

impl FreeSpaceProbe for SlowProbe {
    fn free_bytes(&self, _path: &Path) -> u64 {
        std::thread::sleep(self.delay);
        self.free
    }
}

/// Reports `free` for the first `answers` calls, then panics (kills the worker mid-run).
pub struct PanickingSpace {
    pub free: u64,
    pub answers: usize,
    pub calls: AtomicUsize,
}

impl PanickingSpace {
    pub fn new(free: u64, answers: usize) -> Self {
        Self {
            free,
            answers,
            calls: AtomicUsize::new(0),
        }
    }
}

impl FreeSpaceProbe for PanickingSpace {
    fn free_bytes(&self, _path: &Path) -> u64 {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.answers {
            panic!("free space query exploded");
        }
        self.free
    }
}

/// Sorted (name, size) of every `JunkFile_*` in `dir`.
pub fn junk_files(dir: &Path) -> Vec<(String, u64)> {
    let mut files: Vec<(String, u64)> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if !name.starts_with(FILE_PREFIX) {
                return None;
            }
            let size = e.metadata().ok()?.len();
            Some((name, size))
        })
        .collect();
    files.sort();
    files
}

pub fn junk_bytes(dir: &Path) -> u64 {
    junk_files(dir).iter().map(|(_, size)| size).sum()
}
