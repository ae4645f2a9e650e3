// Free space of the volume that holds a path

use std::path::{Path, PathBuf};

/// Reports free bytes on the volume holding a path. Unknown free space is reported as 0.
pub trait FreeSpaceProbe: Send + Sync {
    fn free_bytes(&self, path: &Path) -> u64;
}

/// First existing directory at or above `path`. `None` when the walk runs out of components.
pub fn nearest_existing_ancestor(path: &Path) -> Option<PathBuf> {
    let mut current = path;
    loop {
        if current.as_os_str().is_empty() {
            return None;
        }
        if current.exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Asks the OS about the filesystem of the path itself (statvfs on unix), so tmpfs,
/// bind and network mounts report their own headroom.
#[derive(Debug, Default)]
pub struct VolumeProbe {
    #[cfg(not(unix))]
    disks: std::sync::Mutex<Option<sysinfo::Disks>>,
}

impl VolumeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_free_bytes(&self, path: &Path) -> anyhow::Result<u64> {
        let Some(existing) = nearest_existing_ancestor(path) else {
            tracing::debug!(path = %path.display(), "no existing ancestor; reporting 0 free bytes");
            return Ok(0);
        };
        self.available_on(&existing)
    }

    #[cfg(unix)]
    fn available_on(&self, existing: &Path) -> anyhow::Result<u64> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(existing.as_os_str().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid path {}: {}", existing.display(), e))?;
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        // SAFETY: c_path is NUL-terminated and stat is a valid out-pointer for the call.
        if unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) } != 0 {
            return Err(anyhow::Error::new(std::io::Error::last_os_error())
                .context(format!("statvfs {}", existing.display())));
        }
        Ok((stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64))
    }

    #[cfg(not(unix))]
    fn available_on(&self, existing: &Path) -> anyhow::Result<u64> {
        let canonical = existing.canonicalize()?;
        let mut guard = self
            .disks
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
        let disks = guard.get_or_insert_with(sysinfo::Disks::new_with_refreshed_list);
        disks.refresh(false);

        // Drive letters are never nested here, so the containing root is the volume.
        disks
            .list()
            .iter()
            .filter(|d| canonical.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().components().count())
            .map(|d| d.available_space())
            .ok_or_else(|| anyhow::anyhow!("no mounted volume contains {}", canonical.display()))
    }
}

impl FreeSpaceProbe for VolumeProbe {
    fn free_bytes(&self, path: &Path) -> u64 {
        match self.try_free_bytes(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "free_bytes",
                    path = %path.display(),
                    "free space probe failed; treating as 0"
                );
                0
            }
        }
    }
}
