use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Sidecar file used for locking, `<path>.lock`. The document itself is replaced on every write,
/// so it can't carry the lock.
pub fn lock_path(path: &Path) -> PathBuf {
    with_suffix(path, ".lock")
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Runs `action` while holding a lock on the sidecar lock file of `path`.
pub fn with_file_lock<T, E>(
    path: &Path,
    mode: LockMode,
    action: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    let lock_file = File::options()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(path))?;

    // Semi-safe acquire-release for a file
    match mode {
        LockMode::Shared => FileExt::lock_shared(&lock_file)?,
        LockMode::Exclusive => FileExt::lock_exclusive(&lock_file)?,
    }
    let result = action();
    if let Err(e) = FileExt::unlock(&lock_file) {
        // The lock is released by the OS once the handle is dropped anyway.
        warn!("Failed to unlock {:?}: {e}", lock_path(path));
    }
    result
}

/// Replaces the contents of `path` without ever exposing a half written file. Data goes into a
/// temporary sibling first, which is then renamed over the destination.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp = temp_path(path);
    let write = || -> io::Result<()> {
        let mut file = File::create(&temp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp, path)
    };

    write().inspect_err(|_| {
        let _ = fs::remove_file(&temp);
    })
}
