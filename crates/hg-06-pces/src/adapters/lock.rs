//! # Directory Lock
//!
//! Uses `fs2` for an exclusive advisory lock so only one writer appends to a
//! PCES directory. Released on drop.

use crate::domain::{PcesError, PcesResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct DirectoryLock {
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    const LOCK_FILE: &'static str = "pces.lock";

    /// Acquire the lock without blocking.
    pub fn acquire(directory: &Path) -> PcesResult<Self> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join(Self::LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        if file.try_lock_exclusive().is_err() {
            return Err(PcesError::Locked(path));
        }
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.sync_all()?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
