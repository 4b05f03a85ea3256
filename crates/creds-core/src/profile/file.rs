//! On-disk credentials file

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::codec::{parse, serialize};
use super::types::ProfileSet;
use crate::error::{CredsError, Result};

/// Credentials file handle.
///
/// Every operation reads the whole file and rewrites it wholesale.
/// `update` serializes concurrent read-modify-write cycles through an
/// advisory lock on a sidecar `<file>.lock`, and `save` replaces the file
/// through a temp file rename so a crash never leaves a half-written store.
/// A symlinked credentials file is written through to its target; the link
/// itself is left in place.
#[derive(Debug, Clone)]
pub struct ProfileFile {
    path: PathBuf,
}

impl ProfileFile {
    /// Create a handle for the credentials file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the credentials file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        sidecar(&self.path, ".lock")
    }

    /// File that actually holds the contents, following symlinks
    async fn target_path(&self) -> Result<PathBuf> {
        match tokio::fs::canonicalize(&self.path).await {
            Ok(target) => Ok(target),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the profile set. A missing file is an empty set.
    pub async fn load(&self) -> Result<ProfileSet> {
        if !self.path.exists() {
            debug!("No credentials file at {:?}, starting empty", self.path);
            return Ok(ProfileSet::new());
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;
        let set = parse(&contents)?;

        debug!("Loaded {} profiles from {:?}", set.len(), self.path);
        Ok(set)
    }

    /// Replace the file contents with the serialized profile set
    pub async fn save(&self, set: &ProfileSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serialize(set);

        let target = self.target_path().await?;
        let temp_path = sidecar(&target, ".tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        restrict_permissions(&temp_path).await?;
        tokio::fs::rename(&temp_path, &target).await?;

        debug!("Saved {} profiles to {:?}", set.len(), target);
        Ok(())
    }

    /// Run one locked load-modify-save cycle.
    ///
    /// Nothing is written when `modify` fails.
    pub async fn update<T, F>(&self, modify: F) -> Result<T>
    where
        F: FnOnce(&mut ProfileSet) -> Result<T>,
    {
        let _lock = self.acquire_lock().await?;

        let mut set = self.load().await?;
        let value = modify(&mut set)?;
        self.save(&set).await?;

        Ok(value)
    }

    async fn acquire_lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let lock_path = self.lock_path();
        let lock_file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = File::create(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| CredsError::Io(std::io::Error::other(e)))??;

        debug!("Acquired lock {:?}", self.lock_path());
        // Released when the returned file is dropped
        Ok(lock_file)
    }
}

/// `path` with `suffix` appended to its file name
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
