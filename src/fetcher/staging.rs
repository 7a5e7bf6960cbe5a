use super::naming;
use super::verify::VerifyKind;
use crate::error::FetchError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, warn};

/// Upper bound on numeric suffixes tried before giving up on a name
const MAX_COLLISION_ATTEMPTS: u32 = 10_000;

/// A download in progress under a hidden temporary name in the output
/// directory. Dropping it removes the temporary file.
#[derive(Debug)]
pub(crate) struct StagedFile {
    path: PathBuf,
    final_name: String,
    kind: VerifyKind,
    bytes: u64,
}

impl StagedFile {
    pub async fn create(
        dir: &Path,
        final_name: String,
        kind: VerifyKind,
    ) -> Result<(Self, File), FetchError> {
        let path = dir.join(format!(".{}.{}.part", final_name, uuid::Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| FetchError::filesystem(&path, e))?;

        let staged = Self {
            path,
            final_name,
            kind,
            bytes: 0,
        };
        Ok((staged, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn final_name(&self) -> &str {
        &self.final_name
    }

    pub fn kind(&self) -> VerifyKind {
        self.kind
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn set_bytes(&mut self, bytes: u64) {
        self.bytes = bytes;
    }

    /// Move the staged bytes to the first free name in `dir`.
    ///
    /// A hard link fails instead of replacing an existing file, so a name
    /// taken by another writer is never overwritten. Filesystems without
    /// hard links fall back to check-then-rename.
    pub async fn commit(&self, dir: &Path) -> Result<PathBuf, FetchError> {
        for attempt in 0..MAX_COLLISION_ATTEMPTS {
            let target = dir.join(naming::candidate(&self.final_name, attempt));
            match fs::hard_link(&self.path, &target).await {
                Ok(()) => {
                    if let Err(e) = fs::remove_file(&self.path).await {
                        warn!("Failed to remove staging file {}: {}", self.path.display(), e);
                    }
                    return Ok(target);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    debug!("Hard link unavailable ({}), renaming instead", e);
                    let taken = fs::try_exists(&target)
                        .await
                        .map_err(|e| FetchError::filesystem(&target, e))?;
                    if taken {
                        continue;
                    }
                    fs::rename(&self.path, &target)
                        .await
                        .map_err(|e| FetchError::filesystem(&target, e))?;
                    return Ok(target);
                }
            }
        }

        Err(FetchError::filesystem(
            dir.join(&self.final_name),
            std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        ))
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Discarded staging file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to discard staging file {}: {}", self.path.display(), e),
        }
    }
}
