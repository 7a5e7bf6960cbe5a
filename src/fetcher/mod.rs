//! Downloads logical media items into the output directory.
//!
//! Every constituent is streamed into a hidden staging file, optionally
//! verified, and only then moved to its final name. A failure on any
//! constituent discards the whole item, including files already committed
//! for it, so nothing is ever half-present under a final name.

mod naming;
mod staging;
mod verify;

use crate::camera::{Camera, CameraClient};
use crate::config::CamdumpConfig;
use crate::error::FetchError;
use crate::media::{file_name_from_url, replace_url_extension, LogicalMediaItem, MediaKind};
use staging::StagedFile;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use verify::VerifyKind;

/// Proof that an item's bytes are durably stored locally. Only the fetcher
/// creates these, and deletion requires one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReceipt {
    files: Vec<PathBuf>,
    bytes: u64,
}

impl FetchReceipt {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    #[cfg(test)]
    pub(crate) fn stub(files: Vec<PathBuf>) -> Self {
        Self { files, bytes: 0 }
    }
}

pub struct MediaFetcher {
    output_dir: PathBuf,
    raw_sibling_extension: Option<String>,
    verify: bool,
}

impl MediaFetcher {
    pub fn new<P: Into<PathBuf>>(
        output_dir: P,
        raw_sibling_extension: Option<String>,
        verify: bool,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            raw_sibling_extension,
            verify,
        }
    }

    pub fn from_config(config: &CamdumpConfig) -> Self {
        Self::new(
            config.output_dir(),
            config.sync.raw_sibling_extension().map(str::to_string),
            config.sync.verify_downloads,
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download every constituent of `item`, then commit them together
    pub async fn fetch(
        &self,
        camera: &Camera,
        item: &LogicalMediaItem,
    ) -> Result<FetchReceipt, FetchError> {
        let client = camera.client();
        let mut staged = Vec::with_capacity(item.constituents().len() + 1);

        for object in item.constituents() {
            let resource = object
                .primary_resource()
                .ok_or_else(|| FetchError::NoResource {
                    object_id: object.id.clone(),
                })?;
            let name = naming::file_name_for(object, resource);
            staged.push(
                self.stage(client, &resource.uri, name, VerifyKind::of(object))
                    .await?,
            );
        }

        if let Some(url) = self.raw_sibling_url(item) {
            let name = naming::file_name_for_url(&url, file_name_from_url(&url), item.key());
            match self.stage(client, &url, name, VerifyKind::Raw).await {
                Ok(file) => {
                    debug!("Found unlisted RAW sibling {}", url);
                    staged.push(file);
                }
                Err(e) if e.is_status() => debug!("No RAW sibling for {}: {}", item, e),
                Err(e) => return Err(e),
            }
        }

        if self.verify {
            for file in &staged {
                verify::verify(file.path(), file.final_name(), file.kind(), file.bytes())
                    .await
                    .map_err(|details| FetchError::Verification {
                        file: file.final_name().to_string(),
                        details,
                    })?;
            }
        }

        let mut committed = Vec::with_capacity(staged.len());
        for file in &staged {
            match file.commit(&self.output_dir).await {
                Ok(path) => committed.push(path),
                Err(e) => {
                    rollback(&committed).await;
                    return Err(e);
                }
            }
        }

        let bytes: u64 = staged.iter().map(StagedFile::bytes).sum();
        info!(
            "Saved {} ({} file(s), {} bytes)",
            item,
            committed.len(),
            bytes
        );
        Ok(FetchReceipt {
            files: committed,
            bytes,
        })
    }

    async fn stage(
        &self,
        client: &dyn CameraClient,
        url: &str,
        name: String,
        kind: VerifyKind,
    ) -> Result<StagedFile, FetchError> {
        let (mut staged, mut file) = StagedFile::create(&self.output_dir, name, kind).await?;
        debug!("Downloading {} -> {}", url, staged.path().display());

        let bytes = match client.download(url, &mut file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(file);
                return Err(e);
            }
        };

        let flushed = match file.flush().await {
            Ok(()) => file.sync_all().await,
            Err(e) => Err(e),
        };
        flushed.map_err(|e| FetchError::filesystem(staged.path(), e))?;
        drop(file);

        staged.set_bytes(bytes);
        Ok(staged)
    }

    /// URL of a possible unlisted RAW twin for a JPEG-only photo
    fn raw_sibling_url(&self, item: &LogicalMediaItem) -> Option<String> {
        let extension = self.raw_sibling_extension.as_deref()?;
        if item.kind() != MediaKind::Photo || item.has_raw() {
            return None;
        }
        let jpeg = item.jpeg()?.primary_resource()?;
        replace_url_extension(&jpeg.uri, extension).filter(|url| *url != jpeg.uri)
    }
}

async fn rollback(committed: &[PathBuf]) {
    for path in committed {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Failed to roll back {}: {}", path.display(), e);
        }
    }
}
