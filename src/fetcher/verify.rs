use crate::media::{MediaClass, RemoteObject};
use std::path::Path;

/// How a downloaded file is checked before it is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VerifyKind {
    Image,
    Raw,
    Video,
}

impl VerifyKind {
    pub fn of(object: &RemoteObject) -> Self {
        match object.class {
            MediaClass::Video => VerifyKind::Video,
            MediaClass::Image if object.is_raw() => VerifyKind::Raw,
            MediaClass::Image => VerifyKind::Image,
        }
    }
}

/// Check that the staged file at `path` holds a readable `kind`.
/// `name` is the final file name, used as a format hint.
pub(crate) async fn verify(path: &Path, name: &str, kind: VerifyKind, bytes: u64) -> Result<(), String> {
    if bytes == 0 {
        return Err("file is empty".to_string());
    }

    match kind {
        VerifyKind::Video => Ok(()),
        VerifyKind::Image | VerifyKind::Raw => {
            let path = path.to_path_buf();
            let name = name.to_string();
            tokio::task::spawn_blocking(move || decode(&path, &name, kind))
                .await
                .map_err(|e| format!("verification task failed: {}", e))?
        }
    }
}

#[cfg(feature = "verify")]
fn decode(path: &Path, name: &str, kind: VerifyKind) -> Result<(), String> {
    match kind {
        VerifyKind::Raw => rawloader::decode_file(path)
            .map(|_| ())
            .map_err(|e| raw_failure(name, &format!("{:?}", e))),
        _ => {
            let mut reader = image::io::Reader::open(path)
                .and_then(|reader| reader.with_guessed_format())
                .map_err(|e| e.to_string())?;
            if reader.format().is_none() {
                if let Some(format) = crate::media::extension(name).and_then(image::ImageFormat::from_extension) {
                    reader.set_format(format);
                }
            }
            if reader.format().is_none() {
                tracing::debug!("No decoder for {}, skipping verification", name);
                return Ok(());
            }
            reader
                .decode()
                .map(|_| ())
                .map_err(|e| format!("not a readable image: {}", e))
        }
    }
}

/// Describe a RAW the decoder refused. A model missing from rawloader's
/// camera table is not corruption and gets its own warning.
#[cfg(feature = "verify")]
pub(crate) fn raw_failure(name: &str, details: &str) -> String {
    if details.contains("Couldn't find camera") {
        tracing::warn!(
            "{}: camera model not supported by the RAW decoder ({}); set verify_downloads = false to sync it unchecked",
            name,
            details
        );
        format!("camera model not supported by the RAW decoder: {}", details)
    } else {
        format!("not a readable RAW file: {}", details)
    }
}

#[cfg(not(feature = "verify"))]
fn decode(_path: &Path, _name: &str, _kind: VerifyKind) -> Result<(), String> {
    Ok(())
}
