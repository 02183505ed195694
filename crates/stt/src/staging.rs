use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    pin::pin,
};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};
use uuid::Uuid;

use crate::error::{Result, SttError};

/// Uploads are written through a buffer of this size (1 MiB)
pub(crate) const CHUNK_SIZE: usize = 1024 * 1024;

/// Directory where uploads are staged before they are forwarded
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Open the staging directory, creating it if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// Staging directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream an upload to a new staged file, enforcing `max_size` as bytes arrive
    ///
    /// The file is named `<uuid>.<extension>` so nothing from the client
    /// reaches the path. On any failure, including crossing `max_size`, the
    /// partial file is removed before the error is returned.
    pub(crate) async fn stage<S>(
        &self,
        upload: S,
        extension: &str,
        content_type: &str,
        max_size: u64,
    ) -> Result<StagedAudioFile>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{id}.{extension}"));

        let file = File::create(&path).await?;

        match write_bounded(file, upload, max_size).await {
            Ok(size) => {
                tracing::debug!(audio_id = %id, size, "staged audio file");

                Ok(StagedAudioFile {
                    id,
                    path,
                    size,
                    content_type: content_type.to_owned(),
                    removed: false,
                })
            }
            Err(error) => {
                match &error {
                    SttError::PayloadTooLarge { limit } => {
                        tracing::warn!(audio_id = %id, limit, "rejected audio file exceeding size limit");
                    }
                    other => {
                        tracing::warn!(audio_id = %id, category = other.category(), "failed to stage audio: {other}");
                    }
                }

                remove_path(&path).await;
                Err(error)
            }
        }
    }
}

/// Copy the stream into `file`, returning the byte count
///
/// The running total is checked before each chunk is written, so the file
/// never holds more than `max_size` bytes.
async fn write_bounded<S>(file: File, upload: S, max_size: u64) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>>,
{
    let mut upload = pin!(upload);
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut total: u64 = 0;

    while let Some(chunk) = upload.next().await {
        let chunk = chunk?;

        total = total.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
        if total > max_size {
            return Err(SttError::PayloadTooLarge { limit: max_size });
        }

        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;

    Ok(total)
}

/// An upload held on local disk for the duration of one request
///
/// Removal consumes the value, so each staged file is deleted at most once.
/// A value dropped without `remove` (a panicking or aborted relay task)
/// deletes its file on drop.
#[derive(Debug)]
pub struct StagedAudioFile {
    id: Uuid,
    path: PathBuf,
    size: u64,
    content_type: String,
    removed: bool,
}

impl StagedAudioFile {
    /// Random identifier that also names the file
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Location in the staging directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content type declared by the client
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Read the staged bytes back
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Delete the staged file
    ///
    /// Failures are logged, never raised: cleanup runs after the outcome of
    /// the request is already decided.
    pub async fn remove(mut self) {
        if remove_path(&self.path).await {
            tracing::debug!(audio_id = %self.id, "cleaned up staged audio file");
        }
        self.removed = true;
    }
}

impl Drop for StagedAudioFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::warn!(audio_id = %self.id, "removed staged audio file dropped without cleanup"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::error!(path = %self.path.display(), "failed to clean up staged audio file: {e}"),
        }
    }
}

async fn remove_path(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            tracing::error!(path = %path.display(), "failed to clean up staged audio file: {e}");
            false
        }
    }
}
