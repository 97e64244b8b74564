//! Attachment lifecycle service
//!
//! The host application drives attachment lifecycles; this service
//! exposes the hooks it calls into: a save hook that uploads a pending
//! file, a before-update hook that renames the remote file when the
//! filename changed, an after-destroy hook that deletes best-effort,
//! and a public read URL.

use std::sync::Arc;

use fa_core::{ConfigError, FtpConfig};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::model::{thumbnail_filename, AttachmentUpdate, StoredRecord};
use crate::partition::{partition_segments, RemotePath};
use crate::storage::{RemoteStorage, StorageError};

/// Service errors
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// Attachment service
pub struct AttachmentService<S: RemoteStorage> {
    storage: Arc<S>,
    config: FtpConfig,
}

impl<S: RemoteStorage> AttachmentService<S> {
    pub fn new(storage: Arc<S>, config: FtpConfig) -> Self {
        Self { storage, config }
    }

    /// The remote path of a record's file: base upload path, record
    /// prefix, partition segments, filename.
    pub fn remote_path(&self, record: &impl StoredRecord) -> RemotePath {
        self.remote_path_for(record, record.filename())
    }

    fn remote_path_for(&self, record: &impl StoredRecord, filename: &str) -> RemotePath {
        let mut path = RemotePath::from_base(&self.config.base_upload_path);
        for segment in record.path_prefix().split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        for segment in
            partition_segments(self.config.partitioning, record.partition_identifier())
        {
            path.push(segment);
        }
        path.push(filename);
        path
    }

    /// Download the record's file into a local temporary file. The
    /// caller owns the handle; errors abort the read.
    #[instrument(skip(self, record), fields(filename = %record.filename()))]
    pub async fn fetch(&self, record: &impl StoredRecord) -> AttachmentResult<NamedTempFile> {
        let path = self.remote_path(record);
        Ok(self.storage.fetch(&path).await?)
    }

    /// The save hook. Uploads the pending local file, if any. Returns
    /// whether an upload happened: skipped entirely when no upload was
    /// requested or the configuration is read-only, with no remote call
    /// made. The pending marker is consumed on success.
    #[instrument(skip(self, record), fields(filename = %record.filename()))]
    pub async fn save<R: StoredRecord>(&self, record: &mut R) -> AttachmentResult<bool> {
        let local = match record.pending_upload() {
            Some(local) => local.to_path_buf(),
            None => {
                debug!("No upload pending, save skipped");
                return Ok(false);
            }
        };

        if self.config.read_only {
            info!("Storage is read-only, save skipped");
            return Ok(false);
        }

        let path = self.remote_path(record);
        self.storage.store(&local, &path).await?;
        record.clear_pending_upload();

        info!(path = %path, "Attachment stored");
        Ok(true)
    }

    /// The before-update hook. Moves the remote file from the old
    /// filename's path to the new one. A no-op when the filename did not
    /// change or the configuration is read-only.
    #[instrument(skip(self, record, update), fields(old = %update.old_filename(), new = %update.new_filename()))]
    pub async fn before_update(
        &self,
        record: &impl StoredRecord,
        update: &AttachmentUpdate,
    ) -> AttachmentResult<()> {
        if !update.filename_changed() {
            debug!("Filename unchanged, rename skipped");
            return Ok(());
        }

        if self.config.read_only {
            info!("Storage is read-only, rename skipped");
            return Ok(());
        }

        let from = self.remote_path_for(record, update.old_filename());
        let to = self.remote_path_for(record, update.new_filename());
        self.storage.rename(&from, &to).await?;

        info!(from = %from, to = %to, "Attachment renamed");
        Ok(())
    }

    /// The after-destroy hook. Best-effort delete: a missing remote file
    /// or any other storage failure is logged and swallowed.
    #[instrument(skip(self, record), fields(filename = %record.filename()))]
    pub async fn after_destroy(&self, record: &impl StoredRecord) {
        let path = self.remote_path(record);
        match self.storage.delete(&path).await {
            Ok(()) => debug!(path = %path, "Attachment deleted"),
            Err(e) => warn!(path = %path, error = %e, "Delete failed, ignoring"),
        }
    }

    /// Public read URL for the record's file, or for a thumbnail variant
    /// when a suffix is given.
    pub fn public_url(
        &self,
        record: &impl StoredRecord,
        thumbnail: Option<&str>,
    ) -> AttachmentResult<String> {
        let base = self.config.base_url()?;
        let filename = match thumbnail {
            Some(suffix) => thumbnail_filename(record.filename(), suffix),
            None => record.filename().to_string(),
        };

        let path = self.remote_path_for(record, &filename).to_string();
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
