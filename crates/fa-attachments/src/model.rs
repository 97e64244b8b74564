//! Attachment records
//!
//! The host application owns the persistence lifecycle; these types
//! carry the fields the storage layer needs to place a file remotely
//! and the explicit update-transaction state that replaces the host's
//! implicit dirty tracking.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fa_core::Identifier;
use serde::{Deserialize, Serialize};

/// Anything the storage layer can place on the remote server.
pub trait StoredRecord {
    /// The record's own identifier.
    fn identifier(&self) -> &Identifier;

    /// Filename as uploaded.
    fn filename(&self) -> &str;

    /// Path prefix under the base upload directory, e.g. the table name.
    fn path_prefix(&self) -> &str;

    /// Identifier whose partition directory the file lives under.
    /// Thumbnail-style records override this so variants share their
    /// parent's directory.
    fn partition_identifier(&self) -> &Identifier {
        self.identifier()
    }

    /// Local file waiting to be uploaded, if a save was requested.
    fn pending_upload(&self) -> Option<&Path> {
        None
    }

    /// Consume the pending-upload marker after a successful store.
    fn clear_pending_upload(&mut self) {}
}

/// An attachment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Record identifier
    pub identifier: Identifier,
    /// Original filename
    pub filename: String,
    /// Path prefix under the base upload directory
    pub path_prefix: String,
    /// MIME content type
    pub content_type: String,
    /// File size in bytes
    pub filesize: i64,
    /// Local file awaiting upload; set when the host requested a save
    #[serde(skip)]
    pub pending_upload: Option<PathBuf>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Attachment {
    /// Create a new attachment record. The content type is guessed from
    /// the filename.
    pub fn new(
        identifier: impl Into<Identifier>,
        path_prefix: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        let now = Utc::now();

        Self {
            identifier: identifier.into(),
            filename,
            path_prefix: path_prefix.into(),
            content_type,
            filesize: 0,
            pending_upload: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_filesize(mut self, filesize: i64) -> Self {
        self.filesize = filesize;
        self
    }

    /// Mark a local file for upload on the next save.
    pub fn with_pending_upload(mut self, local: impl Into<PathBuf>) -> Self {
        self.pending_upload = Some(local.into());
        self
    }

    /// Begin an update cycle, capturing the current filename so a later
    /// rename hook can compare against it.
    pub fn begin_update(&self) -> AttachmentUpdate {
        AttachmentUpdate {
            old_filename: self.filename.clone(),
            new_filename: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        if !self.filename.contains('.') {
            return None;
        }
        self.filename
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && ext.len() <= 10)
    }
}

impl StoredRecord for Attachment {
    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    fn pending_upload(&self) -> Option<&Path> {
        self.pending_upload.as_deref()
    }

    fn clear_pending_upload(&mut self) {
        self.pending_upload = None;
    }
}

/// Explicit state for one update cycle.
///
/// Captures the pre-update filename when the cycle begins; the rename
/// hook fires only when the filename actually changed. Consumed by
/// [`AttachmentUpdate::commit`], so the captured name cannot leak into a
/// later cycle.
#[derive(Debug, Clone)]
pub struct AttachmentUpdate {
    old_filename: String,
    new_filename: Option<String>,
}

impl AttachmentUpdate {
    /// Record the filename this update will apply.
    pub fn rename_to(&mut self, filename: impl Into<String>) {
        self.new_filename = Some(filename.into());
    }

    pub fn old_filename(&self) -> &str {
        &self.old_filename
    }

    /// The filename after this update, falling back to the old one when
    /// no rename was requested.
    pub fn new_filename(&self) -> &str {
        self.new_filename.as_deref().unwrap_or(&self.old_filename)
    }

    /// Whether the filename differs from the one captured at the start
    /// of the cycle.
    pub fn filename_changed(&self) -> bool {
        match &self.new_filename {
            Some(new) => new != &self.old_filename,
            None => false,
        }
    }

    /// Apply the update to the record, consuming the transaction.
    pub fn commit(self, attachment: &mut Attachment) {
        if let Some(new) = self.new_filename {
            attachment.filename = new;
        }
        attachment.updated_at = Utc::now();
    }
}

/// A thumbnail variant of an attachment.
///
/// Stored under the parent's partition directory with a suffixed
/// filename, so all variants of one attachment live side by side.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub attachment: Attachment,
    pub parent_identifier: Identifier,
}

impl Thumbnail {
    pub fn new(identifier: impl Into<Identifier>, parent: &Attachment, suffix: &str) -> Self {
        let mut attachment = Attachment::new(
            identifier,
            parent.path_prefix.clone(),
            thumbnail_filename(&parent.filename, suffix),
        );
        attachment.content_type = parent.content_type.clone();

        Self {
            attachment,
            parent_identifier: parent.identifier.clone(),
        }
    }
}

impl StoredRecord for Thumbnail {
    fn identifier(&self) -> &Identifier {
        &self.attachment.identifier
    }

    fn filename(&self) -> &str {
        &self.attachment.filename
    }

    fn path_prefix(&self) -> &str {
        &self.attachment.path_prefix
    }

    fn partition_identifier(&self) -> &Identifier {
        &self.parent_identifier
    }

    fn pending_upload(&self) -> Option<&Path> {
        self.attachment.pending_upload.as_deref()
    }

    fn clear_pending_upload(&mut self) {
        self.attachment.pending_upload = None;
    }
}

/// Insert a thumbnail suffix before the file extension:
/// `photo.png` + `thumb` → `photo_thumb.png`.
pub fn thumbnail_filename(filename: &str, suffix: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", filename, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_guesses_content_type() {
        let attachment = Attachment::new(1i64, "photos", "beach.png");
        assert_eq!(attachment.content_type, "image/png");
        assert!(attachment.is_image());
    }

    #[test]
    fn test_attachment_content_type_override() {
        let attachment =
            Attachment::new(1i64, "files", "data.bin").with_content_type("application/pdf");
        assert_eq!(attachment.content_type, "application/pdf");
    }

    #[test]
    fn test_extension() {
        let pdf = Attachment::new(1i64, "files", "report.pdf");
        assert_eq!(pdf.extension(), Some("pdf"));

        let no_ext = Attachment::new(1i64, "files", "noextension");
        assert_eq!(no_ext.extension(), None);

        let double = Attachment::new(1i64, "files", "archive.tar.gz");
        assert_eq!(double.extension(), Some("gz"));
    }

    #[test]
    fn test_thumbnail_filename() {
        assert_eq!(thumbnail_filename("photo.png", "thumb"), "photo_thumb.png");
        assert_eq!(thumbnail_filename("archive.tar.gz", "small"), "archive.tar_small.gz");
        assert_eq!(thumbnail_filename("noext", "thumb"), "noext_thumb");
        assert_eq!(thumbnail_filename(".hidden", "thumb"), ".hidden_thumb");
    }

    #[test]
    fn test_update_unchanged_filename() {
        let attachment = Attachment::new(1i64, "photos", "beach.png");
        let update = attachment.begin_update();
        assert!(!update.filename_changed());

        let mut update = attachment.begin_update();
        update.rename_to("beach.png");
        assert!(!update.filename_changed());
    }

    #[test]
    fn test_update_changed_filename() {
        let attachment = Attachment::new(1i64, "photos", "beach.png");
        let mut update = attachment.begin_update();
        update.rename_to("sunset.png");

        assert!(update.filename_changed());
        assert_eq!(update.old_filename(), "beach.png");
        assert_eq!(update.new_filename(), "sunset.png");
    }

    #[test]
    fn test_update_commit_applies_filename() {
        let mut attachment = Attachment::new(1i64, "photos", "beach.png");
        let mut update = attachment.begin_update();
        update.rename_to("sunset.png");

        update.commit(&mut attachment);
        assert_eq!(attachment.filename, "sunset.png");
    }

    #[test]
    fn test_thumbnail_shares_parent_partition() {
        let parent = Attachment::new(42i64, "photos", "beach.png");
        let thumb = Thumbnail::new(43i64, &parent, "thumb");

        assert_eq!(thumb.filename(), "beach_thumb.png");
        assert_eq!(thumb.partition_identifier(), parent.identifier());
        assert_ne!(thumb.identifier(), parent.identifier());
        assert_eq!(thumb.attachment.content_type, "image/png");
    }

    #[test]
    fn test_pending_upload_marker() {
        let mut attachment =
            Attachment::new(1i64, "photos", "beach.png").with_pending_upload("/tmp/up-1");
        assert!(StoredRecord::pending_upload(&attachment).is_some());

        attachment.clear_pending_upload();
        assert!(StoredRecord::pending_upload(&attachment).is_none());
    }
}
