//! # fa-attachments
//!
//! FTP-backed attachment storage.
//!
//! ## Features
//!
//! - Deterministic identifier-to-path partitioning (bounded per-directory
//!   file counts)
//! - Remote storage abstraction with FTP and in-memory backends
//! - Attachment lifecycle operations: store, fetch, rename on update,
//!   delete on destroy
//! - Public read URLs with thumbnail variants
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use fa_attachments::{Attachment, AttachmentService, FtpStorage};
//! use fa_core::FtpConfig;
//!
//! let config = FtpConfig::from_yaml_file("config/ftp.yml", "production")?;
//! let storage = Arc::new(FtpStorage::new(config.clone()));
//! let service = AttachmentService::new(storage, config);
//!
//! let mut attachment = Attachment::new(42i64, "photos", "beach.png")
//!     .with_pending_upload("/tmp/upload-1234");
//! service.save(&mut attachment).await?;
//!
//! let url = service.public_url(&attachment, None)?;
//! ```

pub mod ftp;
pub mod model;
pub mod partition;
pub mod service;
pub mod storage;

pub use ftp::FtpStorage;
pub use model::{thumbnail_filename, Attachment, AttachmentUpdate, StoredRecord, Thumbnail};
pub use partition::{partition_segments, partitioned_path, RemotePath};
pub use service::{AttachmentError, AttachmentResult, AttachmentService};
pub use storage::{MemoryStorage, RemoteStorage, StorageError, StorageResult};
