//! FTP storage backend
//!
//! Every operation opens a fresh session: connect, login, switch to
//! binary transfers, run the single command, close. There is no
//! pooling, retry, or timeout; a slow transfer blocks its call. The
//! client is blocking, so each operation runs on the tokio blocking
//! pool.

use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fa_core::FtpConfig;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::partition::RemotePath;
use crate::storage::{RemoteStorage, StorageError, StorageResult};

/// FTP-backed remote storage.
pub struct FtpStorage {
    config: FtpConfig,
}

impl FtpStorage {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }
}

/// One logged-in FTP session. Quit is issued on drop, so the control
/// connection is closed on every exit path.
struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    fn open(config: &FtpConfig) -> StorageResult<Self> {
        let addr = format!("{}:{}", config.server, config.port);
        let mut stream = FtpStream::connect(&addr)
            .map_err(|e| StorageError::Connection(format!("{}: {}", addr, e)))?;

        stream
            .login(&config.login, &config.password)
            .map_err(|e| StorageError::Connection(format!("login failed: {}", e)))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| StorageError::Protocol(e.to_string()))?;

        Ok(Self { stream })
    }

    /// Best-effort recursive directory creation. An existing directory
    /// is not a failure, so every error is ignored.
    fn ensure_directories(&mut self, path: &RemotePath) {
        for ancestor in path.ancestors() {
            let _ = self.stream.mkdir(ancestor.to_string());
        }
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        let _ = self.stream.quit();
    }
}

fn map_ftp_error(path: &RemotePath, err: FtpError) -> StorageError {
    match err {
        FtpError::UnexpectedResponse(ref response)
            if response.status == Status::FileUnavailable =>
        {
            StorageError::NotFound(path.to_string())
        }
        FtpError::ConnectionError(io) => StorageError::Connection(io.to_string()),
        other => StorageError::Protocol(other.to_string()),
    }
}

async fn run_blocking<T, F>(op: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StorageResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

#[async_trait]
impl RemoteStorage for FtpStorage {
    #[instrument(skip(self), fields(storage = "ftp", path = %path))]
    async fn fetch(&self, path: &RemotePath) -> StorageResult<NamedTempFile> {
        let config = self.config.clone();
        let path = path.clone();

        run_blocking(move || {
            let mut session = FtpSession::open(&config)?;
            let buffer = session
                .stream
                .retr_as_buffer(&path.to_string())
                .map_err(|e| map_ftp_error(&path, e))?;

            let mut file = NamedTempFile::new()?;
            file.write_all(buffer.get_ref())?;
            file.flush()?;
            file.rewind()?;

            debug!(bytes = buffer.get_ref().len(), "Remote file fetched");
            Ok(file)
        })
        .await
    }

    #[instrument(skip(self, local), fields(storage = "ftp", path = %path))]
    async fn store(&self, local: &Path, path: &RemotePath) -> StorageResult<()> {
        let config = self.config.clone();
        let path = path.clone();
        let local: PathBuf = local.to_path_buf();

        run_blocking(move || {
            let mut session = FtpSession::open(&config)?;
            session.ensure_directories(&path);

            let mut file = std::fs::File::open(&local)?;
            session
                .stream
                .put_file(path.to_string(), &mut file)
                .map_err(|e| map_ftp_error(&path, e))?;

            debug!("Remote file stored");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(storage = "ftp", from = %from, to = %to))]
    async fn rename(&self, from: &RemotePath, to: &RemotePath) -> StorageResult<()> {
        let config = self.config.clone();
        let from = from.clone();
        let to = to.clone();

        run_blocking(move || {
            let mut session = FtpSession::open(&config)?;
            session
                .stream
                .rename(from.to_string(), to.to_string())
                .map_err(|e| map_ftp_error(&from, e))?;

            debug!("Remote file renamed");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(storage = "ftp", path = %path))]
    async fn delete(&self, path: &RemotePath) -> StorageResult<()> {
        let config = self.config.clone();
        let path = path.clone();

        run_blocking(move || {
            let mut session = FtpSession::open(&config)?;
            session
                .stream
                .rm(path.to_string())
                .map_err(|e| map_ftp_error(&path, e))?;

            debug!("Remote file deleted");
            Ok(())
        })
        .await
    }

    fn name(&self) -> &str {
        "ftp"
    }
}
