use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use super::types::{Conversation, FilePatch, Prompt, Rating};

/// File extensions the server knows how to parse.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx"];

/// Errors that can occur while talking to the file chat server.
/// The shell logs these and moves on; nothing is retried.
#[derive(Debug)]
pub enum BackendError {
    /// Backend misconfigured (bad base URL).
    Config(String),
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// Server answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body did not match the expected shape.
    Parse(String),
    /// A file selected for upload could not be read.
    Io(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// One file's worth of multipart upload content.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSource {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    /// Read a file from disk into memory, keeping only its file name.
    pub async fn read(path: &Path) -> Result<Self, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::Io(format!("{}: {e}", path.display())))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BackendError::Io(format!("{}: not a file", path.display())))?;
        Ok(Self { filename, bytes })
    }

    /// Read every path concurrently; the first failure aborts the whole batch.
    pub async fn read_all(paths: &[std::path::PathBuf]) -> Result<Vec<Self>, BackendError> {
        futures::future::try_join_all(paths.iter().map(|p| Self::read(p))).await
    }

    /// MIME type the server expects for this file's extension.
    pub fn mime_type(&self) -> &'static str {
        match extension(Path::new(&self.filename)).as_deref() {
            Some("csv") => "text/csv",
            Some("xls") => "application/vnd.ms-excel",
            Some("xlsx") => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            _ => "application/octet-stream",
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// True if the file picker should offer this path for upload.
pub fn is_accepted_upload(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Every server round trip the client makes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns a short label for logs.
    fn name(&self) -> &str;

    async fn list_conversations(&self) -> Result<Vec<Conversation>, BackendError>;

    /// Upload a batch of files, creating a new conversation around them.
    async fn upload_files(
        &self,
        files: &[UploadSource],
        title: Option<&str>,
    ) -> Result<Conversation, BackendError>;

    async fn send_chat(&self, conversation_id: i64, message: &str)
    -> Result<Prompt, BackendError>;

    async fn rate_prompt(&self, prompt_id: i64, rating: Rating) -> Result<(), BackendError>;

    async fn update_file(&self, file_id: i64, patch: &FilePatch) -> Result<(), BackendError>;
}
