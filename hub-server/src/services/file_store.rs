//! Upload storage
//!
//! Files are named by the SHA-256 of their content plus the normalized
//! extension, so uploading the same bytes twice yields the same reference.
//! References look like `{PUBLIC_BASE_URL}/api/files/{name}`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Accepted extensions
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "pdf", "zip"];

const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Path prefix under which stored files are served
pub const FILES_ROUTE: &str = "/api/files/";

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Empty file provided")]
    Empty,

    #[error("No filename provided")]
    NoFilename,

    #[error("Invalid file extension for: {0}")]
    InvalidExtension(String),

    #[error("Unsupported file format '{0}'. Supported: png, jpg, jpeg, webp, pdf, zip")]
    Unsupported(String),

    #[error("Invalid image file ({ext}): {reason}")]
    InvalidImage { ext: String, reason: String },

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FileStoreError> for AppError {
    fn from(err: FileStoreError) -> Self {
        let code = match &err {
            FileStoreError::TooLarge { .. } => ErrorCode::FileTooLarge,
            FileStoreError::Empty => ErrorCode::EmptyFile,
            FileStoreError::NoFilename => ErrorCode::NoFilename,
            FileStoreError::InvalidExtension(_) => ErrorCode::InvalidFileExtension,
            FileStoreError::Unsupported(_) => ErrorCode::UnsupportedFileFormat,
            FileStoreError::InvalidImage { .. } => ErrorCode::InvalidImageFile,
            FileStoreError::InvalidName(_) => ErrorCode::ValidationFailed,
            FileStoreError::NotFound(_) => ErrorCode::NotFound,
            FileStoreError::Io(_) => ErrorCode::FileStorageFailed,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Image,
    Document,
}

/// Result of a successful `put`
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// Content-addressed name, `{sha256}.{ext}`
    pub name: String,
    /// Public reference handed back to clients
    pub url: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
    pub kind: UploadKind,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Validate and store `bytes`, returning the stored reference
    async fn put(&self, bytes: Vec<u8>, original_name: &str) -> Result<StoredFile, FileStoreError>;
    /// Remove a stored file by reference; `false` when it is not ours or gone
    async fn delete(&self, reference: &str) -> Result<bool, FileStoreError>;
    /// Read a stored file by name, with its mime type
    async fn open(&self, name: &str) -> Result<(Vec<u8>, String), FileStoreError>;
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A stored name is a single path component without traversal
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.contains('\0')
}

/// Whether `name` carries one of the image extensions
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_FORMATS.contains(&ext.to_lowercase().as_str()))
}

/// Check size, extension and (for images) that the bytes decode.
///
/// Returns the normalized extension and the upload kind.
pub fn validate_upload(
    data: &[u8],
    original_name: &str,
    max_bytes: usize,
) -> Result<(String, UploadKind), FileStoreError> {
    if original_name.trim().is_empty() {
        return Err(FileStoreError::NoFilename);
    }
    if data.is_empty() {
        return Err(FileStoreError::Empty);
    }
    if data.len() > max_bytes {
        return Err(FileStoreError::TooLarge {
            size: data.len(),
            limit: max_bytes,
        });
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| FileStoreError::InvalidExtension(original_name.to_string()))?;

    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(FileStoreError::Unsupported(ext));
    }

    if !IMAGE_FORMATS.contains(&ext.as_str()) {
        return Ok((ext, UploadKind::Document));
    }

    image::load_from_memory(data).map_err(|e| FileStoreError::InvalidImage {
        ext: ext.clone(),
        reason: e.to_string(),
    })?;

    // jpeg and jpg are the same file
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    Ok((ext, UploadKind::Image))
}

/// Files under `WORK_DIR/uploads`
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    max_bytes: usize,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            max_bytes,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}{}{}", self.public_base_url, FILES_ROUTE, name)
    }

    /// Stored name behind a reference produced by this store
    pub fn name_of<'a>(&self, reference: &'a str) -> Option<&'a str> {
        let rest = reference.strip_prefix(self.public_base_url.as_str())?;
        let name = rest.strip_prefix(FILES_ROUTE)?;
        is_safe_name(name).then_some(name)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, bytes: Vec<u8>, original_name: &str) -> Result<StoredFile, FileStoreError> {
        let (ext, kind) = validate_upload(&bytes, original_name, self.max_bytes)?;

        let name = format!("{}.{}", calculate_hash(&bytes), ext);
        let path = self.root.join(&name);

        if tokio::fs::try_exists(&path).await? {
            tracing::info!(name = %name, "Upload deduplicated");
        } else {
            tokio::fs::create_dir_all(&self.root).await?;
            tokio::fs::write(&path, &bytes).await?;
            tracing::info!(name = %name, size = bytes.len(), "Upload stored");
        }

        Ok(StoredFile {
            url: self.url_for(&name),
            name,
            original_name: original_name.to_string(),
            size: bytes.len(),
            format: ext,
            kind,
        })
    }

    async fn delete(&self, reference: &str) -> Result<bool, FileStoreError> {
        let Some(name) = self.name_of(reference) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, name: &str) -> Result<(Vec<u8>, String), FileStoreError> {
        if !is_safe_name(name) {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        let bytes = match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FileStoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mime = mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((bytes, mime))
    }
}
