//! File bucket for avatar images.
//!
//! Files live flat in one directory, named by their file id. URLs handed out follow
//! `{public_base_url}/files/{file_id}/preview?...` and `.../download`, so the id is
//! always the second-to-last path segment (see [`file_id_from_url`]).

use crate::{
    config::settings::StorageConfig,
    core::new_document_id,
    errors::{Error, Result},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Preview width and height when the caller does not ask for a size
pub const DEFAULT_PREVIEW_SIZE: u32 = 2000;

const PREVIEW_QUALITY: u32 = 100;

/// What an upload returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Id to store or delete the file by
    pub file_id: String,
    /// Preview URL at the default size
    pub url: String,
}

/// A directory-backed bucket
#[derive(Debug, Clone)]
pub struct FileBucket {
    root: PathBuf,
    public_base_url: String,
    max_file_size: u64,
    allowed_types: Vec<String>,
}

fn require_file_id(file_id: &str) -> Result<()> {
    let valid = !file_id.is_empty()
        && file_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage {
            message: format!("Invalid file ID: {file_id:?}"),
        })
    }
}

impl FileBucket {
    /// Builds a bucket from the `[storage]` settings.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            root: config.bucket_dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_file_size: config.max_file_size,
            allowed_types: config.allowed_types.clone(),
        }
    }

    /// Directory the files are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, file_id: &str) -> PathBuf {
        self.root.join(file_id)
    }

    /// Checks an upload against the size and type limits without storing it.
    pub fn validate(&self, content_type: &str, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(Error::Storage {
                message: "No file provided".to_string(),
            });
        }

        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return Err(Error::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        let content_type = content_type.trim().to_ascii_lowercase();
        if !self.allowed_types.iter().any(|t| *t == content_type) {
            return Err(Error::UnsupportedFileType { content_type });
        }
        Ok(())
    }

    /// Stores a new file under a fresh id.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, content_type: &str, bytes: &[u8]) -> Result<UploadedFile> {
        self.validate(content_type, bytes)?;

        let file_id = new_document_id();
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path_of(&file_id), bytes).await?;
        info!("Stored file {file_id}");

        let url = self.preview_url(&file_id, DEFAULT_PREVIEW_SIZE, DEFAULT_PREVIEW_SIZE)?;
        Ok(UploadedFile { file_id, url })
    }

    /// Removes a stored file.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        require_file_id(file_id)?;
        match tokio::fs::remove_file(self.path_of(file_id)).await {
            Ok(()) => {
                debug!("Deleted file {file_id}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Storage {
                message: format!("File not found: {file_id}"),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a file with this id is stored.
    pub async fn exists(&self, file_id: &str) -> Result<bool> {
        require_file_id(file_id)?;
        Ok(tokio::fs::try_exists(self.path_of(file_id)).await?)
    }

    /// Reads a stored file back.
    pub async fn read(&self, file_id: &str) -> Result<Vec<u8>> {
        require_file_id(file_id)?;
        Ok(tokio::fs::read(self.path_of(file_id)).await?)
    }

    /// Preview URL for a stored file at the given size.
    pub fn preview_url(&self, file_id: &str, width: u32, height: u32) -> Result<String> {
        require_file_id(file_id)?;
        Ok(format!(
            "{}/files/{file_id}/preview?width={width}&height={height}&quality={PREVIEW_QUALITY}",
            self.public_base_url
        ))
    }

    /// Download URL for a stored file.
    pub fn download_url(&self, file_id: &str) -> Result<String> {
        require_file_id(file_id)?;
        Ok(format!("{}/files/{file_id}/download", self.public_base_url))
    }
}

/// Extracts the file id from a preview or download URL.
#[must_use]
pub fn file_id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mut segments = path.trim_end_matches('/').rsplit('/');
    segments.next()?;
    segments.next().filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_file_id_from_url() {
        assert_eq!(
            file_id_from_url("https://files.example.org/buckets/avatars/files/abc123/preview?width=2000&height=2000"),
            Some("abc123")
        );
        assert_eq!(
            file_id_from_url("https://files.example.org/buckets/avatars/files/abc123/download"),
            Some("abc123")
        );
        assert_eq!(file_id_from_url("avatar.png"), None);
    }

    #[test]
    fn test_validate_limits() {
        let bucket = test_bucket("validate").unwrap();

        assert!(bucket.validate("image/png", PNG_BYTES).is_ok());
        assert!(bucket.validate("IMAGE/WEBP", PNG_BYTES).is_ok());
        assert!(matches!(
            bucket.validate("image/png", &[]),
            Err(Error::Storage { .. })
        ));
        assert!(matches!(
            bucket.validate("application/pdf", PNG_BYTES),
            Err(Error::UnsupportedFileType { .. })
        ));

        let oversized = vec![0_u8; 10 * 1024 * 1024 + 1];
        assert!(matches!(
            bucket.validate("image/jpeg", &oversized),
            Err(Error::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_urls() {
        let bucket = test_bucket("urls").unwrap();
        assert_eq!(
            bucket.preview_url("f1", 400, 300).unwrap(),
            "http://bucket.test/files/f1/preview?width=400&height=300&quality=100"
        );
        assert_eq!(
            bucket.download_url("f1").unwrap(),
            "http://bucket.test/files/f1/download"
        );
        assert!(bucket.download_url("").is_err());
        assert!(bucket.preview_url("../etc", 1, 1).is_err());
    }

    #[tokio::test]
    async fn test_upload_and_delete() -> Result<()> {
        let bucket = test_bucket("upload")?;

        let uploaded = bucket.upload("image/png", PNG_BYTES).await?;
        assert_eq!(file_id_from_url(&uploaded.url), Some(uploaded.file_id.as_str()));
        assert!(bucket.exists(&uploaded.file_id).await?);
        assert_eq!(bucket.read(&uploaded.file_id).await?, PNG_BYTES);

        bucket.delete(&uploaded.file_id).await?;
        assert!(!bucket.exists(&uploaded.file_id).await?);
        assert!(matches!(
            bucket.delete(&uploaded.file_id).await,
            Err(Error::Storage { .. })
        ));
        Ok(())
    }
}
