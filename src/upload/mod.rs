//! Identity-scoped file uploads

mod paths;

pub use paths::{is_safe_segment, sanitize_filename};

use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::auth::VerifiedIdentity;
use crate::error::{Error, Result};

/// URL prefix under which stored files are served
pub const PUBLIC_PREFIX: &str = "/images";

/// A file received from a client, not yet persisted
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content: Bytes,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Persists uploads under `base_dir/<identity>/<filename>`
#[derive(Debug, Clone)]
pub struct UploadGateway {
    base_dir: PathBuf,
}

impl UploadGateway {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Root directory that static serving must share
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where a file for `identity` lands on disk
    pub fn storage_path(&self, identity: &str, filename: &str) -> PathBuf {
        self.base_dir.join(identity).join(filename)
    }

    /// The path clients use to fetch a stored file, each segment percent-encoded
    pub fn retrieval_path(identity: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            PUBLIC_PREFIX,
            urlencoding::encode(identity),
            urlencoding::encode(filename)
        )
    }

    /// Store every file for `identity`, stopping at the first failure.
    ///
    /// Names are sanitized before anything is written, so a bad name rejects
    /// the whole batch. A write failure reports the failing file together with
    /// the paths already stored.
    pub async fn upload(
        &self,
        identity: &VerifiedIdentity,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<String>> {
        let identity = identity.username();
        if !is_safe_segment(identity) {
            return Err(Error::Validation(format!(
                "Identity '{}' cannot be used as a storage namespace",
                identity
            )));
        }

        if files.is_empty() {
            return Err(Error::BadRequest("No files provided".to_string()));
        }

        let files = files
            .into_iter()
            .map(|file| {
                sanitize_filename(&file.filename)
                    .map(|name| (name, file.content))
                    .ok_or_else(|| {
                        Error::BadRequest(format!("Invalid filename: '{}'", file.filename))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let dir = self.base_dir.join(identity);
        if let Err(source) = fs::create_dir_all(&dir).await {
            return Err(Error::Upload {
                filename: files[0].0.clone(),
                stored: Vec::new(),
                source,
            });
        }

        let mut stored = Vec::with_capacity(files.len());
        for (filename, content) in files {
            let destination = dir.join(&filename);
            if let Err(source) = write_atomic(&dir, &destination, &content).await {
                return Err(Error::Upload {
                    filename,
                    stored,
                    source,
                });
            }

            tracing::info!(identity = %identity, file = %filename, bytes = content.len(), "Stored upload");
            stored.push(Self::retrieval_path(identity, &filename));
        }

        Ok(stored)
    }
}

/// Write through a temporary file in the same directory, then rename over the target
async fn write_atomic(dir: &Path, destination: &Path, content: &[u8]) -> std::io::Result<()> {
    let temp = dir.join(format!(".{}.upload", Uuid::new_v4()));

    let result = match fs::write(&temp, content).await {
        Ok(()) => fs::rename(&temp, destination).await,
        Err(e) => Err(e),
    };

    if result.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    result
}
