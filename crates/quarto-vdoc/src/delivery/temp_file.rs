//! On-disk delivery through per-extension temp files.
//!
//! Language services that only resolve real files get the virtual document
//! as `<tempdir>/<ext>/intellisense.<ext>`. The temp directory is created on
//! first use and lives as long as the backend.
//!
//! With [`TempFileNaming::Shared`] every acquisition for an extension reuses
//! one path, so a disposal can delete a file that a newer, still running
//! request has just written. Only the latest cursor position matters and
//! keystrokes throttle requests, so this is accepted; [`TempFileNaming::PerRequest`]
//! gives each acquisition its own file instead.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use url::Url;

use super::{Release, VirtualDocumentDelivery, VirtualDocumentHandle};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::host::EditorHost;
use crate::languages::DeliveryStrategy;
use crate::vdoc::VirtualDocument;

const FILE_STEM: &str = "intellisense";
const TEMP_DIR_PREFIX: &str = "quarto-vdoc-";

/// How temp files are named within an extension directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TempFileNaming {
    /// One `intellisense.<ext>` per extension, reused by every request.
    #[default]
    Shared,
    /// `intellisense-<n>.<ext>`, unique per acquisition.
    PerRequest,
}

pub struct TempFileBackend {
    host: Arc<dyn EditorHost>,
    parent: Option<PathBuf>,
    naming: TempFileNaming,
    root: Mutex<Option<TempDir>>,
    next_request: AtomicU64,
}

impl TempFileBackend {
    /// A backend creating its directory under the system temp directory.
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self {
            host,
            parent: None,
            naming: TempFileNaming::default(),
            root: Mutex::new(None),
            next_request: AtomicU64::new(0),
        }
    }

    /// Create the temp directory under `parent` instead.
    pub fn with_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_naming(mut self, naming: TempFileNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming(&self) -> TempFileNaming {
        self.naming
    }

    /// The temp directory, created on first use.
    async fn ensure_root(&self) -> Result<PathBuf> {
        if let Some(root) = self.root() {
            return Ok(root);
        }

        let parent = self.parent.clone();
        let failed_at = parent.clone().unwrap_or_else(std::env::temp_dir);
        if let Some(parent) = &parent {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::CreateTempDir {
                    path: parent.clone(),
                    source,
                })?;
        }
        let created = tokio::task::spawn_blocking(move || {
            let mut builder = tempfile::Builder::new();
            builder.prefix(TEMP_DIR_PREFIX);
            match &parent {
                Some(parent) => builder.tempdir_in(parent),
                None => builder.tempdir(),
            }
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|created| created)
        .map_err(|source| Error::CreateTempDir {
            path: failed_at,
            source,
        })?;

        // Concurrent first acquisitions may both create one; the first installed wins
        let (path, unused) = {
            let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
            match root.as_ref() {
                Some(existing) => (existing.path().to_path_buf(), Some(created)),
                None => {
                    let path = created.path().to_path_buf();
                    tracing::debug!(path = %path.display(), "Created virtual document directory");
                    *root = Some(created);
                    (path, None)
                }
            }
        };
        drop(unused);
        Ok(path)
    }

    /// Path of the file the next acquisition for `extension` writes.
    ///
    /// The extension directory is recreated if something removed it.
    async fn file_path(&self, extension: &str) -> Result<PathBuf> {
        let dir = self.ensure_root().await?.join(extension);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| Error::CreateTempDir {
                path: dir.clone(),
                source,
            })?;
        let name = match self.naming {
            TempFileNaming::Shared => format!("{FILE_STEM}.{extension}"),
            TempFileNaming::PerRequest => {
                let n = self.next_request.fetch_add(1, Ordering::Relaxed);
                format!("{FILE_STEM}-{n}.{extension}")
            }
        };
        Ok(dir.join(name))
    }

    /// Root of the temp directory, if it has been created.
    pub fn root(&self) -> Option<PathBuf> {
        let root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        root.as_ref().map(|root| root.path().to_path_buf())
    }

    /// Remove the temp directory and everything in it.
    pub fn shutdown(&self) {
        let root = self
            .root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(root) = root {
            let path = root.path().to_path_buf();
            if let Err(err) = root.close() {
                tracing::warn!(path = %path.display(), error = %err, "Failed to remove virtual document directory");
            }
        }
    }
}

impl std::fmt::Debug for TempFileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempFileBackend")
            .field("parent", &self.parent)
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

/// Deletes the temp file through the host.
struct DeleteThroughHost {
    host: Arc<dyn EditorHost>,
    uri: String,
}

#[async_trait]
impl Release for DeleteThroughHost {
    async fn release(&self) -> Result<()> {
        self.host.delete_file(&self.uri).await
    }
}

#[async_trait]
impl VirtualDocumentDelivery for TempFileBackend {
    fn strategy(&self) -> DeliveryStrategy {
        DeliveryStrategy::TempFile
    }

    async fn acquire(
        &self,
        _doc: &Document,
        vdoc: &VirtualDocument,
    ) -> Result<VirtualDocumentHandle> {
        let path = self.file_path(vdoc.extension()).await?;
        let content = match vdoc.embedded_language().fixup {
            Some(fixup) => fixup.apply(vdoc.content()),
            None => vdoc.content().to_string(),
        };
        if let Err(source) = tokio::fs::write(&path, content).await {
            return Err(Error::WriteVirtualDocument { path, source });
        }

        let uri = Url::from_file_path(&path)
            .map_err(|_| Error::InvalidPath(path.clone()))?
            .to_string();

        if let Err(err) = self.host.open_document(&uri).await {
            // No handle will exist to clean this file up
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                tracing::debug!(path = %path.display(), error = %remove_err, "Failed to remove unopened virtual document");
            }
            return Err(err);
        }

        tracing::debug!(%uri, language = vdoc.language(), "Acquired temp file virtual document");
        Ok(VirtualDocumentHandle::new(
            uri.clone(),
            DeleteThroughHost {
                host: Arc::clone(&self.host),
                uri,
            },
        ))
    }
}
