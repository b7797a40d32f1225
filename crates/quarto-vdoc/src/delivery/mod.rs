//! Delivery of virtual documents to language services.
//!
//! A virtual document only becomes useful once the host can resolve it to a
//! URI that some registered language service opens. Two strategies exist:
//!
//! - [`ContentProviderBackend`]: content lives in memory behind a custom URI
//!   scheme. Used for languages whose services are built into the editor.
//! - [`TempFileBackend`]: content is written to a file with the language's
//!   extension. Used for everything else.
//!
//! Both return a [`VirtualDocumentHandle`] that must be disposed once the
//! request it was acquired for is finished.

mod content_provider;
mod temp_file;

pub use content_provider::{ContentProviderBackend, VDOC_SCHEME, virtual_document_uri};
pub use temp_file::{TempFileBackend, TempFileNaming};

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;
use crate::languages::{DeliveryStrategy, EmbeddedLanguage};
use crate::vdoc::VirtualDocument;

/// Revokes whatever an acquisition made visible.
#[async_trait]
pub trait Release: Send + Sync {
    async fn release(&self) -> Result<()>;
}

/// A virtual document made resolvable at `uri`.
pub struct VirtualDocumentHandle {
    uri: String,
    release: Option<Box<dyn Release>>,
}

impl VirtualDocumentHandle {
    /// A handle whose disposal runs `release`.
    pub fn new(uri: impl Into<String>, release: impl Release + 'static) -> Self {
        Self {
            uri: uri.into(),
            release: Some(Box::new(release)),
        }
    }

    /// A handle whose disposal does nothing.
    pub fn retained(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            release: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Revoke the handle. Failures are logged, never returned: a virtual
    /// document that is already gone is not an error worth surfacing.
    pub async fn dispose(self) {
        if let Some(release) = self.release {
            if let Err(err) = release.release().await {
                tracing::warn!(uri = %self.uri, error = %err, "Failed to dispose virtual document");
            }
        }
    }
}

impl std::fmt::Debug for VirtualDocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDocumentHandle")
            .field("uri", &self.uri)
            .field("releases", &self.release.is_some())
            .finish()
    }
}

/// The capability shared by both strategies.
#[async_trait]
pub trait VirtualDocumentDelivery: Send + Sync {
    fn strategy(&self) -> DeliveryStrategy;

    async fn acquire(&self, doc: &Document, vdoc: &VirtualDocument)
    -> Result<VirtualDocumentHandle>;
}

/// Both backends, selected per language.
#[derive(Clone)]
pub struct Deliveries {
    content: Arc<ContentProviderBackend>,
    temp: Arc<TempFileBackend>,
}

impl Deliveries {
    pub fn new(content: Arc<ContentProviderBackend>, temp: Arc<TempFileBackend>) -> Self {
        Self { content, temp }
    }

    pub fn for_language(&self, language: &EmbeddedLanguage) -> &dyn VirtualDocumentDelivery {
        match language.delivery {
            DeliveryStrategy::ContentProvider => &*self.content as &dyn VirtualDocumentDelivery,
            DeliveryStrategy::TempFile => &*self.temp as &dyn VirtualDocumentDelivery,
        }
    }

    pub fn content_provider(&self) -> &Arc<ContentProviderBackend> {
        &self.content
    }

    pub fn temp_files(&self) -> &Arc<TempFileBackend> {
        &self.temp
    }
}
