//! In-memory delivery behind the `quarto-vdoc` URI scheme.
//!
//! The host registers a content provider for the scheme once; it answers by
//! calling [`ContentProviderBackend::provide`]. Content is keyed by host
//! document URI and overwritten by the next acquisition for that document.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{VirtualDocumentDelivery, VirtualDocumentHandle};
use crate::document::Document;
use crate::error::Result;
use crate::languages::DeliveryStrategy;
use crate::vdoc::VirtualDocument;

pub const VDOC_SCHEME: &str = "quarto-vdoc";

/// `quarto-vdoc://<language>/<percent-encoded host uri>.<ext>`
pub fn virtual_document_uri(host_uri: &str, vdoc: &VirtualDocument) -> String {
    format!(
        "{VDOC_SCHEME}://{}/{}.{}",
        vdoc.language(),
        urlencoding::encode(host_uri),
        vdoc.extension()
    )
}

/// Recover the host URI from a virtual document URI.
fn host_uri(vdoc_uri: &str) -> Option<String> {
    let rest = vdoc_uri
        .strip_prefix(VDOC_SCHEME)
        .and_then(|rest| rest.strip_prefix("://"))?;
    let (_language, file) = rest.split_once('/')?;
    // The encoded host URI never contains '/', and the extension follows the last '.'
    let (encoded, _extension) = file.rsplit_once('.')?;
    urlencoding::decode(encoded).ok().map(Cow::into_owned)
}

#[derive(Debug, Default)]
pub struct ContentProviderBackend {
    contents: Mutex<HashMap<String, String>>,
}

impl ContentProviderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content for a `quarto-vdoc` URI, if one was acquired for its host document.
    pub fn provide(&self, vdoc_uri: &str) -> Option<String> {
        let key = host_uri(vdoc_uri)?;
        let contents = self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        contents.get(&key).cloned()
    }

    /// Drop the content held for a host document, e.g. when it is closed.
    pub fn forget(&self, host_uri: &str) {
        let mut contents = self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        contents.remove(host_uri);
    }
}

#[async_trait]
impl VirtualDocumentDelivery for ContentProviderBackend {
    fn strategy(&self) -> DeliveryStrategy {
        DeliveryStrategy::ContentProvider
    }

    async fn acquire(
        &self,
        doc: &Document,
        vdoc: &VirtualDocument,
    ) -> Result<VirtualDocumentHandle> {
        {
            let mut contents = self
                .contents
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            contents.insert(doc.uri().to_string(), vdoc.content().to_string());
        }
        Ok(VirtualDocumentHandle::retained(virtual_document_uri(
            doc.uri(),
            vdoc,
        )))
    }
}
