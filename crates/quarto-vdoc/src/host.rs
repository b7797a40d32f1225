//! The editor primitives the core consumes.
//!
//! Embedded-language services are never called directly: the host resolves
//! a virtual document URI to whatever provider is registered for its scheme
//! or file extension and runs it.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ProviderRequest, ProviderResponse};

#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Open the document at `uri` so the language service owning its
    /// extension indexes it.
    async fn open_document(&self, uri: &str) -> Result<()>;

    /// Delete the file at `uri` through the editor, so language services
    /// drop it from their index.
    async fn delete_file(&self, uri: &str) -> Result<()>;

    /// Run the provider for `request.kind` at `request.uri` and
    /// `request.position`.
    async fn execute_provider(&self, request: ProviderRequest) -> Result<ProviderResponse>;
}
