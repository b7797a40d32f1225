//! The editor host, reached over JSON-RPC.
//!
//! Provider execution and document opening have no standard LSP request, so
//! they are custom requests the client extension must answer. Deleting goes
//! through `workspace/applyEdit` so the editor's language services see the
//! file disappear.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tower_lsp::Client;
use tower_lsp::lsp_types::request::Request;
use tower_lsp::lsp_types::{
    DeleteFile, DeleteFileOptions, DocumentChangeOperation, DocumentChanges, ResourceOp, Url,
    WorkspaceEdit,
};

use quarto_vdoc::{EditorHost, Error, ProviderRequest, ProviderResponse, Result};

/// `quarto/executeProvider`: run the client's provider for a request kind.
#[derive(Debug)]
pub enum ExecuteProvider {}

impl Request for ExecuteProvider {
    type Params = ProviderRequest;
    type Result = ProviderResponse;
    const METHOD: &'static str = "quarto/executeProvider";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenVirtualDocumentParams {
    pub uri: String,
}

/// `quarto/openVirtualDocument`: open a document without showing it.
#[derive(Debug)]
pub enum OpenVirtualDocument {}

impl Request for OpenVirtualDocument {
    type Params = OpenVirtualDocumentParams;
    type Result = ();
    const METHOD: &'static str = "quarto/openVirtualDocument";
}

/// [`EditorHost`] backed by the LSP client.
pub struct ClientHost {
    client: Client,
    /// Whether the client accepts delete operations in workspace edits.
    resource_delete: bool,
}

impl ClientHost {
    pub fn new(client: Client, resource_delete: bool) -> Self {
        Self {
            client,
            resource_delete,
        }
    }

    async fn delete_locally(uri: &Url) -> Result<()> {
        let path = uri
            .to_file_path()
            .map_err(|_| Error::InvalidUri(uri.to_string()))?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// A workspace edit deleting one file, tolerating its absence.
pub fn delete_file_edit(uri: Url) -> WorkspaceEdit {
    let delete = DeleteFile {
        uri,
        options: Some(DeleteFileOptions {
            recursive: None,
            ignore_if_not_exists: Some(true),
            annotation_id: None,
        }),
    };
    WorkspaceEdit {
        changes: None,
        document_changes: Some(DocumentChanges::Operations(vec![
            DocumentChangeOperation::Op(ResourceOp::Delete(delete)),
        ])),
        change_annotations: None,
    }
}

#[async_trait]
impl EditorHost for ClientHost {
    async fn open_document(&self, uri: &str) -> Result<()> {
        let params = OpenVirtualDocumentParams {
            uri: uri.to_string(),
        };
        self.client
            .send_request::<OpenVirtualDocument>(params)
            .await
            .map_err(|err| Error::OpenDocument {
                uri: uri.to_string(),
                message: err.to_string(),
            })
    }

    async fn delete_file(&self, uri: &str) -> Result<()> {
        let url = Url::parse(uri).map_err(|_| Error::InvalidUri(uri.to_string()))?;
        if !self.resource_delete {
            return Self::delete_locally(&url).await;
        }

        match self.client.apply_edit(delete_file_edit(url.clone())).await {
            Ok(response) if response.applied => Ok(()),
            Ok(response) => {
                tracing::debug!(
                    %uri,
                    reason = response.failure_reason.as_deref().unwrap_or("unknown"),
                    "Client declined delete; removing file directly"
                );
                Self::delete_locally(&url).await
            }
            Err(err) => Err(Error::DeleteFile {
                uri: uri.to_string(),
                message: err.to_string(),
            }),
        }
    }

    async fn execute_provider(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        self.client
            .send_request::<ExecuteProvider>(request)
            .await
            .map_err(|err| Error::Provider(err.to_string()))
    }
}
