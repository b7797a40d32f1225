//! LSP server implementation using tower-lsp.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use quarto_vdoc::{Document, DocumentStore, EmbeddedRouter, Routed, VdocConfig};

use crate::capabilities::{server_capabilities, supports_resource_delete};
use crate::convert;
use crate::host::ClientHost;

/// Params of `quarto/embeddedContent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedContentParams {
    /// A `quarto-vdoc:` URI previously sent in `quarto/executeProvider`.
    pub uri: String,
}

/// The Quarto language server.
pub struct QuartoLanguageServer {
    /// The LSP client for sending notifications and requests.
    client: Client,
    /// Document store for managing open documents.
    documents: Arc<RwLock<DocumentStore>>,
    /// Built during `initialize` from the client's options.
    router: OnceLock<Arc<EmbeddedRouter>>,
}

impl QuartoLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(DocumentStore::new())),
            router: OnceLock::new(),
        }
    }

    /// A snapshot of a document and the router, if both exist.
    async fn prepare(&self, uri: &Url) -> Option<(Document, Arc<EmbeddedRouter>)> {
        let router = Arc::clone(self.router.get()?);
        let documents = self.documents.read().await;
        let doc = documents.get(uri.as_str())?.clone();
        Some((doc, router))
    }

    /// Resolve a content-provider URI for the client.
    async fn embedded_content(&self, params: EmbeddedContentParams) -> Result<Option<String>> {
        Ok(self
            .router
            .get()
            .and_then(|router| router.provide_content(&params.uri)))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for QuartoLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = VdocConfig::from_initialization_options(params.initialization_options);
        let host = ClientHost::new(
            self.client.clone(),
            supports_resource_delete(&params.capabilities),
        );
        let router = Arc::new(EmbeddedRouter::new(&config, Arc::new(host)));
        let capabilities = server_capabilities(router.registry());

        if self.router.set(router).is_err() {
            tracing::warn!("Ignoring repeated initialize request");
        }

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "quarto-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Quarto LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(router) = self.router.get() {
            router.shutdown();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;

        let mut documents = self.documents.write().await;
        documents.open(uri.as_str(), text, version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // We're using full document sync, so take the last change
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut documents = self.documents.write().await;
            documents.change(uri.as_str(), change.text, version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        {
            let mut documents = self.documents.write().await;
            documents.close(uri.as_str());
        }

        if let Some(router) = self.router.get() {
            router.close_document(uri.as_str());
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position.position;
        let Some((doc, router)) = self.prepare(&params.text_document_position.text_document.uri).await
        else {
            return Ok(None);
        };
        let trigger = params
            .context
            .and_then(|context| context.trigger_character);

        match router
            .completion(&doc, convert::position_from_lsp(&position), trigger.as_deref())
            .await
        {
            Routed::Handled(list) => Ok(Some(convert::completion_list_to_lsp(&list))),
            // Markdown itself has no completions
            Routed::Fallback => Ok(None),
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let Some((doc, router)) = self
            .prepare(&params.text_document_position_params.text_document.uri)
            .await
        else {
            return Ok(None);
        };

        match router.hover(&doc, convert::position_from_lsp(&position)).await {
            Routed::Handled(hover) => Ok(hover.as_ref().map(convert::hover_to_lsp)),
            Routed::Fallback => Ok(None),
        }
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let position = params.text_document_position_params.position;
        let Some((doc, router)) = self
            .prepare(&params.text_document_position_params.text_document.uri)
            .await
        else {
            return Ok(None);
        };
        let trigger = params
            .context
            .and_then(|context| context.trigger_character);

        match router
            .signature_help(&doc, convert::position_from_lsp(&position), trigger.as_deref())
            .await
        {
            Routed::Handled(help) => Ok(help.as_ref().map(convert::signature_help_to_lsp)),
            Routed::Fallback => Ok(None),
        }
    }
}

/// Run the LSP server over stdio.
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(QuartoLanguageServer::new)
        .custom_method(
            "quarto/embeddedContent",
            QuartoLanguageServer::embedded_content,
        )
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}
