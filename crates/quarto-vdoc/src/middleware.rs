//! Routing of intelligence requests into embedded languages.
//!
//! For a request at a position inside a language block the router
//! synthesizes a virtual document, delivers it with the strategy the
//! language's registry record selects, asks the host to run its provider
//! against the virtual document at the unchanged position, and disposes the
//! delivery afterward. Positions outside language blocks fall back to the
//! caller's default handling.
//!
//! Failures past the fallback decision never escape: they are logged and
//! answered with an empty result, so the composite document behaves like a
//! single provider.

use std::sync::Arc;

use crate::config::VdocConfig;
use crate::delivery::{ContentProviderBackend, Deliveries, TempFileBackend};
use crate::document::Document;
use crate::host::EditorHost;
use crate::languages::LanguageRegistry;
use crate::parse::ParseEngine;
use crate::types::{
    CompletionList, Hover, Position, ProviderRequest, ProviderResponse, RequestKind,
    SignatureHelp,
};
use crate::vdoc::{VirtualDocument, synthesize};

/// Outcome of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed<T> {
    /// The position is not in an embedded language; use default handling.
    Fallback,
    /// The embedded-language path answered (possibly with an empty result).
    Handled(T),
}

impl<T> Routed<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Routed::Fallback)
    }

    pub fn handled(self) -> Option<T> {
        match self {
            Routed::Fallback => None,
            Routed::Handled(value) => Some(value),
        }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> Routed<U> {
        match self {
            Routed::Fallback => Routed::Fallback,
            Routed::Handled(value) => Routed::Handled(f(value)),
        }
    }
}

pub struct EmbeddedRouter {
    engine: ParseEngine,
    registry: LanguageRegistry,
    deliveries: Deliveries,
    host: Arc<dyn EditorHost>,
    enabled: bool,
}

impl EmbeddedRouter {
    /// Build a router and both delivery backends from configuration.
    pub fn new(config: &VdocConfig, host: Arc<dyn EditorHost>) -> Self {
        let mut temp =
            TempFileBackend::new(Arc::clone(&host)).with_naming(config.temp_file_naming);
        if let Some(parent) = &config.temp_dir {
            temp = temp.with_parent(parent);
        }
        let deliveries = Deliveries::new(Arc::new(ContentProviderBackend::new()), Arc::new(temp));

        Self {
            engine: ParseEngine::new(config.tokenizer()),
            registry: config.registry(),
            deliveries,
            host,
            enabled: config.enabled,
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &ParseEngine {
        &self.engine
    }

    pub fn deliveries(&self) -> &Deliveries {
        &self.deliveries
    }

    /// The virtual document for `pos`, if `pos` is in a registered language.
    pub fn virtual_document(&self, doc: &Document, pos: Position) -> Option<VirtualDocument> {
        synthesize(doc, pos, &self.engine, &self.registry)
    }

    pub async fn completion(
        &self,
        doc: &Document,
        pos: Position,
        trigger_character: Option<&str>,
    ) -> Routed<CompletionList> {
        self.route(doc, RequestKind::Completion, pos, trigger_character)
            .await
            .map(|response| match response {
                ProviderResponse::Completion(list) => list,
                _ => CompletionList::default(),
            })
    }

    pub async fn hover(&self, doc: &Document, pos: Position) -> Routed<Option<Hover>> {
        self.route(doc, RequestKind::Hover, pos, None)
            .await
            .map(|response| match response {
                ProviderResponse::Hover(hover) => hover,
                _ => None,
            })
    }

    pub async fn signature_help(
        &self,
        doc: &Document,
        pos: Position,
        trigger_character: Option<&str>,
    ) -> Routed<Option<SignatureHelp>> {
        self.route(doc, RequestKind::SignatureHelp, pos, trigger_character)
            .await
            .map(|response| match response {
                ProviderResponse::SignatureHelp(help) => help,
                _ => None,
            })
    }

    async fn route(
        &self,
        doc: &Document,
        kind: RequestKind,
        pos: Position,
        trigger_character: Option<&str>,
    ) -> Routed<ProviderResponse> {
        if !self.enabled {
            return Routed::Fallback;
        }
        let Some(vdoc) = self.virtual_document(doc, pos) else {
            return Routed::Fallback;
        };

        let language = Arc::clone(vdoc.embedded_language());
        // Signature help triggers ("(" and ",") are not completion triggers
        if let (RequestKind::Completion, Some(trigger)) = (kind, trigger_character) {
            // Another provider may own this character; answering would duplicate its results
            if !language.is_trigger_character(trigger) {
                tracing::debug!(language = %language.name, trigger, "Trigger character not declared by language");
                return Routed::Handled(ProviderResponse::empty(kind));
            }
        }
        if !language.features.supports(kind) {
            tracing::debug!(language = %language.name, %kind, "Language does not serve request kind");
            return Routed::Handled(ProviderResponse::empty(kind));
        }

        let request = ProviderRequest {
            kind,
            uri: String::new(),
            position: pos,
            trigger_character: trigger_character.map(str::to_string),
        };

        // Runs detached so that dropping this future (request cancellation)
        // still lets the acquisition finish and the handle be disposed.
        let deliveries = self.deliveries.clone();
        let host = Arc::clone(&self.host);
        let doc = doc.clone();
        let task = tokio::spawn(async move {
            deliver_and_execute(&deliveries, host, &doc, &vdoc, request).await
        });

        match task.await {
            Ok(response) => Routed::Handled(response),
            Err(err) => {
                tracing::warn!(error = %err, %kind, "Embedded request task failed");
                Routed::Handled(ProviderResponse::empty(kind))
            }
        }
    }

    /// Forget state held for a closed host document.
    pub fn close_document(&self, uri: &str) {
        self.deliveries.content_provider().forget(uri);
        if self
            .engine
            .cache()
            .key()
            .is_some_and(|key| key.uri == uri)
        {
            self.engine.invalidate();
        }
    }

    /// Content for a content-provider URI.
    pub fn provide_content(&self, vdoc_uri: &str) -> Option<String> {
        self.deliveries.content_provider().provide(vdoc_uri)
    }

    /// Remove on-disk state.
    pub fn shutdown(&self) {
        self.deliveries.temp_files().shutdown();
    }
}

/// Acquire, execute, and always dispose.
async fn deliver_and_execute(
    deliveries: &Deliveries,
    host: Arc<dyn EditorHost>,
    doc: &Document,
    vdoc: &VirtualDocument,
    mut request: ProviderRequest,
) -> ProviderResponse {
    let kind = request.kind;
    let delivery = deliveries.for_language(vdoc.embedded_language());

    let handle = match delivery.acquire(doc, vdoc).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(error = %err, language = vdoc.language(), "Failed to deliver virtual document");
            return ProviderResponse::empty(kind);
        }
    };

    request.uri = handle.uri().to_string();
    tracing::debug!(uri = %request.uri, %kind, strategy = ?delivery.strategy(), "Executing embedded provider");
    // A panicking provider must not skip disposal
    let result = tokio::spawn(async move { host.execute_provider(request).await }).await;
    handle.dispose().await;

    match result {
        Ok(Ok(response)) if response.kind() == kind => response,
        Ok(Ok(response)) => {
            let err = crate::Error::UnexpectedResponse {
                expected: kind,
                found: response.kind(),
            };
            tracing::warn!(error = %err, "Discarding provider result");
            ProviderResponse::empty(kind)
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, %kind, "Embedded provider failed");
            ProviderResponse::empty(kind)
        }
        Err(err) => {
            tracing::warn!(error = %err, %kind, "Embedded provider task failed");
            ProviderResponse::empty(kind)
        }
    }
}
