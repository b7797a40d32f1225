//! LSP capability negotiation.

use tower_lsp::lsp_types::{
    ClientCapabilities, CompletionOptions, HoverProviderCapability, ResourceOperationKind,
    ServerCapabilities, SignatureHelpOptions, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions,
};

use quarto_vdoc::LanguageRegistry;

/// Characters that open or advance a call's argument list.
pub const SIGNATURE_HELP_TRIGGERS: [&str; 2] = ["(", ","];

/// Get the server capabilities to report to the client.
///
/// Completion trigger characters are the union of every embedded language's
/// triggers; the router filters them per language.
pub fn server_capabilities(registry: &LanguageRegistry) -> ServerCapabilities {
    ServerCapabilities {
        // Text document synchronization
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                will_save: None,
                will_save_wait_until: None,
                save: None,
            },
        )),

        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            trigger_characters: Some(registry.all_trigger_characters()),
            ..Default::default()
        }),

        hover_provider: Some(HoverProviderCapability::Simple(true)),

        signature_help_provider: Some(SignatureHelpOptions {
            trigger_characters: Some(
                SIGNATURE_HELP_TRIGGERS
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
            retrigger_characters: None,
            work_done_progress_options: Default::default(),
        }),

        ..Default::default()
    }
}

/// Whether the client applies `delete` resource operations in workspace edits.
pub fn supports_resource_delete(capabilities: &ClientCapabilities) -> bool {
    capabilities
        .workspace
        .as_ref()
        .and_then(|workspace| workspace.workspace_edit.as_ref())
        .and_then(|edit| edit.resource_operations.as_ref())
        .is_some_and(|ops| ops.contains(&ResourceOperationKind::Delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_include_document_sync() {
        let caps = server_capabilities(&LanguageRegistry::default());
        assert!(caps.text_document_sync.is_some());
    }

    #[test]
    fn completion_triggers_cover_all_languages() {
        let caps = server_capabilities(&LanguageRegistry::default());
        let triggers = caps
            .completion_provider
            .and_then(|options| options.trigger_characters)
            .unwrap();
        for expected in [".", "$", "@", "\\", "<"] {
            assert!(triggers.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn capabilities_include_hover_and_signature_help() {
        let caps = server_capabilities(&LanguageRegistry::default());
        assert!(caps.hover_provider.is_some());
        assert!(caps.signature_help_provider.is_some());
    }

    #[test]
    fn resource_delete_support() {
        assert!(!supports_resource_delete(&ClientCapabilities::default()));

        let caps: ClientCapabilities = serde_json::from_value(serde_json::json!({
            "workspace": { "workspaceEdit": { "resourceOperations": ["create", "delete"] } }
        }))
        .unwrap();
        assert!(supports_resource_delete(&caps));
    }
}
