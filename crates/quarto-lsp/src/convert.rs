//! Conversion between quarto-vdoc types and tower_lsp::lsp_types.

use tower_lsp::lsp_types::{
    CompletionItem as LspCompletionItem, CompletionItemKind, CompletionList as LspCompletionList,
    CompletionResponse, Documentation, Hover as LspHover, HoverContents, MarkupContent,
    MarkupKind, ParameterInformation, ParameterLabel, Position as LspPosition, Range as LspRange,
    SignatureHelp as LspSignatureHelp, SignatureInformation as LspSignatureInformation,
};

use quarto_vdoc::{
    CompletionItem, CompletionList, Hover, Position, Range, SignatureHelp, SignatureInformation,
};

/// Convert a quarto-vdoc Position to an lsp-types Position.
pub fn position_to_lsp(pos: &Position) -> LspPosition {
    LspPosition {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert an lsp-types Position to a quarto-vdoc Position.
pub fn position_from_lsp(pos: &LspPosition) -> Position {
    Position::new(pos.line, pos.character)
}

/// Convert a quarto-vdoc Range to an lsp-types Range.
pub fn range_to_lsp(range: &Range) -> LspRange {
    LspRange {
        start: position_to_lsp(&range.start),
        end: position_to_lsp(&range.end),
    }
}

fn markdown(value: &str) -> MarkupContent {
    MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.to_string(),
    }
}

/// `CompletionItemKind` has no public constructor from its wire value.
fn completion_kind_to_lsp(kind: u32) -> Option<CompletionItemKind> {
    serde_json::from_value(serde_json::Value::from(kind)).ok()
}

/// Convert a quarto-vdoc CompletionItem to an lsp-types CompletionItem.
pub fn completion_item_to_lsp(item: &CompletionItem) -> LspCompletionItem {
    LspCompletionItem {
        label: item.label.clone(),
        kind: item.kind.and_then(completion_kind_to_lsp),
        detail: item.detail.clone(),
        documentation: item
            .documentation
            .as_deref()
            .map(|doc| Documentation::MarkupContent(markdown(doc))),
        insert_text: item.insert_text.clone(),
        sort_text: item.sort_text.clone(),
        filter_text: item.filter_text.clone(),
        ..Default::default()
    }
}

/// Convert a quarto-vdoc CompletionList to an lsp-types CompletionResponse.
pub fn completion_list_to_lsp(list: &CompletionList) -> CompletionResponse {
    CompletionResponse::List(LspCompletionList {
        is_incomplete: list.is_incomplete,
        items: list.items.iter().map(completion_item_to_lsp).collect(),
    })
}

/// Convert a quarto-vdoc Hover to an lsp-types Hover.
pub fn hover_to_lsp(hover: &Hover) -> LspHover {
    LspHover {
        contents: HoverContents::Markup(markdown(&hover.contents)),
        range: hover.range.as_ref().map(range_to_lsp),
    }
}

/// Convert a quarto-vdoc SignatureInformation to an lsp-types SignatureInformation.
pub fn signature_to_lsp(signature: &SignatureInformation) -> LspSignatureInformation {
    LspSignatureInformation {
        label: signature.label.clone(),
        documentation: signature
            .documentation
            .as_deref()
            .map(|doc| Documentation::MarkupContent(markdown(doc))),
        parameters: if signature.parameters.is_empty() {
            None
        } else {
            Some(
                signature
                    .parameters
                    .iter()
                    .map(|label| ParameterInformation {
                        label: ParameterLabel::Simple(label.clone()),
                        documentation: None,
                    })
                    .collect(),
            )
        },
        active_parameter: None,
    }
}

/// Convert a quarto-vdoc SignatureHelp to an lsp-types SignatureHelp.
pub fn signature_help_to_lsp(help: &SignatureHelp) -> LspSignatureHelp {
    LspSignatureHelp {
        signatures: help.signatures.iter().map(signature_to_lsp).collect(),
        active_signature: help.active_signature,
        active_parameter: help.active_parameter,
    }
}
