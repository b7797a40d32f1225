//! Core types shared by the core and its transports.
//!
//! These types are designed to be:
//! - Transport-agnostic (no LSP protocol dependencies)
//! - Easily serializable to JSON (for the custom host requests)
//! - Easily convertible to `lsp-types` (for the native LSP server)
//!
//! All positions use 0-based line and character indices, matching the LSP specification.

use serde::{Deserialize, Serialize};

/// A position in a text document, expressed as zero-based line and character offset.
///
/// Character offsets are measured in UTF-16 code units to match the LSP specification.
/// Positions are never translated between a host document and its virtual documents,
/// so only the line component matters to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset (UTF-16 code units).
    pub character: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.character.cmp(&other.character),
            ord => ord,
        }
    }
}

/// A range in a text document, expressed as start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    /// The range's start position (inclusive).
    pub start: Position,
    /// The range's end position (exclusive).
    pub end: Position,
}

impl Range {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if this range contains a position.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// The kind of intelligence request being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    Completion,
    Hover,
    SignatureHelp,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Completion => write!(f, "completion"),
            RequestKind::Hover => write!(f, "hover"),
            RequestKind::SignatureHelp => write!(f, "signatureHelp"),
        }
    }
}

/// A completion candidate returned by an embedded-language provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// The label shown in the completion list.
    pub label: String,
    /// LSP `CompletionItemKind` value, if the provider reported one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    /// Markdown documentation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub insert_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sort_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filter_text: Option<String>,
}

impl CompletionItem {
    /// Create a completion item with only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }
}

/// A list of completion items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompletionList {
    /// Whether further typing should re-request completions.
    #[serde(default)]
    pub is_incomplete: bool,
    pub items: Vec<CompletionItem>,
}

impl CompletionList {
    /// Create a complete list from items.
    pub fn new(items: Vec<CompletionItem>) -> Self {
        Self {
            is_incomplete: false,
            items,
        }
    }

    /// Check if the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Hover information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hover {
    /// Markdown contents.
    pub contents: String,
    /// The range the hover applies to. Virtual documents share host line
    /// numbers, so the range is valid in the host document unchanged.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub range: Option<Range>,
}

/// A single callable signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInformation {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documentation: Option<String>,
    /// Parameter labels, in order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<String>,
}

/// Signature help for the call surrounding a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureHelp {
    pub signatures: Vec<SignatureInformation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub active_signature: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub active_parameter: Option<u32>,
}

/// A request to run the host's provider for `kind` at `uri` and `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    pub kind: RequestKind,
    /// URI of the virtual document.
    pub uri: String,
    /// The original host position, used verbatim.
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trigger_character: Option<String>,
}

/// The result of a provider execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "camelCase")]
pub enum ProviderResponse {
    Completion(CompletionList),
    Hover(Option<Hover>),
    SignatureHelp(Option<SignatureHelp>),
}

impl ProviderResponse {
    /// The empty result for a request kind.
    pub fn empty(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Completion => ProviderResponse::Completion(CompletionList::default()),
            RequestKind::Hover => ProviderResponse::Hover(None),
            RequestKind::SignatureHelp => ProviderResponse::SignatureHelp(None),
        }
    }

    /// The request kind this response answers.
    pub fn kind(&self) -> RequestKind {
        match self {
            ProviderResponse::Completion(_) => RequestKind::Completion,
            ProviderResponse::Hover(_) => RequestKind::Hover,
            ProviderResponse::SignatureHelp(_) => RequestKind::SignatureHelp,
        }
    }

    /// Check if this response carries no results.
    pub fn is_empty(&self) -> bool {
        match self {
            ProviderResponse::Completion(list) => list.is_empty(),
            ProviderResponse::Hover(hover) => hover.is_none(),
            ProviderResponse::SignatureHelp(help) => help
                .as_ref()
                .is_none_or(|help| help.signatures.is_empty()),
        }
    }
}
