//! Embedded-language virtual documents for Quarto.
//!
//! A Quarto document mixes Markdown with code blocks in many languages. This
//! crate lets language services that only understand one language answer
//! requests made inside those blocks: it projects the host document onto the
//! language at the cursor, hands the projection to the editor, and asks the
//! editor to run whatever provider is registered for it.
//!
//! This crate has no dependency on any LSP framework. The editor is reached
//! through the [`EditorHost`] trait; `quarto-lsp` implements it over
//! JSON-RPC.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     middleware.rs                             │
//! │   EmbeddedRouter: fallback, trigger/feature gating, dispose   │
//! └──────┬──────────────────┬───────────────────────┬────────────┘
//!        │                  │                       │
//! ┌──────▼──────┐   ┌───────▼────────┐   ┌──────────▼───────────┐
//! │   vdoc.rs   │   │  delivery/     │   │       host.rs        │
//! │ synthesize  │   │ content / temp │──▶│  EditorHost (trait)  │
//! └──────┬──────┘   └────────────────┘   └──────────────────────┘
//!        │
//! ┌──────▼──────────────┐   ┌──────────────────┐
//! │ parse.rs, blocks.rs │   │   languages.rs   │
//! │ tokens + classifier │   │ LanguageRegistry │
//! └──────┬──────────────┘   └──────────────────┘
//!        │
//! ┌──────▼──────┐
//! │tokenizer.rs │  comrak
//! └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let router = EmbeddedRouter::new(&VdocConfig::default(), host);
//! match router.completion(&doc, position, Some(".")).await {
//!     Routed::Handled(list) => reply(list),
//!     Routed::Fallback => default_completion(&doc, position),
//! }
//! ```

pub mod blocks;
pub mod config;
pub mod delivery;
pub mod document;
pub mod error;
pub mod host;
pub mod languages;
pub mod middleware;
pub mod parse;
pub mod tokenizer;
pub mod types;
pub mod vdoc;

pub use config::VdocConfig;
pub use document::{Document, DocumentStore};
pub use error::{Error, Result};
pub use host::EditorHost;
pub use languages::{DeliveryStrategy, EmbeddedLanguage, LanguageRegistry};
pub use middleware::{EmbeddedRouter, Routed};
pub use parse::ParseEngine;
pub use types::{
    CompletionItem, CompletionList, Hover, Position, ProviderRequest, ProviderResponse, Range,
    RequestKind, SignatureHelp, SignatureInformation,
};
pub use vdoc::{VirtualDocument, synthesize};
