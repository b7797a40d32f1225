//! Quarto Language Server Protocol implementation.
//!
//! This crate provides the LSP server for Quarto documents, wrapping
//! `quarto-vdoc` with the tower-lsp framework. Completion, hover and
//! signature help requests inside code blocks are answered by the editor's
//! own providers for the block's language, reached through a small set of
//! custom JSON-RPC methods.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         quarto-lsp                             │
//! │      tower-lsp wrapper, JSON-RPC/stdio, `quarto-lsp` binary    │
//! │                                                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │  server.rs  │  │ convert.rs  │  │ host.rs  │  │capabil-  │  │
//! │  │LanguageServer│ │Core ↔ LSP   │  │ClientHost│  │ities.rs  │  │
//! │  └──────┬──────┘  └─────────────┘  └────┬─────┘  └──────────┘  │
//! │         │                               │                      │
//! │  ┌──────▼───────────────────────────────▼───────────────────┐  │
//! │  │                      quarto-vdoc                          │  │
//! │  │      (virtual documents, delivery, request routing)       │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol extensions
//!
//! | Method                       | Direction       | Purpose                           |
//! |------------------------------|-----------------|-----------------------------------|
//! | `quarto/executeProvider`     | server → client | run the editor's provider at a URI |
//! | `quarto/openVirtualDocument` | server → client | open a temp file so it is indexed  |
//! | `quarto/embeddedContent`     | client → server | content of a `quarto-vdoc:` URI    |
//!
//! Temp files are deleted with a `workspace/applyEdit` delete operation when
//! the client supports it.
//!
//! # Usage
//!
//! ```bash
//! quarto-lsp --stdio
//! ```
//!
//! Or programmatically:
//!
//! ```rust,ignore
//! quarto_lsp::run_server().await;
//! ```

pub mod capabilities;
pub mod convert;
pub mod host;
pub mod server;

pub use server::run_server;
