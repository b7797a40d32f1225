//! Virtual document synthesis.
//!
//! A virtual document is a single-language projection of a host document.
//! It has exactly as many lines as the host: lines inside blocks of the
//! projected language are copied, every other line is empty. A host position
//! is therefore valid in the virtual document without translation.

use std::sync::Arc;

use crate::blocks::{block_at_position, blocks_of_language, language_name_from_block};
use crate::document::Document;
use crate::languages::{EmbeddedLanguage, LanguageRegistry};
use crate::parse::ParseEngine;
use crate::types::Position;

/// A single-language projection of a host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDocument {
    language: Arc<EmbeddedLanguage>,
    content: String,
}

impl VirtualDocument {
    pub fn new(language: Arc<EmbeddedLanguage>, content: impl Into<String>) -> Self {
        Self {
            language,
            content: content.into(),
        }
    }

    /// Canonical language name.
    pub fn language(&self) -> &str {
        &self.language.name
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &str {
        &self.language.extension
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedded_language(&self) -> &Arc<EmbeddedLanguage> {
        &self.language
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }
}

/// Project `doc` onto the language at `pos`.
///
/// Returns `None` when `pos` is not inside a language block or the block's
/// language is not registered; callers fall back to default behavior.
pub fn synthesize(
    doc: &Document,
    pos: Position,
    engine: &ParseEngine,
    registry: &LanguageRegistry,
) -> Option<VirtualDocument> {
    let tokens = engine.parse(doc);
    let block = block_at_position(&tokens, pos)?;
    let language = registry.get(&language_name_from_block(block)?)?;

    let host_lines: Vec<&str> = doc.lines().collect();
    let mut slots = vec![""; host_lines.len()];
    for token in blocks_of_language(&tokens, registry, &language.name) {
        for line in token.body.iter() {
            if let (Some(slot), Some(text)) = (slots.get_mut(line), host_lines.get(line)) {
                *slot = *text;
            }
        }
    }

    Some(VirtualDocument {
        content: slots.join("\n"),
        language,
    })
}
