//! Host document abstraction.
//!
//! A host document is the composite Quarto document open in the editor. The
//! core only needs its identity (URI and version) for caching and its lines
//! for projecting virtual documents.

use std::collections::HashMap;

/// A host document.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document's URI.
    uri: String,
    /// The document content.
    content: String,
    /// Version number for tracking changes (set by the editor).
    version: Option<i32>,
}

impl Document {
    /// Create a new document with the given URI and content.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: None,
        }
    }

    /// Create a new document with a version number.
    pub fn with_version(uri: impl Into<String>, content: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: Some(version),
        }
    }

    /// Get the document's URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the document's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the document's version, if set.
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Number of lines, counted the way editors do: a trailing newline opens
    /// one more (empty) line.
    pub fn line_count(&self) -> usize {
        split_lines(&self.content).count()
    }

    /// Iterate over lines without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        split_lines(&self.content)
    }

    /// Get a single line without its terminator.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines().nth(index)
    }

    /// Update the document content with a new version.
    pub fn set_content_with_version(&mut self, content: impl Into<String>, version: i32) {
        self.content = content.into();
        self.version = Some(version);
    }
}

/// Split `text` into lines on `\r\n`, `\r` and `\n`, the line endings both
/// CommonMark and LSP recognize. A trailing terminator yields a final empty
/// line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let text = rest?;
        match text.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let terminator = if text[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&text[end + terminator..]);
                Some(&text[..end])
            }
            None => {
                rest = None;
                Some(text)
            }
        }
    })
}

/// In-memory store of the documents the editor has open.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or replace a document in the store.
    pub fn open(&mut self, uri: impl Into<String>, content: impl Into<String>, version: i32) {
        let uri = uri.into();
        self.documents
            .insert(uri.clone(), Document::with_version(uri, content, version));
    }

    /// Update a document's content.
    pub fn change(&mut self, uri: &str, content: impl Into<String>, version: i32) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.set_content_with_version(content, version);
        }
    }

    /// Close a document (remove from store).
    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Get a document by URI.
    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Check if a document is in the store.
    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Get the number of documents in the store.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
