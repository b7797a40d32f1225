//! Memoized document tokenization.
//!
//! The engine keeps a single cache slot: the tokens of the most recently
//! parsed `(uri, version)` pair. Completion and hover requests arrive for the
//! document being edited, so one slot is enough; any other document or any
//! version bump replaces the slot wholesale.

use std::sync::{Arc, Mutex, PoisonError};

use crate::document::Document;
use crate::tokenizer::{Token, Tokenizer};

/// Identity of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub uri: String,
    pub version: i32,
}

impl CacheKey {
    /// The key for a document, or `None` if the document is unversioned and
    /// therefore cannot be validated against later content.
    pub fn for_document(doc: &Document) -> Option<Self> {
        doc.version().map(|version| Self {
            uri: doc.uri().to_string(),
            version,
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    tokens: Arc<Vec<Token>>,
}

/// Single-slot token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CacheEntry>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens for `key`, if the slot holds exactly that key.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Token>>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|entry| &entry.key == key)
            .map(|entry| Arc::clone(&entry.tokens))
    }

    /// Overwrite the slot.
    pub fn store(&self, key: CacheKey, tokens: Arc<Vec<Token>>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CacheEntry { key, tokens });
    }

    /// Empty the slot.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// The key currently cached, if any.
    pub fn key(&self) -> Option<CacheKey> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|entry| entry.key.clone())
    }
}

/// Owns the tokenizer and its cache.
#[derive(Debug, Default)]
pub struct ParseEngine {
    tokenizer: Tokenizer,
    cache: TokenCache,
}

impl ParseEngine {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            cache: TokenCache::new(),
        }
    }

    /// Tokens for `doc`.
    ///
    /// Returns the cached `Arc` when the document's URI and version match the
    /// slot; otherwise tokenizes the full text and replaces the slot.
    pub fn parse(&self, doc: &Document) -> Arc<Vec<Token>> {
        let Some(key) = CacheKey::for_document(doc) else {
            return Arc::new(self.tokenizer.tokenize(doc.content()));
        };

        if let Some(tokens) = self.cache.get(&key) {
            return tokens;
        }

        tracing::trace!(uri = %key.uri, version = key.version, "Tokenizing document");
        let tokens = Arc::new(self.tokenizer.tokenize(doc.content()));
        self.cache.store(key, Arc::clone(&tokens));
        tokens
    }

    /// Drop the cached tokens, e.g. when the cached document is closed.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }
}
