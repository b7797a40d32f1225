//! Configuration for embedded-language routing.
//!
//! Read from the editor's initialization options, e.g.
//!
//! ```json
//! {
//!   "enabled": true,
//!   "tempDir": "/tmp/quarto",
//!   "tempFileNaming": "perRequest",
//!   "contentProviderLanguages": ["html", "css", "javascript"],
//!   "languages": [{ "name": "haskell", "extension": "hs" }]
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::delivery::TempFileNaming;
use crate::error::Result;
use crate::languages::{EMBEDDED_CONTENT_LANGUAGES, LanguageOverride, LanguageRegistry};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VdocConfig {
    /// Route requests into embedded languages at all.
    pub enabled: bool,
    /// Parent of the temp-file backend's directory. Defaults to the system temp dir.
    pub temp_dir: Option<PathBuf>,
    pub temp_file_naming: TempFileNaming,
    /// Languages delivered through the content provider.
    pub content_provider_languages: Vec<String>,
    /// Added languages and overrides of built-in ones.
    pub languages: Vec<LanguageOverride>,
    /// Treat `$$` blocks as `tex`.
    pub display_math: bool,
}

impl Default for VdocConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temp_dir: None,
            temp_file_naming: TempFileNaming::default(),
            content_provider_languages: EMBEDDED_CONTENT_LANGUAGES
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
            languages: Vec::new(),
            display_math: true,
        }
    }
}

impl VdocConfig {
    /// Parse configuration from JSON. `null` yields the defaults.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse initialization options, falling back to the defaults when they
    /// are missing or invalid.
    pub fn from_initialization_options(options: Option<serde_json::Value>) -> Self {
        match options.map(Self::from_json).transpose() {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring invalid initialization options");
                Self::default()
            }
        }
    }

    pub fn registry(&self) -> LanguageRegistry {
        LanguageRegistry::with_overrides(&self.languages, &self.content_provider_languages)
    }

    pub fn tokenizer(&self) -> Tokenizer {
        if self.display_math {
            Tokenizer::new()
        } else {
            Tokenizer::new().without_display_math()
        }
    }
}
