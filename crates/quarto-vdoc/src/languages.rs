//! Registry of embedded languages.
//!
//! Each language is one tagged record holding everything the routing layer
//! needs: the file extension its language service recognizes, the trigger
//! characters it declares, the features it serves, the delivery strategy and
//! any content fixup. Lookups happen once per request.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blocks::MATH_LANGUAGE;
use crate::types::RequestKind;

/// Languages delivered through the in-memory content provider. Their
/// services are built into editors and resolve custom URI schemes.
pub const EMBEDDED_CONTENT_LANGUAGES: &[&str] = &["html", "css", "javascript"];

/// How a virtual document is made resolvable to a URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryStrategy {
    /// In-memory content behind a custom URI scheme.
    ContentProvider,
    /// A file on disk with the language's extension.
    TempFile,
}

/// Select the delivery strategy for a language.
pub fn delivery_for_language(name: &str, content_languages: &[String]) -> DeliveryStrategy {
    if content_languages.iter().any(|lang| lang == name) {
        DeliveryStrategy::ContentProvider
    } else {
        DeliveryStrategy::TempFile
    }
}

/// Intelligence features the language service behind a language is
/// expected to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageFeatures {
    pub completion: bool,
    pub hover: bool,
    pub signature_help: bool,
}

impl LanguageFeatures {
    pub const ALL: Self = Self {
        completion: true,
        hover: true,
        signature_help: true,
    };

    pub const COMPLETION_AND_HOVER: Self = Self {
        completion: true,
        hover: true,
        signature_help: false,
    };

    pub fn supports(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Completion => self.completion,
            RequestKind::Hover => self.hover,
            RequestKind::SignatureHelp => self.signature_help,
        }
    }
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        Self::ALL
    }
}

/// Language-specific adjustments applied to temp-file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VdocFixup {
    /// Put `# type: ignore` on the first line when it is empty, so a type
    /// checker does not flash diagnostics for a file that is rewritten on
    /// every keystroke.
    TypeIgnoreDirective,
}

impl VdocFixup {
    /// Apply the fixup without changing the number of lines.
    pub fn apply(&self, content: &str) -> String {
        match self {
            VdocFixup::TypeIgnoreDirective => {
                if content.is_empty() || content.starts_with('\n') {
                    format!("# type: ignore{content}")
                } else {
                    content.to_string()
                }
            }
        }
    }
}

/// One embedded language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedLanguage {
    pub name: String,
    /// Other block names resolving to this language.
    pub aliases: Vec<String>,
    /// File extension without the dot.
    pub extension: String,
    pub trigger_characters: Vec<String>,
    pub features: LanguageFeatures,
    pub delivery: DeliveryStrategy,
    pub fixup: Option<VdocFixup>,
}

impl EmbeddedLanguage {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            extension: extension.into(),
            trigger_characters: Vec::new(),
            features: LanguageFeatures::ALL,
            delivery: DeliveryStrategy::TempFile,
            fixup: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_triggers(mut self, triggers: &[&str]) -> Self {
        self.trigger_characters = triggers.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_features(mut self, features: LanguageFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_fixup(mut self, fixup: VdocFixup) -> Self {
        self.fixup = Some(fixup);
        self
    }

    /// Check if `character` is one of this language's trigger characters.
    pub fn is_trigger_character(&self, character: &str) -> bool {
        self.trigger_characters.iter().any(|c| c == character)
    }
}

fn builtin_languages() -> Vec<EmbeddedLanguage> {
    use LanguageFeatures as F;
    vec![
        EmbeddedLanguage::new("python", "py")
            .with_aliases(&["ipython", "python3"])
            .with_triggers(&["."])
            .with_fixup(VdocFixup::TypeIgnoreDirective),
        EmbeddedLanguage::new("r", "r").with_triggers(&["$", "@", ":", "."]),
        EmbeddedLanguage::new("julia", "jl").with_triggers(&["."]),
        EmbeddedLanguage::new("sql", "sql")
            .with_triggers(&["."])
            .with_features(F::COMPLETION_AND_HOVER),
        EmbeddedLanguage::new("bash", "sh")
            .with_aliases(&["sh", "shell"])
            .with_features(F::COMPLETION_AND_HOVER),
        EmbeddedLanguage::new("ojs", "js").with_triggers(&["."]),
        EmbeddedLanguage::new("html", "html").with_triggers(&["<", ".", ":", "\"", "=", "/"]),
        EmbeddedLanguage::new("css", "css").with_triggers(&[".", ":", "-", "#"]),
        EmbeddedLanguage::new("javascript", "js")
            .with_aliases(&["js"])
            .with_triggers(&["."]),
        EmbeddedLanguage::new("typescript", "ts")
            .with_aliases(&["ts"])
            .with_triggers(&["."]),
        EmbeddedLanguage::new(MATH_LANGUAGE, "tex")
            .with_aliases(&["latex"])
            .with_triggers(&["\\"])
            .with_features(F::COMPLETION_AND_HOVER),
        EmbeddedLanguage::new("cpp", "cpp")
            .with_aliases(&["c++"])
            .with_triggers(&[".", ":", ">"]),
        EmbeddedLanguage::new("rust", "rs").with_triggers(&[".", ":"]),
        EmbeddedLanguage::new("go", "go").with_triggers(&["."]),
        EmbeddedLanguage::new("java", "java").with_triggers(&["."]),
        EmbeddedLanguage::new("lua", "lua").with_triggers(&[".", ":"]),
        EmbeddedLanguage::new("dot", "dot").with_features(F::COMPLETION_AND_HOVER),
        EmbeddedLanguage::new("mermaid", "mmd").with_features(F::COMPLETION_AND_HOVER),
    ]
}

/// Configuration record adding or overriding a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOverride {
    pub name: String,
    /// Required when adding a language that is not built in.
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub trigger_characters: Option<Vec<String>>,
    #[serde(default)]
    pub features: Option<LanguageFeatures>,
}

/// Lookup table of embedded languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Arc<EmbeddedLanguage>>,
    by_name: HashMap<String, usize>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        let content_languages: Vec<String> = EMBEDDED_CONTENT_LANGUAGES
            .iter()
            .map(|lang| lang.to_string())
            .collect();
        Self::from_languages(builtin_languages(), &content_languages)
    }
}

impl LanguageRegistry {
    /// Build a registry, assigning each language its delivery strategy.
    pub fn from_languages(languages: Vec<EmbeddedLanguage>, content_languages: &[String]) -> Self {
        let mut registry = Self {
            languages: Vec::with_capacity(languages.len()),
            by_name: HashMap::new(),
        };
        for mut language in languages {
            language.delivery = delivery_for_language(&language.name, content_languages);
            registry.insert(language);
        }
        registry
    }

    /// Built-in languages with configuration applied.
    pub fn with_overrides(overrides: &[LanguageOverride], content_languages: &[String]) -> Self {
        let mut languages = builtin_languages();
        for entry in overrides {
            match languages.iter_mut().find(|lang| lang.name == entry.name) {
                Some(language) => {
                    if let Some(extension) = &entry.extension {
                        language.extension = extension.clone();
                    }
                    if let Some(aliases) = &entry.aliases {
                        language.aliases = aliases.clone();
                    }
                    if let Some(triggers) = &entry.trigger_characters {
                        language.trigger_characters = triggers.clone();
                    }
                    if let Some(features) = entry.features {
                        language.features = features;
                    }
                }
                None => match &entry.extension {
                    Some(extension) => {
                        let mut language = EmbeddedLanguage::new(&entry.name, extension);
                        language.aliases = entry.aliases.clone().unwrap_or_default();
                        language.trigger_characters =
                            entry.trigger_characters.clone().unwrap_or_default();
                        language.features = entry.features.unwrap_or_default();
                        languages.push(language);
                    }
                    None => tracing::warn!(
                        language = %entry.name,
                        "Ignoring language without an extension"
                    ),
                },
            }
        }
        Self::from_languages(languages, content_languages)
    }

    fn insert(&mut self, language: EmbeddedLanguage) {
        let index = self.languages.len();
        for name in std::iter::once(&language.name).chain(language.aliases.iter()) {
            self.by_name.entry(name.clone()).or_insert(index);
        }
        self.languages.push(Arc::new(language));
    }

    /// Look up a language by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<EmbeddedLanguage>> {
        self.by_name
            .get(name)
            .map(|&index| Arc::clone(&self.languages[index]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedLanguage> {
        self.languages.iter().map(|lang| lang.as_ref())
    }

    /// Every trigger character any language declares, sorted and deduplicated.
    pub fn all_trigger_characters(&self) -> Vec<String> {
        let mut triggers: Vec<String> = self
            .iter()
            .flat_map(|lang| lang.trigger_characters.iter().cloned())
            .collect();
        triggers.sort();
        triggers.dedup();
        triggers
    }
}
