use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Language used when a message has no text in the selected language.
pub const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Deserialize)]
struct TranslationFile {
    #[serde(default)]
    message: Vec<TranslationEntry>,
}

#[derive(Debug, Deserialize)]
struct TranslationEntry {
    key: String,
    #[serde(flatten)]
    texts: BTreeMap<String, String>,
}

/// Errors raised while loading a translation table or resolving a message.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to read translations file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse translations file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("translation entry {key} in {path} has no 'en' text")]
    MissingFallback { path: String, key: String },
    #[error("message template references unknown translation key {key}")]
    UnknownKey { key: String },
    #[error("unterminated placeholder in message template: {template}")]
    Unterminated { template: String },
}

/// Read-only key to per-language text table.
///
/// Built once and shared; lookups never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    language: String,
    table: IndexMap<String, BTreeMap<String, String>>,
}

impl Translator {
    /// The built-in English and German message table.
    pub fn embedded() -> Result<Self, TranslateError> {
        let raw = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/translations/messages.toml"
        ));
        Self::from_toml_str(raw, "embedded translations")
    }

    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let raw = fs::read_to_string(path).map_err(|source| TranslateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, TranslateError> {
        let parsed: TranslationFile = toml::from_str(raw).map_err(|source| TranslateError::Parse {
            path: origin.to_string(),
            source,
        })?;
        let mut table = IndexMap::new();
        for entry in parsed.message {
            if !entry.texts.contains_key(FALLBACK_LANGUAGE) {
                return Err(TranslateError::MissingFallback {
                    path: origin.to_string(),
                    key: entry.key,
                });
            }
            table.insert(entry.key.to_ascii_uppercase(), entry.texts);
        }
        Ok(Self {
            language: FALLBACK_LANGUAGE.to_string(),
            table,
        })
    }

    /// Entries of `other` replace entries with the same key.
    pub fn merged_with(mut self, other: Translator) -> Self {
        for (key, texts) in other.table {
            self.table.insert(key, texts);
        }
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(&key.to_ascii_uppercase())
    }

    /// Text for `key` in the selected language, falling back to English.
    pub fn text(&self, key: &str) -> Result<&str, TranslateError> {
        let texts = self
            .table
            .get(&key.to_ascii_uppercase())
            .ok_or_else(|| TranslateError::UnknownKey {
                key: key.to_string(),
            })?;
        texts
            .get(&self.language)
            .or_else(|| texts.get(FALLBACK_LANGUAGE))
            .map(String::as_str)
            .ok_or_else(|| TranslateError::UnknownKey {
                key: key.to_string(),
            })
    }

    /// Replace every `{TOKEN}` in `template`. A token starts with a letter and
    /// holds only letters, digits and underscores; other braces are kept, so
    /// `${user.name}` and `{0}` pass through untouched.
    pub fn translate(&self, template: &str) -> Result<String, TranslateError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match token_len(after) {
                Some(len) if after[len..].starts_with('}') => {
                    out.push_str(self.text(&after[..len])?);
                    rest = &after[len + 1..];
                }
                Some(len) if after.len() == len => {
                    return Err(TranslateError::Unterminated {
                        template: template.to_string(),
                    });
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn token_len(text: &str) -> Option<usize> {
    let first = text.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    Some(
        text.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::{TranslateError, Translator};
    use pretty_assertions::assert_eq;

    const TABLE: &str = r#"
[[message]]
key = "GREETING"
en = "Hello"
de = "Hallo"

[[message]]
key = "only_en"
en = "English only"
"#;

    #[test]
    fn embedded_table_parses_and_has_core_keys() {
        let translator = Translator::embedded().expect("embedded translations");
        assert!(translator.contains("PASSWORD_RESET"));
        assert!(translator.contains("CONNECTION_POOL_DISABLED"));
        assert!(translator.contains("TLS_TRANSPORT_DISABLED"));
        assert!(translator.text("TLS_TRANSPORT_DISABLED").is_ok());
    }

    #[test]
    fn tokens_resolve_case_insensitively_and_fall_back_to_english() {
        let translator = Translator::from_toml_str(TABLE, "test")
            .expect("table")
            .with_language("de");
        assert_eq!(
            translator.translate("{greeting}, {ONLY_EN}!").expect("ok"),
            "Hallo, English only!"
        );
    }

    #[test]
    fn non_token_braces_pass_through() {
        let translator = Translator::from_toml_str(TABLE, "test").expect("table");
        assert_eq!(
            translator.translate("(uid=${user.name}) {0} {}").expect("ok"),
            "(uid=${user.name}) {0} {}"
        );
    }

    #[test]
    fn unknown_key_is_a_hard_error() {
        let translator = Translator::from_toml_str(TABLE, "test").expect("table");
        assert!(matches!(
            translator.translate("{NOPE}"),
            Err(TranslateError::UnknownKey { key }) if key == "NOPE"
        ));
        assert!(matches!(
            translator.translate("{GREETING"),
            Err(TranslateError::Unterminated { .. })
        ));
    }

    #[test]
    fn entries_without_english_are_rejected() {
        let raw = "[[message]]\nkey = \"X\"\nde = \"nur deutsch\"\n";
        assert!(matches!(
            Translator::from_toml_str(raw, "test"),
            Err(TranslateError::MissingFallback { .. })
        ));
    }

    #[test]
    fn merged_tables_override_by_key() {
        let base = Translator::from_toml_str(TABLE, "base").expect("table");
        let raw = "[[message]]\nkey = \"GREETING\"\nen = \"Hi\"\n";
        let extra = Translator::from_toml_str(raw, "extra").expect("table");
        assert_eq!(base.merged_with(extra).text("GREETING").expect("ok"), "Hi");
    }
}
