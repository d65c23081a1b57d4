use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config_trace::ParseOptions;
use serde::Deserialize;
use thiserror::Error;

use crate::translate::{TranslateError, Translator};

const DEFAULT_SETTINGS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/settings/default.toml"
));

/// Run settings. Every field is optional in a settings file; missing fields
/// keep their default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationSettings {
    pub language: String,
    pub report_title: String,
    /// Report settings that were absent and got their default value.
    pub track_defaults: bool,
    /// Extra translations merged over the built-in table.
    pub translations_file: Option<PathBuf>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            report_title: "X-Pack to Search Guard migration report".to_string(),
            track_defaults: false,
            translations_file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsLoadError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Translations(#[from] TranslateError),
}

impl MigrationSettings {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            track_defaults: self.track_defaults,
        }
    }

    /// Built-in translations, overlaid with `translations_file`, in `language`.
    pub fn build_translator(&self) -> Result<Arc<Translator>, SettingsLoadError> {
        let mut translator = Translator::embedded()?;
        if let Some(path) = &self.translations_file {
            translator = translator.merged_with(Translator::load(path)?);
        }
        Ok(Arc::new(translator.with_language(self.language.clone())))
    }
}

/// The embedded defaults, or `path` layered over them.
pub fn load_settings(path: Option<&Path>) -> Result<MigrationSettings, SettingsLoadError> {
    let defaults = parse_settings(DEFAULT_SETTINGS, "embedded settings")?;
    let Some(path) = path else {
        return Ok(defaults);
    };
    let raw = fs::read_to_string(path).map_err(|source| SettingsLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut table: toml::Table = toml::from_str(DEFAULT_SETTINGS).map_err(|source| {
        SettingsLoadError::Parse {
            path: "embedded settings".to_string(),
            source,
        }
    })?;
    let overrides: toml::Table = toml::from_str(&raw).map_err(|source| SettingsLoadError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    table.extend(overrides);
    let mut settings = parse_settings(&table.to_string(), &path.display().to_string())?;
    // Relative translation files are resolved next to the settings file.
    if let Some(file) = settings.translations_file.take() {
        let resolved = match path.parent() {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file,
        };
        settings.translations_file = Some(resolved);
    }
    Ok(settings)
}

fn parse_settings(raw: &str, origin: &str) -> Result<MigrationSettings, SettingsLoadError> {
    toml::from_str(raw).map_err(|source| SettingsLoadError::Parse {
        path: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load_settings, MigrationSettings};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn embedded_defaults_match_default_impl() {
        assert_eq!(load_settings(None).expect("defaults"), MigrationSettings::default());
    }

    #[test]
    fn file_overrides_single_fields() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(&path, "language = \"de\"\ntranslations_file = \"extra.toml\"\n").expect("write");

        let settings = load_settings(Some(&path)).expect("settings");
        assert_eq!(settings.language, "de");
        assert_eq!(settings.report_title, MigrationSettings::default().report_title);
        assert_eq!(settings.translations_file, Some(dir.path().join("extra.toml")));
        assert!(!settings.parse_options().track_defaults);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(&path, "langauge = \"de\"\n").expect("write");
        assert!(load_settings(Some(&path)).is_err());
    }

    #[test]
    fn translator_uses_selected_language() {
        let settings = MigrationSettings {
            language: "de".to_string(),
            ..MigrationSettings::default()
        };
        let translator = settings.build_translator().expect("translator");
        assert_eq!(
            translator.translate("{DUPLICATE_USER}").expect("text"),
            "Doppelter Benutzer"
        );
    }
}
