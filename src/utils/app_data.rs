use crate::keywords::{DictionaryExtension, KeywordTables};
use crate::utils::suggest::DEFAULT_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "nlq";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Max edit distance for operator suggestions
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: usize,

    /// How many suggestions to show for a dangling or unknown operator
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Extra words layered over the builtin keyword tables
    #[serde(default)]
    pub dictionary: DictionaryExtension,
}

fn default_suggestion_threshold() -> usize {
    DEFAULT_THRESHOLD
}

fn default_max_suggestions() -> usize {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            suggestion_threshold: default_suggestion_threshold(),
            max_suggestions: default_max_suggestions(),
            dictionary: DictionaryExtension::default(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load config from an explicit file, or return default if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Keyword tables for this configuration; the shared builtin tables
    /// unless the dictionary adds words
    pub fn lexicon(&self) -> Cow<'static, KeywordTables> {
        if self.dictionary.is_empty() {
            Cow::Borrowed(KeywordTables::builtin())
        } else {
            Cow::Owned(KeywordTables::extended(&self.dictionary))
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::OperatorKind;
    use crate::keywords::Lexicon;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.suggestion_threshold, 2);
        assert_eq!(config.max_suggestions, 3);
        assert!(config.dictionary.is_empty());
    }

    #[test]
    fn test_app_config_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"max_suggestions": 5}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.suggestion_threshold, 2); // default
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_dictionary_json() {
        let json = r#"{"dictionary": {"operators": {"超出": "GT"}, "stop_words": ["麻烦"]}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        let lex = config.lexicon();
        assert_eq!(lex.operator("超出"), Some(OperatorKind::Gt));
        assert!(lex.is_stop_word("麻烦"));
    }

    #[test]
    fn test_builtin_lexicon_shared_without_dictionary() {
        let config = AppConfig::default();
        assert!(matches!(config.lexicon(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.suggestion_threshold = 1;
        config.dictionary.index_indicators.push("仓".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
