use std::path::Path;

use serde::{Deserialize, Serialize};

/// Editor configuration.
///
/// Loaded from a JSON document; unrecognized keys are ignored and
/// missing keys fall back to their defaults, so a partial configuration
/// is always valid input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Language used for syntax highlighting.
    #[serde(default = "default_syntax_language")]
    pub syntax_language: String,

    /// Size of a tab character in columns. The core stores tabs as
    /// literal codepoints; expansion is the renderer's concern.
    #[serde(default = "default_tab_size")]
    pub tab_size: u64,

    /// If enabled, the tab key inserts spaces.
    #[serde(default)]
    pub tab_expand: bool,

    /// If enabled, indent a new line to match the previous line.
    #[serde(default)]
    pub auto_indent: bool,

    /// User-defined commands to include in the menu.
    #[serde(default)]
    pub menu_commands: Vec<MenuCommand>,

    /// Directories to exclude from file search.
    #[serde(default)]
    pub hide_directories: Vec<String>,
}

/// A user-defined menu item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MenuCommand {
    /// Displayed name of the menu item.
    pub name: String,

    /// Shell command to execute when the item is selected. The output
    /// is piped to a pager, so it should be non-interactive.
    #[serde(default)]
    pub shell_cmd: String,
}

fn default_syntax_language() -> String {
    "plaintext".to_string()
}

fn default_tab_size() -> u64 {
    4
}

impl Default for Config {
    fn default() -> Config {
        serde_json::from_str("{}").expect("empty config deserializes to defaults")
    }
}

impl Config {
    /// Reads a configuration from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|err| ConfigError::Read(err.to_string()))?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|err| ConfigError::Malformed(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|err| ConfigError::Write(err.to_string()))?;
        std::fs::write(path, contents).map_err(|err| ConfigError::Write(err.to_string()))
    }

    /// Checks that the configured values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::Invalid(
                "tabSize must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a configuration could not be loaded or stored.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Read(String),
    /// The file could not be written.
    Write(String),
    /// The contents were not valid JSON.
    Malformed(String),
    /// A key held a value the editor cannot use.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "could not read config: {msg}"),
            ConfigError::Write(msg) => write!(f, "could not write config: {msg}"),
            ConfigError::Malformed(msg) => write!(f, "malformed config: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
