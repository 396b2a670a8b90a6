use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

use cadenza_core::{NamingPatterns, NamingRules};

/// What to do when a file already exists at the target path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the existing file alone and report the track as skipped.
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Overwrite => f.write_str("overwrite"),
        }
    }
}

/// Configuration for cadenza.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CADENZA_* prefix)
/// 3. Config file (~/.config/cadenza/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default source directory for `id3`, `art`, `copy`, `move` and `all`.
    pub source: Option<PathBuf>,

    /// Default destination (library) directory. Also the default root
    /// searched by `uploads`.
    pub destination: Option<PathBuf>,

    /// Discogs personal access token.
    ///
    /// Can be set via:
    /// - ENV: CADENZA_DISCOGS_TOKEN
    /// - Config: discogs_token = "..."
    pub discogs_token: Option<String>,

    /// Discogs consumer key, used together with the consumer secret when
    /// no personal token is configured.
    pub discogs_consumer_key: Option<String>,

    /// Discogs consumer secret.
    pub discogs_consumer_secret: Option<String>,

    /// User-Agent sent with every catalog request.
    pub user_agent: String,

    /// Write debug records to `log_file` instead of warnings to stderr.
    #[serde(deserialize_with = "flag")]
    pub debug_log: bool,

    /// Path of the debug log file.
    pub log_file: PathBuf,

    /// Minimum level of terminal diagnostics when `debug_log` is off.
    pub log_level: String,

    /// Collision policy for `copy`, `move` and `uploads --copy-to`.
    pub on_collision: CollisionPolicy,

    /// Move files whose names cannot be parsed into `<source>/_invalid`.
    #[serde(deserialize_with = "flag")]
    pub quarantine_invalid: bool,

    /// Filename patterns.
    #[serde(flatten)]
    pub patterns: NamingPatterns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            discogs_token: None,
            discogs_consumer_key: None,
            discogs_consumer_secret: None,
            user_agent: default_user_agent(),
            debug_log: false,
            log_file: default_log_file(),
            log_level: "warn".to_string(),
            on_collision: CollisionPolicy::Skip,
            quarantine_invalid: true,
            patterns: NamingPatterns::default(),
        }
    }
}

/// Parse a switch given as text: true/false, yes/no, on/off or 1/0.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Deserialize a switch from a boolean or from its text form. Environment
/// overrides always arrive as strings.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => parse_flag(&text)
            .ok_or_else(|| D::Error::invalid_value(Unexpected::Str(&text), &"true or false")),
    }
}

impl Config {
    /// Load configuration from a specific file and environment variables.
    ///
    /// A missing file is not an error: defaults and environment apply.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .with_context(|| format!("Failed to load config file {}", config_path.display()))?;
        }

        let env_opts = env::Options::with_top_level("cadenza");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Compile the configured filename patterns.
    pub fn naming_rules(&self) -> Result<NamingRules> {
        NamingRules::new(&self.patterns).context("Invalid filename pattern in configuration")
    }

    /// Every setting as a `(key, value)` pair, sorted by key, with
    /// credentials masked.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        let table = value
            .as_table()
            .ok_or_else(|| anyhow::anyhow!("Configuration did not serialize to a table"))?;

        let mut entries: Vec<(String, String)> = table
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    _ if is_secret(key) => "********".to_string(),
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), shown)
            })
            .collect();

        for key in ["source", "destination", "discogs_token"] {
            if !table.contains_key(key) {
                entries.push((key.to_string(), "<not set>".to_string()));
            }
        }
        entries.sort();
        Ok(entries)
    }
}

fn is_secret(key: &str) -> bool {
    key.ends_with("_token") || key.ends_with("_secret")
}

fn default_user_agent() -> String {
    format!("cadenza/{}", env!("CARGO_PKG_VERSION"))
}

/// Get the default debug log path.
///
/// Returns: ~/.local/share/cadenza/cadenza.log (or platform equivalent)
pub fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
        .join("cadenza.log")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cadenza/config.toml
/// - macOS: ~/Library/Application Support/cadenza/config.toml
/// - Windows: %APPDATA%\cadenza\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cadenza Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CADENZA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Default directories. Set them with `cadenza set_source <path>` and
# `cadenza set_dest <path>`.
#source = "/home/me/Downloads/music"
#destination = "/home/me/Music"

# Discogs credentials, required by `art` and `all`.
# Create a personal access token at: https://www.discogs.com/settings/developers
#
# Can also be set via:
# - Environment: CADENZA_DISCOGS_TOKEN=your-token-here
#discogs_token = "your-discogs-token-here"
#discogs_consumer_key = ""
#discogs_consumer_secret = ""

# Debug logging. Toggle with `cadenza log_on` / `cadenza log_off`.
debug_log = false
#log_file = "/home/me/.local/share/cadenza/cadenza.log"
#log_level = "warn"

# What to do when a file already exists in the library: "skip" or "overwrite".
on_collision = "skip"

# Move files whose names are not "Artist - Title.mp3" into <source>/_invalid.
quarantine_invalid = true

# Filename patterns (regular expressions, case-insensitive).
#and_pattern = '\s+(?:&|and|x|vs\.?)\s+|\s*,\s*'
#feature_pattern = '\s+(?:feat\.?|featuring|ft\.?)\s+'
#feature_paren_pattern = '\(\s*(?:feat\.?|featuring|ft\.?)\s+'
#invalid_pattern = '\b(?:official\s+(?:music\s+)?video|lyrics?\s+video|official\s+audio)\b'
"#
}

/// Create a config file with the example content at `config_path`.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

/// Keys accepted by `config set`.
pub const SETTING_KEYS: [&str; 15] = [
    "source",
    "destination",
    "discogs_token",
    "discogs_consumer_key",
    "discogs_consumer_secret",
    "user_agent",
    "debug_log",
    "log_file",
    "log_level",
    "on_collision",
    "quarantine_invalid",
    "and_pattern",
    "feature_pattern",
    "feature_paren_pattern",
    "invalid_pattern",
];

const BOOL_KEYS: [&str; 2] = ["debug_log", "quarantine_invalid"];

/// An editable view of the settings file.
///
/// Edits go through `toml_edit`, so comments and keys cadenza does not
/// touch survive a rewrite.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    doc: DocumentMut,
}

impl SettingsFile {
    /// Open the settings file, creating it from the example if needed.
    pub fn open(path: &Path) -> Result<Self> {
        ensure_config_file_at(path)?;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let doc = contents
            .parse::<DocumentMut>()
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set a top-level key, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<toml_edit::Value>) {
        self.doc[key] = toml_edit::value(value);
    }

    /// Set a known key from its command-line text form.
    ///
    /// Booleans and the collision policy are validated; everything else is
    /// stored as a string.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<()> {
        if !SETTING_KEYS.contains(&key) {
            anyhow::bail!(
                "Unknown config key: {key}\n\nValid keys: {}",
                SETTING_KEYS.join(", ")
            );
        }

        if BOOL_KEYS.contains(&key) {
            let value = parse_flag(raw)
                .with_context(|| format!("{key} must be true or false, not '{raw}'"))?;
            self.set(key, value);
        } else if key == "on_collision" {
            let value = raw.trim().to_lowercase();
            if value != "skip" && value != "overwrite" {
                anyhow::bail!("on_collision must be skip or overwrite, not '{raw}'");
            }
            self.set(key, value);
        } else {
            self.set(key, raw);
        }

        Ok(())
    }

    /// Remove a top-level key. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.doc.remove(key).is_some()
    }

    #[cfg(test)]
    fn get_str(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(|item| item.as_str())
    }

    #[cfg(test)]
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.doc.get(key).and_then(|item| item.as_bool())
    }

    /// Write the document back to disk.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.doc.to_string())
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}

/// Expand a leading `~` and make the path absolute, without requiring it
/// to exist.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            let home = dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Cannot expand '~': no home directory"))?;
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        _ => PathBuf::from(raw),
    };

    std::path::absolute(&expanded)
        .with_context(|| format!("Cannot make {} absolute", expanded.display()))
}

/// Pick the directory a command works on: the explicit argument if given,
/// otherwise the configured default. The directory must exist.
pub fn resolve_dir(
    explicit: Option<&Path>,
    configured: Option<&Path>,
    what: &str,
) -> Result<PathBuf> {
    let Some(dir) = explicit.or(configured) else {
        anyhow::bail!("No {what} directory given and no default configured");
    };

    if !dir.is_dir() {
        anyhow::bail!("The {what} directory does not exist: {}", dir.display());
    }

    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};
    use tempfile::TempDir;

    /// Serializes loads against tests that change `CADENZA_*` variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn load(path: &Path) -> Result<Config> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        Config::load_from(path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.source.is_none());
        assert!(config.destination.is_none());
        assert!(config.discogs_token.is_none());
        assert!(!config.debug_log);
        assert!(config.quarantine_invalid);
        assert_eq!(config.on_collision, CollisionPolicy::Skip);
        assert!(config.user_agent.starts_with("cadenza/"));
        assert!(!config.log_file.as_os_str().is_empty());
    }

    #[test]
    fn test_config_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = load(&temp_dir.path().join("absent.toml"));
        assert!(config.is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
source = "/music/in"
destination = "/music/library"
discogs_token = "abc"
debug_log = true
on_collision = "overwrite"
"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.source, Some(PathBuf::from("/music/in")));
        assert_eq!(config.destination, Some(PathBuf::from("/music/library")));
        assert_eq!(config.discogs_token.as_deref(), Some("abc"));
        assert!(config.debug_log);
        assert_eq!(config.on_collision, CollisionPolicy::Overwrite);
        assert!(config.quarantine_invalid);
    }

    #[test]
    fn test_flags_accept_text() {
        let config: Config = toml::from_str(
            r#"
debug_log = "true"
quarantine_invalid = "Off"
"#,
        )
        .unwrap();
        assert!(config.debug_log);
        assert!(!config.quarantine_invalid);

        assert!(toml::from_str::<Config>(r#"debug_log = "maybe""#).is_err());
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_env_overrides_flags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "debug_log = false\nquarantine_invalid = true\n").unwrap();

        let loaded = {
            let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            std::env::set_var("CADENZA_DEBUG_LOG", "true");
            std::env::set_var("CADENZA_QUARANTINE_INVALID", "false");
            let loaded = Config::load_from(&path);
            std::env::remove_var("CADENZA_DEBUG_LOG");
            std::env::remove_var("CADENZA_QUARANTINE_INVALID");
            loaded
        };

        let config = loaded.unwrap();
        assert!(config.debug_log);
        assert!(!config.quarantine_invalid);
    }

    #[test]
    fn test_example_config_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        assert!(ensure_config_file_at(&path).unwrap());
        assert!(!ensure_config_file_at(&path).unwrap());

        let config = load(&path).unwrap();
        assert!(!config.debug_log);
        assert!(config.naming_rules().is_ok());
    }

    #[test]
    fn test_settings_file_preserves_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "# keep me\ndebug_log = false\ncustom = 1\n").unwrap();

        let mut settings = SettingsFile::open(&path).unwrap();
        settings.set("source", "/music/in");
        settings.set("debug_log", true);
        settings.save().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# keep me"));
        assert!(written.contains("custom = 1"));
        assert!(written.contains("source = \"/music/in\""));
        assert!(written.contains("debug_log = true"));

        let reopened = SettingsFile::open(&path).unwrap();
        assert_eq!(reopened.get_str("source"), Some("/music/in"));
        assert_eq!(reopened.get_bool("debug_log"), Some(true));
    }

    #[test]
    fn test_settings_file_remove() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "discogs_token = \"t\"\n").unwrap();

        let mut settings = SettingsFile::open(&path).unwrap();
        assert!(settings.remove("discogs_token"));
        assert!(!settings.remove("discogs_token"));
        settings.save().unwrap();

        let config = load(&path).unwrap();
        assert!(config.discogs_token.is_none());
    }

    #[test]
    fn test_set_from_str() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut settings = SettingsFile::open(&path).unwrap();

        settings.set_from_str("quarantine_invalid", "false").unwrap();
        settings.set_from_str("on_collision", "Overwrite").unwrap();
        settings.set_from_str("log_level", "debug").unwrap();
        assert!(settings.set_from_str("debug_log", "maybe").is_err());
        assert!(settings.set_from_str("on_collision", "rename").is_err());
        assert!(settings.set_from_str("colour", "blue").is_err());
        settings.save().unwrap();

        let config = load(&path).unwrap();
        assert!(!config.quarantine_invalid);
        assert_eq!(config.on_collision, CollisionPolicy::Overwrite);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_setting_keys_match_config() {
        let config = Config {
            source: Some(PathBuf::from("/in")),
            destination: Some(PathBuf::from("/out")),
            discogs_token: Some("t".to_string()),
            discogs_consumer_key: Some("k".to_string()),
            discogs_consumer_secret: Some("s".to_string()),
            ..Config::default()
        };
        let mut keys: Vec<String> = config.entries().unwrap().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        let mut expected: Vec<String> = SETTING_KEYS.iter().map(|k| k.to_string()).collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_settings_file_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let settings = SettingsFile::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.get_bool("debug_log"), Some(false));
    }

    #[test]
    fn test_entries_mask_secrets() {
        let config = Config {
            discogs_token: Some("super-secret".to_string()),
            source: Some(PathBuf::from("/music/in")),
            ..Config::default()
        };
        let entries = config.entries().unwrap();

        let token = entries.iter().find(|(k, _)| k == "discogs_token").unwrap();
        assert_eq!(token.1, "********");
        let source = entries.iter().find(|(k, _)| k == "source").unwrap();
        assert_eq!(source.1, "/music/in");
        let dest = entries.iter().find(|(k, _)| k == "destination").unwrap();
        assert_eq!(dest.1, "<not set>");
        assert!(entries.iter().any(|(k, _)| k == "invalid_pattern"));
    }

    #[test]
    fn test_expand_path() {
        let absolute = expand_path("/music/in").unwrap();
        assert_eq!(absolute, PathBuf::from("/music/in"));

        let relative = expand_path("music").unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("music"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/Music").unwrap(), home.join("Music"));
            assert_eq!(expand_path("~").unwrap(), home);
        }
    }

    #[test]
    fn test_resolve_dir() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().to_path_buf();
        let missing = temp_dir.path().join("missing");

        assert_eq!(resolve_dir(Some(&existing), None, "source").unwrap(), existing);
        assert_eq!(
            resolve_dir(None, Some(&existing), "source").unwrap(),
            existing
        );
        assert!(resolve_dir(Some(&missing), Some(&existing), "source").is_err());

        let err = resolve_dir(None, None, "destination").unwrap_err();
        assert!(err.to_string().contains("destination"));
    }
}
