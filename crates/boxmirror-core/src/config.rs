//! Configuration module for BoxMirror.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for BoxMirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub notes: NotesConfig,
    pub logging: LoggingConfig,
}

/// Box API client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the Box Content API.
    pub api_base_url: String,
    /// Bearer token. `None` falls back to the `BOX_ACCESS_TOKEN` environment variable.
    pub access_token: Option<String>,
    /// Entries requested per listing page.
    pub page_size: u32,
    /// Hard ceiling of entries a single container listing may return.
    pub max_entries: u32,
    /// Retries on HTTP 429 before giving up.
    pub max_retries: u32,
}

/// Tree mirroring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum number of downloads in flight across the whole run.
    pub max_concurrent_downloads: usize,
    /// Release remote locks before downloading locked files. When false,
    /// locked files that need downloading are skipped.
    pub unlock_locked_files: bool,
}

/// Rich-text note settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// File extension (without the dot) that marks a file as a note.
    pub extension: String,
    /// JSON pointer of the plain-text field inside a note document.
    pub text_pointer: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/boxmirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("boxmirror")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

/// Default Box Content API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.box.com/2.0";

/// Largest page a Box folder listing accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            page_size: MAX_PAGE_SIZE,
            max_entries: 10_000,
            max_retries: 5,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 10,
            unlock_locked_files: true,
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            extension: "boxnote".to_string(),
            text_pointer: "/atext/text".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.max_concurrent_downloads"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- remote ---
        match url::Url::parse(&self.remote.api_base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError {
                field: "remote.api_base_url".into(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "remote.api_base_url".into(),
                message: format!("invalid URL: {e}"),
            }),
        }
        if self.remote.page_size == 0 {
            errors.push(ValidationError {
                field: "remote.page_size".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.remote.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "remote.page_size".into(),
                message: format!("must not exceed {MAX_PAGE_SIZE}"),
            });
        }
        if self.remote.max_entries == 0 {
            errors.push(ValidationError {
                field: "remote.max_entries".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.remote.page_size > self.remote.max_entries {
            errors.push(ValidationError {
                field: "remote.page_size".into(),
                message: format!(
                    "page_size ({}) must not exceed max_entries ({})",
                    self.remote.page_size, self.remote.max_entries
                ),
            });
        }

        // --- sync ---
        if self.sync.max_concurrent_downloads == 0 {
            errors.push(ValidationError {
                field: "sync.max_concurrent_downloads".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- notes ---
        if self.notes.extension.trim_start_matches('.').is_empty() {
            errors.push(ValidationError {
                field: "notes.extension".into(),
                message: "must not be empty".into(),
            });
        }
        if !self.notes.text_pointer.starts_with('/') {
            errors.push(ValidationError {
                field: "notes.text_pointer".into(),
                message: format!(
                    "'{}' is not a JSON pointer; it must start with '/'",
                    self.notes.text_pointer
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust
/// use boxmirror_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .sync_max_concurrent_downloads(4)
///     .sync_unlock_locked_files(false)
///     .logging_level("debug")
///     .build();
/// assert_eq!(config.sync.max_concurrent_downloads, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an already loaded configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- remote ---

    pub fn remote_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.api_base_url = url.into();
        self
    }

    pub fn remote_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.remote.access_token = Some(token.into());
        self
    }

    pub fn remote_page_size(mut self, n: u32) -> Self {
        self.config.remote.page_size = n;
        self
    }

    pub fn remote_max_entries(mut self, n: u32) -> Self {
        self.config.remote.max_entries = n;
        self
    }

    pub fn remote_max_retries(mut self, n: u32) -> Self {
        self.config.remote.max_retries = n;
        self
    }

    // --- sync ---

    pub fn sync_max_concurrent_downloads(mut self, n: usize) -> Self {
        self.config.sync.max_concurrent_downloads = n;
        self
    }

    pub fn sync_unlock_locked_files(mut self, unlock: bool) -> Self {
        self.config.sync.unlock_locked_files = unlock;
        self
    }

    // --- notes ---

    pub fn notes_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.notes.extension = extension.into();
        self
    }

    pub fn notes_text_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.config.notes.text_pointer = pointer.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
