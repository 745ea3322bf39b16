//! Configuration management for lore.
//!
//! Parses `lore.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `contentful.space_id`
//! - `contentful.access_token`
//! - `contentful.environment`
//! - `contentful.base_url`
//!
//! ## Example
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [content]
//! backend = "contentful"
//!
//! [contentful]
//! space_id = "${CONTENTFUL_SPACE_ID}"
//! access_token = "${CONTENTFUL_ACCESS_TOKEN}"
//! ```

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lore.toml";

/// Default content directory, relative to the config file.
const DEFAULT_CONTENT_DIR: &str = "content";

/// Default size of the thread pool used for repository reads.
const DEFAULT_IO_THREADS: usize = 16;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content directory (filesystem backend).
    pub content_dir: Option<PathBuf>,
    /// Override content backend.
    pub backend: Option<Backend>,
}

/// Content repository backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// YAML files in a local directory.
    #[default]
    Fs,
    /// Contentful Delivery API.
    Contentful,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fs => "fs",
            Self::Contentful => "contentful",
        })
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fs" => Ok(Self::Fs),
            "contentful" => Ok(Self::Contentful),
            other => Err(format!(
                "unknown backend '{other}' (expected 'fs' or 'contentful')"
            )),
        }
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Contentful configuration.
    pub contentful: Option<ContentfulConfig>,
    /// Markdown rendering configuration.
    pub render: RenderConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    backend: Backend,
    dir: Option<String>,
    io_threads: Option<usize>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug)]
pub struct ContentConfig {
    /// Repository backend.
    pub backend: Backend,
    /// Directory of `<content_type>.yaml` files (filesystem backend).
    pub dir: PathBuf,
    /// Threads in the pool that runs concurrent repository reads.
    pub io_threads: usize,
}

/// Contentful Delivery API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentfulConfig {
    /// Space id.
    pub space_id: String,
    /// Delivery API access token.
    pub access_token: String,
    /// Environment id.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Delivery API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ContentfulConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.space_id, "contentful.space_id")?;
        require_non_empty(&self.access_token, "contentful.access_token")?;
        require_non_empty(&self.environment, "contentful.environment")?;
        require_non_empty(&self.base_url, "contentful.base_url")?;
        require_http_url(&self.base_url, "contentful.base_url")?;
        Ok(())
    }
}

fn default_environment() -> String {
    "master".to_owned()
}

fn default_base_url() -> String {
    "https://cdn.contentful.com".to_owned()
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists).
    pub gfm: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { gfm: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`contentful.access_token`").
        field: String,
        /// Error message (e.g., "${`CONTENTFUL_ACCESS_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `lore.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called by [`Config::load`] once CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        if self.content_resolved.io_threads == 0 {
            return Err(ConfigError::Validation(
                "content.io_threads must be at least 1".to_owned(),
            ));
        }

        if self.content_resolved.backend == Backend::Contentful {
            self.require_contentful()?;
        }

        Ok(())
    }

    /// Get validated Contentful configuration.
    ///
    /// Use this instead of accessing the `contentful` field directly when the
    /// Contentful backend is selected.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_contentful(&self) -> Result<&ContentfulConfig, ConfigError> {
        let contentful = self.contentful.as_ref().ok_or_else(|| {
            ConfigError::Validation("[contentful] section required for contentful backend".into())
        })?;
        contentful.validate()?;
        Ok(contentful)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(dir) = &settings.content_dir {
            self.content_resolved.dir.clone_from(dir);
        }
        if let Some(backend) = settings.backend {
            self.content_resolved.backend = backend;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            contentful: None,
            render: RenderConfig::default(),
            content_resolved: ContentConfig {
                backend: Backend::Fs,
                dir: base.join(DEFAULT_CONTENT_DIR),
                io_threads: DEFAULT_IO_THREADS,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref mut contentful) = self.contentful {
            contentful.space_id = expand::expand_env(&contentful.space_id, "contentful.space_id")?;
            contentful.access_token =
                expand::expand_env(&contentful.access_token, "contentful.access_token")?;
            contentful.environment =
                expand::expand_env(&contentful.environment, "contentful.environment")?;
            contentful.base_url = expand::expand_env(&contentful.base_url, "contentful.base_url")?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            backend: self.content.backend,
            dir: config_dir.join(self.content.dir.as_deref().unwrap_or(DEFAULT_CONTENT_DIR)),
            io_threads: self.content.io_threads.unwrap_or(DEFAULT_IO_THREADS),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_contentful_config() -> ContentfulConfig {
        ContentfulConfig {
            space_id: "space".to_owned(),
            access_token: "token".to_owned(),
            environment: "master".to_owned(),
            base_url: "https://cdn.contentful.com".to_owned(),
        }
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(result: Result<(), ConfigError>, expected_substrings: &[&str]) {
        let err = result.expect_err("Expected validation to fail");
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.content_resolved.backend, Backend::Fs);
        assert_eq!(config.content_resolved.dir, PathBuf::from("/test/content"));
        assert_eq!(config.content_resolved.io_threads, 16);
        assert!(config.render.gfm);
        assert!(config.contentful.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.content.backend, Backend::Fs);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_parse_contentful_config_defaults() {
        let toml = r#"
[content]
backend = "contentful"

[contentful]
space_id = "abc"
access_token = "token123"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.content.backend, Backend::Contentful);
        let contentful = config.contentful.unwrap();
        assert_eq!(contentful.space_id, "abc");
        assert_eq!(contentful.access_token, "token123");
        assert_eq!(contentful.environment, "master");
        assert_eq!(contentful.base_url, "https://cdn.contentful.com");
    }

    #[test]
    fn test_parse_unknown_backend_fails() {
        let result: Result<Config, _> = toml::from_str("[content]\nbackend = \"sql\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_render_config() {
        let config: Config = toml::from_str("[render]\ngfm = false\n").unwrap();
        assert!(!config.render.gfm);
    }

    #[test]
    fn test_resolve_paths() {
        let mut config: Config = toml::from_str("[content]\ndir = \"site/content\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.content_resolved.dir,
            PathBuf::from("/project/site/content")
        );
    }

    #[test]
    fn test_resolve_io_threads() {
        let mut config: Config = toml::from_str("[content]\nio_threads = 4\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.content_resolved.io_threads, 4);
    }

    #[test]
    fn test_validate_io_threads_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.content_resolved.io_threads = 0;
        assert_validation_error(config.validate(), &["io_threads"]);
    }

    #[test]
    fn test_resolve_paths_absolute_dir() {
        let mut config: Config = toml::from_str("[content]\ndir = \"/srv/content\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.content_resolved.dir, PathBuf::from("/srv/content"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            content_dir: Some(PathBuf::from("/custom/content")),
            backend: Some(Backend::Contentful),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.content_resolved.dir,
            PathBuf::from("/custom/content")
        );
        assert_eq!(config.content_resolved.backend, Backend::Contentful);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.content_resolved.dir, PathBuf::from("/test/content"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("fs".parse::<Backend>(), Ok(Backend::Fs));
        assert_eq!("contentful".parse::<Backend>(), Ok(Backend::Contentful));
        assert!("sql".parse::<Backend>().unwrap_err().contains("sql"));
        assert_eq!(Backend::Contentful.to_string(), "contentful");
    }

    #[test]
    fn test_expand_env_vars_contentful() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("LORE_TEST_SPACE", "space-42");
            std::env::set_var("LORE_TEST_TOKEN", "secret-token");
        }
        let toml = r#"
[contentful]
space_id = "${LORE_TEST_SPACE}"
access_token = "${LORE_TEST_TOKEN}"
environment = "${LORE_TEST_ENV:-staging}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let contentful = config.contentful.unwrap();
        assert_eq!(contentful.space_id, "space-42");
        assert_eq!(contentful.access_token, "secret-token");
        assert_eq!(contentful.environment, "staging");
        unsafe {
            std::env::remove_var("LORE_TEST_SPACE");
            std::env::remove_var("LORE_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("LORE_TEST_MISSING_HOST");
        }
        let mut config: Config =
            toml::from_str("[server]\nhost = \"${LORE_TEST_MISSING_HOST}\"\n").unwrap();

        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.host"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(config.validate(), &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(config.validate(), &["server.port"]);
    }

    #[test]
    fn test_validate_contentful_backend_requires_section() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.content_resolved.backend = Backend::Contentful;
        assert_validation_error(config.validate(), &["[contentful]"]);
    }

    #[test]
    fn test_validate_fs_backend_ignores_incomplete_contentful() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.contentful = Some(ContentfulConfig {
            access_token: String::new(),
            ..valid_contentful_config()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_contentful_validate_empty_token() {
        let config = ContentfulConfig {
            access_token: String::new(),
            ..valid_contentful_config()
        };
        assert_validation_error(config.validate(), &["access_token", "empty"]);
    }

    #[test]
    fn test_contentful_validate_invalid_url() {
        let config = ContentfulConfig {
            base_url: "cdn.contentful.com".to_owned(),
            ..valid_contentful_config()
        };
        assert_validation_error(config.validate(), &["base_url", "http"]);
    }

    #[test]
    fn test_require_contentful_returns_validated() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.contentful = Some(valid_contentful_config());
        assert_eq!(config.require_contentful().unwrap().space_id, "space");
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[server]\nport = 8080\n\n[content]\ndir = \"data\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.content_resolved.dir, temp_dir.path().join("data"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_with_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();
        let settings = CliSettings {
            port: Some(9999),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[server\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_contentful_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[content]\nbackend = \"contentful\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_cli_backend_overrides_invalid_file_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[content]\nbackend = \"contentful\"\n").unwrap();
        let settings = CliSettings {
            backend: Some(Backend::Fs),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.content_resolved.backend, Backend::Fs);
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();
        let settings = CliSettings {
            port: Some(0),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("server.port")));
    }

    #[test]
    fn test_load_validates_cli_backend_without_section() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lore.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();
        let settings = CliSettings {
            backend: Some(Backend::Contentful),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
