//! Configuration module
//!
//! Settings come from a TOML file (default `~/.config/admin-kit/config.toml`,
//! overridable via the `ADMIN_KIT_CONFIG` env var). Every field has a
//! default, so a missing or partial file still yields a runnable config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::JwtConfig;
use crate::core::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE_SIZES};
use crate::core::session::{SessionManager, TokenStore};
use crate::core::upload::{
    FileKind, UploadPolicy, ALLOWED_DOCUMENT_TYPES, ALLOWED_IMAGE_TYPES, MAX_BATCH_FILES,
};

const MIB: u64 = 1024 * 1024;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter used when `RUST_LOG` is unset (e.g. "info",
    /// "admin_kit=debug,tower_http=warn").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Token and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: i64,
    /// Key clients persist the bearer token under.
    #[serde(default = "default_session_storage_key")]
    pub session_storage_key: String,
}

fn default_jwt_secret() -> String {
    "super-secret-key-change-in-production".to_string()
}

fn default_jwt_expiration_hours() -> i64 {
    24
}

fn default_session_storage_key() -> String {
    "auth_token".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
            session_storage_key: default_session_storage_key(),
        }
    }
}

/// Seed admin account, created on first boot when no users exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

/// Upload limits. Sizes are in whole MiB for config readability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_max_document_mb")]
    pub max_document_size_mb: u64,
    #[serde(default = "default_max_image_mb")]
    pub max_image_size_mb: u64,
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
    #[serde(default = "default_document_types")]
    pub allowed_document_types: Vec<String>,
    #[serde(default = "default_image_types")]
    pub allowed_image_types: Vec<String>,
}

fn default_max_document_mb() -> u64 {
    5
}

fn default_max_image_mb() -> u64 {
    3
}

fn default_max_batch_files() -> usize {
    MAX_BATCH_FILES
}

fn default_document_types() -> Vec<String> {
    ALLOWED_DOCUMENT_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_image_types() -> Vec<String> {
    ALLOWED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_document_size_mb: default_max_document_mb(),
            max_image_size_mb: default_max_image_mb(),
            max_batch_files: default_max_batch_files(),
            allowed_document_types: default_document_types(),
            allowed_image_types: default_image_types(),
        }
    }
}

impl UploadsConfig {
    pub fn document_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.max_document_size_mb * MIB,
            self.allowed_document_types.clone(),
            FileKind::Document,
        )
    }

    pub fn image_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.max_image_size_mb * MIB,
            self.allowed_image_types.clone(),
            FileKind::Image,
        )
    }
}

/// List-endpoint defaults and bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_limit")]
    pub default_limit: u32,
    /// Largest `limit` a request may ask for; bigger values are clamped.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default = "default_page_sizes")]
    pub page_sizes: Vec<u32>,
}

fn default_page_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u32 {
    100
}

fn default_page_sizes() -> Vec<u32> {
    DEFAULT_PAGE_SIZES.to_vec()
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_limit(),
            page_sizes: default_page_sizes(),
        }
    }
}

impl PaginationConfig {
    pub fn clamp_limit(&self, limit: u32) -> u32 {
        limit.clamp(1, self.max_limit)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {e}")))?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content).map_err(|e| {
            ConfigError::Io(format!(
                "Failed to write config file {:?}: {e}",
                path.as_ref()
            ))
        })
    }

    /// Bridge into the token layer's config.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_expiration_hours,
        )
    }

    /// Session manager bound to the configured storage key, for embedders
    /// that keep a client-side session.
    pub fn session_manager<S: TokenStore>(&self, store: S) -> SessionManager<S> {
        SessionManager::new(store, self.security.session_storage_key.clone())
    }
}

/// Default configuration file path: `~/.config/admin-kit/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("admin-kit")
        .join("config.toml")
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_full_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.security.session_storage_key, "auth_token");
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.uploads.max_batch_files, 10);
    }

    #[test]
    fn partial_sections_keep_their_defaults() {
        let toml = r#"
[server]
port = 9090

[security]
jwt_secret = "test-secret"

[uploads]
max_image_size_mb = 8
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.jwt_secret, "test-secret");
        assert_eq!(config.security.jwt_expiration_hours, 24);
        assert_eq!(config.uploads.max_image_size_mb, 8);
        assert_eq!(config.uploads.max_document_size_mb, 5);
    }

    #[test]
    fn policies_are_built_from_the_uploads_section() {
        let config = AppConfig::default();
        let documents = config.uploads.document_policy();
        assert_eq!(documents.max_size, 5 * 1024 * 1024);
        assert!(documents.allowed_extensions.contains(&"pdf".to_string()));

        let images = config.uploads.image_policy();
        assert_eq!(images.max_size, 3 * 1024 * 1024);
        assert_eq!(images.kind, FileKind::Image);
    }

    #[test]
    fn limits_clamp_to_the_configured_maximum() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.clamp_limit(0), 1);
        assert_eq!(pagination.clamp_limit(25), 25);
        assert_eq!(pagination.clamp_limit(5000), 100);
    }

    #[test]
    fn session_manager_uses_the_configured_storage_key() {
        use crate::core::session::MemoryTokenStore;

        let toml = r#"
[security]
session_storage_key = "admin_session"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();

        let store = MemoryTokenStore::new();
        store.set("admin_session", "persisted-token");
        let mut manager = config.session_manager(store);
        manager.restore();
        assert_eq!(manager.token(), Some("persisted-token"));
    }

    #[test]
    fn default_path_points_into_the_user_config_dir() {
        let path = default_config_path();
        assert!(path.ends_with("admin-kit/config.toml"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.uploads.allowed_image_types, config.uploads.allowed_image_types);
    }

    #[test]
    fn save_creates_parent_directories_and_loads_back() {
        let dir = std::env::temp_dir().join(format!("admin-kit-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 9191;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9191);

        std::fs::remove_dir_all(&dir).ok();
    }
}
