// crates/infohub-config/src/config.rs
// ============================================================================
// Module: Info Hub Configuration
// Description: Configuration loading and validation for Info Hub.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: infohub-core, infohub-clients, infohub-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: the server never starts
//! with a collaborator address, listener, or export it could not validate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use infohub_clients::HttpClientConfig;
use infohub_clients::OAuthConfig;
use infohub_core::EventLevel;
use infohub_core::ExportConfiguration;
use infohub_store_sqlite::SqliteStoreConfig;
use infohub_store_sqlite::SqliteStoreMode;
use infohub_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "infohub.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "INFOHUB_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of server auth tokens.
const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a server auth token.
const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Maximum inbound request body size in bytes.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Maximum request or client timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum number of inline export configurations.
const MAX_EXPORTS: usize = 1024;
/// Maximum number of policies per export.
const MAX_POLICIES_PER_EXPORT: usize = 256;
/// Default bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default request timeout in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default graceful shutdown timeout in milliseconds.
const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 10_000;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Info Hub configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfoHubConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Policy evaluation service.
    pub policy: HttpClientConfig,
    /// Cache service.
    pub cache: HttpClientConfig,
    /// Presentation signer service.
    pub signer: HttpClientConfig,
    /// OAuth2 client credentials for all collaborator calls.
    #[serde(default)]
    pub oauth: Option<OAuthConfig>,
    /// Export configuration store.
    #[serde(default)]
    pub export_store: ExportStoreConfig,
    /// Inline export configurations seeded into the store at startup.
    #[serde(default)]
    pub exports: Vec<ExportConfiguration>,
}

impl InfoHubConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        validate_client("policy", &self.policy)?;
        validate_client("cache", &self.cache)?;
        validate_client("signer", &self.signer)?;
        if let Some(oauth) = &self.oauth {
            validate_oauth(oauth)?;
            for (section, client) in
                [("policy", &self.policy), ("cache", &self.cache), ("signer", &self.signer)]
            {
                if client.bearer_token.is_some() {
                    return Err(ConfigError::Invalid(format!(
                        "{section}.bearer_token conflicts with oauth"
                    )));
                }
            }
        }
        self.export_store.validate()?;
        validate_exports(&self.exports)
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Deadline applied to every request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Time allowed for in-flight requests to finish on shutdown.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Optional inbound authentication.
    #[serde(default)]
    pub auth: Option<ServerAuthConfig>,
    /// Event logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_ms: default_request_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            auth: None,
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid("server.max_body_bytes out of range".to_string()));
        }
        if self.request_timeout_ms == 0 || self.request_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(
                "server.request_timeout_ms out of range".to_string(),
            ));
        }
        if self.shutdown_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(
                "server.shutdown_timeout_ms out of range".to_string(),
            ));
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        self.audit.validate()?;
        let addr = self.bind_addr()?;
        if !addr.ip().is_loopback() && self.auth_mode() == ServerAuthMode::None {
            return Err(ConfigError::Invalid(
                "non-loopback bind disallowed without auth policy".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses the listener address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Returns the effective auth mode.
    #[must_use]
    pub fn auth_mode(&self) -> ServerAuthMode {
        self.auth.as_ref().map_or(ServerAuthMode::None, |auth| auth.mode)
    }
}

/// Inbound auth modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerAuthMode {
    /// No authentication; only allowed on loopback binds.
    #[default]
    None,
    /// Bearer token authentication.
    BearerToken,
}

/// Server authentication configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuthConfig {
    /// Auth mode for inbound requests.
    #[serde(default)]
    pub mode: ServerAuthMode,
    /// Accepted bearer tokens.
    #[serde(default)]
    pub bearer_tokens: Vec<String>,
}

impl ServerAuthConfig {
    /// Validates auth configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bearer_tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::Invalid("too many auth tokens".to_string()));
        }
        for token in &self.bearer_tokens {
            if token.trim().is_empty() {
                return Err(ConfigError::Invalid("auth token must be non-empty".to_string()));
            }
            if token.len() > MAX_AUTH_TOKEN_LENGTH {
                return Err(ConfigError::Invalid("auth token too long".to_string()));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(
                    "auth token must not contain whitespace".to_string(),
                ));
            }
        }
        match self.mode {
            ServerAuthMode::BearerToken if self.bearer_tokens.is_empty() => Err(
                ConfigError::Invalid("bearer_token auth requires bearer_tokens".to_string()),
            ),
            ServerAuthMode::None if !self.bearer_tokens.is_empty() => Err(ConfigError::Invalid(
                "bearer_tokens set without bearer_token auth mode".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Event logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Enable structured event logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional log file (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Minimum level written.
    #[serde(default)]
    pub level: EventLevel,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
            level: EventLevel::default(),
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Export Store
// ============================================================================

/// Export configuration store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStoreType {
    /// Use the in-memory store seeded from `[[exports]]`.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

/// Export configuration store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportStoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: ExportStoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for ExportStoreConfig {
    fn default() -> Self {
        Self {
            store_type: ExportStoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl ExportStoreConfig {
    /// Validates export store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            ExportStoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory export_store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            ExportStoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite export_store requires path".to_string())
                })?;
                validate_path_string("export_store.path", &path.to_string_lossy())
            }
        }
    }

    /// Returns the `SQLite` settings when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (ExportStoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates one collaborator client section.
fn validate_client(section: &str, config: &HttpClientConfig) -> Result<(), ConfigError> {
    let addr = config.addr.trim();
    if addr.is_empty() {
        return Err(ConfigError::Invalid(format!("{section}.addr must be set")));
    }
    if !(addr.starts_with("http://") || addr.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "{section}.addr must include http:// or https://"
        )));
    }
    if config.timeout_ms == 0 || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!("{section}.timeout_ms out of range")));
    }
    if config.max_response_bytes == 0 {
        return Err(ConfigError::Invalid(format!(
            "{section}.max_response_bytes must be greater than zero"
        )));
    }
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{section}.user_agent must be non-empty")));
    }
    if config.bearer_token.as_deref().is_some_and(|token| token.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!("{section}.bearer_token must be non-empty")));
    }
    Ok(())
}

/// Validates the OAuth2 client-credentials section.
fn validate_oauth(config: &OAuthConfig) -> Result<(), ConfigError> {
    if config.client_id.trim().is_empty() {
        return Err(ConfigError::Invalid("oauth.client_id must be set".to_string()));
    }
    if config.client_secret.is_empty() {
        return Err(ConfigError::Invalid("oauth.client_secret must be set".to_string()));
    }
    let url = config.token_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid(
            "oauth.token_url must include http:// or https://".to_string(),
        ));
    }
    if config.timeout_ms == 0 || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid("oauth.timeout_ms out of range".to_string()));
    }
    if config.scopes.iter().any(|scope| scope.is_empty() || scope.contains(' ')) {
        return Err(ConfigError::Invalid(
            "oauth.scopes entries must be non-empty and contain no spaces".to_string(),
        ));
    }
    Ok(())
}

/// Validates a batch of export configurations.
///
/// Names must be unique ignoring case, signing fields non-empty, and every
/// policy name must have the `namespace/name/version` shape.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] naming the first offending export.
pub fn validate_exports(exports: &[ExportConfiguration]) -> Result<(), ConfigError> {
    if exports.len() > MAX_EXPORTS {
        return Err(ConfigError::Invalid("too many exports".to_string()));
    }
    let mut seen = BTreeSet::new();
    for export in exports {
        let name = export.export_name.as_str();
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid("exports.exportName must be non-empty".to_string()));
        }
        if !seen.insert(export.export_name.lookup_key()) {
            return Err(ConfigError::Invalid(format!("duplicate export name: {name}")));
        }
        for (field, value) in [
            ("issuer", &export.issuer),
            ("keyNamespace", &export.key_namespace),
            ("key", &export.key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "export {name}: {field} must be non-empty"
                )));
            }
        }
        if export.policies.len() > MAX_POLICIES_PER_EXPORT {
            return Err(ConfigError::Invalid(format!("export {name}: too many policies")));
        }
        if let Some(policy) = export.policies.keys().find(|policy| policy.segments().is_none()) {
            return Err(ConfigError::Invalid(format!(
                "export {name}: malformed policy name {policy}"
            )));
        }
    }
    Ok(())
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Default shutdown timeout.
const fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Default `SQLite` busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}
