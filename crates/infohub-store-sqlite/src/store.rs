// crates/infohub-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Export Store
// Description: Durable ConfigurationStore backed by SQLite.
// Purpose: Persist export configurations with case-insensitive names.
// Dependencies: infohub-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each export configuration is stored as one JSON row keyed by
//! [`ExportName::lookup_key`], the Unicode case-folded name, so `TestExport`
//! and `testexport` (or `Überblick` and `überblick`) address the same record.
//! The name as written is kept alongside the key and returned by lookups. Rows are size-checked and decoded on every lookup; a row whose
//! payload is oversized, undecodable, or names a different export is reported
//! as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use infohub_core::ConfigurationStore;
use infohub_core::ExportConfiguration;
use infohub_core::ExportName;
use infohub_core::HubError;
use infohub_core::RequestContext;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 2;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum serialized export configuration size accepted by the store.
pub const MAX_CONFIG_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` export store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with default pragmas for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row failed validation.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Payload exceeded size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for HubError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Invalid(_) | SqliteStoreError::TooLarge { .. } => {
                Self::bad_request(error.to_string())
            }
            SqliteStoreError::Io(_)
            | SqliteStoreError::Db(_)
            | SqliteStoreError::Corrupt(_)
            | SqliteStoreError::VersionMismatch(_) => Self::internal(error.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed export configuration store.
#[derive(Clone)]
pub struct SqliteExportStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteExportStore {
    /// Opens an `SQLite`-backed export store, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Inserts or replaces an export configuration.
    ///
    /// A replacement adopts the spelling of the new record's name.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the record is invalid or the write fails.
    pub fn put(&self, config: &ExportConfiguration) -> Result<(), SqliteStoreError> {
        if config.export_name.as_str().is_empty() {
            return Err(SqliteStoreError::Invalid("export name must be non-empty".to_string()));
        }
        let payload =
            serde_json::to_vec(config).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if payload.len() > MAX_CONFIG_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_CONFIG_BYTES,
                actual_bytes: payload.len(),
            });
        }
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO exports (name_key, export_name, config_json, updated_at) \
                 VALUES (?1, ?2, ?3, ?4) ON CONFLICT(name_key) DO UPDATE SET \
                 export_name = excluded.export_name, config_json = excluded.config_json, \
                 updated_at = excluded.updated_at",
                params![
                    config.export_name.lookup_key(),
                    config.export_name.as_str(),
                    payload,
                    unix_millis()
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Deletes an export configuration. Returns true when a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn delete(&self, name: &ExportName) -> Result<bool, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let removed = guard
            .execute("DELETE FROM exports WHERE name_key = ?1", params![name.lookup_key()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(removed > 0)
    }

    /// Lists stored export names in case-insensitive order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn list(&self) -> Result<Vec<ExportName>, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let mut statement = guard
            .prepare("SELECT export_name FROM exports ORDER BY name_key")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let names = statement
            .query_map(params![], |row| row.get::<_, String>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            .map(|row| row.map(ExportName::new).map_err(|err| SqliteStoreError::Db(err.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Loads an export configuration; `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or the row is corrupt.
    pub fn load(&self, name: &ExportName) -> Result<Option<ExportConfiguration>, SqliteStoreError> {
        let row = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let length: Option<i64> = guard
                .query_row(
                    "SELECT length(config_json) FROM exports WHERE name_key = ?1",
                    params![name.lookup_key()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let Some(length) = length else {
                return Ok(None);
            };
            let length = usize::try_from(length).map_err(|_| {
                SqliteStoreError::Corrupt(format!("negative config length for export {name}"))
            })?;
            if length > MAX_CONFIG_BYTES {
                return Err(SqliteStoreError::Corrupt(format!(
                    "config for export {name} exceeds size limit: {length} bytes (max \
                     {MAX_CONFIG_BYTES})"
                )));
            }
            let row: (String, Vec<u8>) = guard
                .query_row(
                    "SELECT export_name, config_json FROM exports WHERE name_key = ?1",
                    params![name.lookup_key()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            row
        };
        let (stored_name, bytes) = row;
        let config: ExportConfiguration = serde_json::from_slice(&bytes).map_err(|err| {
            SqliteStoreError::Corrupt(format!("invalid config for export {stored_name}: {err}"))
        })?;
        if config.export_name.as_str() != stored_name {
            return Err(SqliteStoreError::Corrupt(
                "export name mismatch between key and payload".to_string(),
            ));
        }
        Ok(Some(config))
    }
}

impl ConfigurationStore for SqliteExportStore {
    fn export_configuration(
        &self,
        ctx: &RequestContext,
        name: &ExportName,
    ) -> Result<ExportConfiguration, HubError> {
        ctx.check()?;
        self.load(name)?.ok_or_else(|| HubError::not_found("export configuration not found"))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS exports (
                    name_key TEXT PRIMARY KEY,
                    export_name TEXT NOT NULL,
                    config_json BLOB NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
