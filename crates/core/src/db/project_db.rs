use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use crate::db::{BinaryRecord, MetadataRecord};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A stored metadata value is not valid JSON.
    #[error("Invalid metadata JSON for {binary}/{key}: {source}")]
    InvalidMetadata {
        binary: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed project database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for querying and updating records.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database with the current schema.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a binary record and return its row id.
    pub fn insert_binary(&self, record: &BinaryRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO binaries (name, path, arch, hash)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.name, record.path, record.arch, record.hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all binaries (ordered by id).
    pub fn list_binaries(&self) -> DbResult<Vec<BinaryRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, path, arch, hash
            FROM binaries
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_binary)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Look up a binary by name.
    pub fn find_binary(&self, name: &str) -> DbResult<Option<BinaryRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT name, path, arch, hash FROM binaries WHERE name = ?1",
                params![name],
                map_binary,
            )
            .optional()?;
        Ok(record)
    }

    /// Read the metadata value stored under `key` for `binary`.
    pub fn query_metadata(&self, binary: &str, key: &str) -> DbResult<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE binary = ?1 AND key = ?2",
                params![binary, key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(body) => serde_json::from_str(&body).map(Some).map_err(|source| {
                DbError::InvalidMetadata {
                    binary: binary.to_string(),
                    key: key.to_string(),
                    source,
                }
            }),
            None => Ok(None),
        }
    }

    /// Store `value` under `key` for `binary`, replacing any previous value.
    pub fn store_metadata(
        &self,
        binary: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO metadata (binary, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(binary, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![binary, key, value.to_string(), now],
        )?;
        debug!(binary, key, "stored metadata");
        Ok(())
    }

    /// Delete the metadata entry for `binary`/`key`. Returns whether a row was removed.
    pub fn remove_metadata(&self, binary: &str, key: &str) -> DbResult<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM metadata WHERE binary = ?1 AND key = ?2", params![binary, key])?;
        Ok(affected > 0)
    }

    /// List every metadata entry stored for `binary` (ordered by key).
    pub fn list_metadata(&self, binary: &str) -> DbResult<Vec<MetadataRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT binary, key, value, updated_at
            FROM metadata
            WHERE binary = ?1
            ORDER BY key
            "#,
        )?;
        let rows = stmt.query_map(params![binary], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (binary, key, body, updated_at) = row?;
            let value = serde_json::from_str(&body).map_err(|source| {
                DbError::InvalidMetadata { binary: binary.clone(), key: key.clone(), source }
            })?;
            out.push(MetadataRecord { binary, key, value, updated_at });
        }
        Ok(out)
    }
}

fn map_binary(row: &rusqlite::Row<'_>) -> rusqlite::Result<BinaryRecord> {
    Ok(BinaryRecord { name: row.get(0)?, path: row.get(1)?, arch: row.get(2)?, hash: row.get(3)? })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (binaries)
/// - 2: add per-binary metadata table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS binaries (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                path TEXT NOT NULL,
                arch TEXT,
                hash TEXT
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        debug!(version = 1, "applied schema migration");
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS metadata (
                binary     TEXT NOT NULL,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY(binary, key)
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
        debug!(version = 2, "applied schema migration");
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
