//! SQLite storage backend.
//!
//! Holds key metadata and sealed records in a single SQLite file. Byte
//! columns (salt, IVs, ciphertext) are stored as standard Base64 text, the
//! same encoding they use on the wire. Nothing stored here can be read
//! without the user's passphrase.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use uuid::Uuid;

use crate::crypto::{encoding, EncryptedPayload, KeyMetadata, Salt};
use crate::error::{Result, VaultError};
use crate::records::{EncryptedRecord, NewRecord, RecordKind};
use crate::storage::traits::{KeyMetadataStore, RecordStore};

use row::{RecordRow, RECORD_COLUMNS};

/// Schema version written to the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS key_metadata (
        user_id TEXT PRIMARY KEY,
        encryption_key_salt TEXT NOT NULL,
        encryption_test_iv TEXT NOT NULL,
        encrypted_test_data TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        encrypted_data TEXT NOT NULL,
        iv TEXT NOT NULL,
        -- Per-record salt from old clients; read only
        salt TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        FOREIGN KEY(user_id) REFERENCES key_metadata(user_id)
    );

    CREATE INDEX IF NOT EXISTS idx_records_user_kind
        ON records(user_id, kind, created_at);
"#;

/// SQLite-backed key metadata and record store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new store file and initialize its schema.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Storage` if the file already exists.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(VaultError::Storage(format!(
                "Store file already exists: {}",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        let store = Self::initialize(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "created store");
        Ok(store)
    }

    /// Open an existing store file.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if the file does not exist, or
    /// `VaultError::Storage` if it is not a Client Vault store.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::NotFound(format!(
                "Store file not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| VaultError::Storage(format!("Not a Client Vault store: {}", e)))?;
        match version.as_deref() {
            Some(FORMAT_VERSION) => {}
            Some(other) => {
                return Err(VaultError::Storage(format!(
                    "Unsupported store format version {}",
                    other
                )))
            }
            None => {
                return Err(VaultError::Storage(
                    "Not a Client Vault store: missing format version".to_string(),
                ))
            }
        }

        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Create a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, None)
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format_version(&self) -> Result<String> {
        let conn = self.lock_conn()?;
        let version = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn initialize(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?)",
            [timestamp()],
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }
}

impl KeyMetadataStore for SqliteStore {
    fn get_key_metadata(&self, user_id: &str) -> Result<Option<KeyMetadata>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT encryption_key_salt, encryption_test_iv, encrypted_test_data
                FROM key_metadata
                WHERE user_id = ?
                "#,
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((salt, iv, marker)) => Ok(Some(KeyMetadata {
                salt: Salt::from_base64(&salt)?,
                iv: encoding::decode(&iv)?,
                encrypted_marker: encoding::decode(&marker)?,
            })),
            None => Ok(None),
        }
    }

    fn set_key_metadata(&self, user_id: &str, metadata: &KeyMetadata) -> Result<()> {
        let conn = self.lock_conn()?;

        // Insert-only: the primary key refuses a second setup atomically.
        let result = conn.execute(
            r#"
            INSERT INTO key_metadata
                (user_id, encryption_key_salt, encryption_test_iv, encrypted_test_data, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                metadata.salt.to_base64(),
                encoding::encode(&metadata.iv),
                encoding::encode(&metadata.encrypted_marker),
                timestamp(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(VaultError::Conflict(format!(
                    "Encryption key already set for user '{}'",
                    user_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordStore for SqliteStore {
    fn insert_record(&self, record: &NewRecord) -> Result<Uuid> {
        let conn = self.lock_conn()?;

        let id = Uuid::new_v4();
        let now = timestamp();
        let result = conn.execute(
            r#"
            INSERT INTO records (id, user_id, kind, encrypted_data, iv, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id.to_string(),
                record.user_id,
                record.kind.as_str(),
                encoding::encode(&record.payload.ciphertext),
                encoding::encode(&record.payload.iv),
                now,
                now,
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!(record_id = %id, kind = %record.kind, "inserted record");
                Ok(id)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(VaultError::NotSetUp)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_record(&self, user_id: &str, id: &Uuid, payload: &EncryptedPayload) -> Result<()> {
        let conn = self.lock_conn()?;

        let changed = conn.execute(
            r#"
            UPDATE records
            SET encrypted_data = ?, iv = ?, salt = NULL, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                encoding::encode(&payload.ciphertext),
                encoding::encode(&payload.iv),
                timestamp(),
                id.to_string(),
                user_id,
            ],
        )?;

        if changed == 0 {
            return Err(VaultError::NotFound(format!("Record {}", id)));
        }
        tracing::debug!(record_id = %id, "updated record");
        Ok(())
    }

    fn delete_record(&self, user_id: &str, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;

        let changed = conn.execute(
            "DELETE FROM records WHERE id = ? AND user_id = ?",
            params![id.to_string(), user_id],
        )?;

        if changed == 0 {
            return Err(VaultError::NotFound(format!("Record {}", id)));
        }
        tracing::debug!(record_id = %id, "deleted record");
        Ok(())
    }

    fn get_record(&self, user_id: &str, id: &Uuid) -> Result<Option<EncryptedRecord>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM records WHERE id = ? AND user_id = ?",
                    RECORD_COLUMNS
                ),
                params![id.to_string(), user_id],
                RecordRow::from_row,
            )
            .optional()?;

        row.map(EncryptedRecord::try_from).transpose()
    }

    fn list_records(
        &self,
        user_id: &str,
        kind: Option<RecordKind>,
    ) -> Result<Vec<EncryptedRecord>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM records
            WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
            ORDER BY created_at DESC, rowid DESC
            "#,
            RECORD_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![user_id, kind.map(|k| k.as_str())],
            RecordRow::from_row,
        )?;

        // A row with an unparseable id, kind or timestamp is skipped so the
        // rest of the listing still loads.
        let mut records = Vec::new();
        for row in rows {
            let row = row?;
            let row_id = row.id.clone();
            match EncryptedRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!(
                    record_id = %row_id,
                    error = %err,
                    "skipping unreadable record row"
                ),
            }
        }

        Ok(records)
    }
}

/// Fixed-width RFC 3339 so text order matches time order.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
