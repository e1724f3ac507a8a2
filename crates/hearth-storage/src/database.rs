// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use hearth_core::HearthError;
use tracing::debug;

/// Handle to the single SQLite connection.
///
/// Wraps a `tokio_rusqlite::Connection` whose background thread serializes
/// all closure calls, eliminating SQLITE_BUSY errors under concurrent access.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, applies PRAGMAs, and runs
    /// all pending migrations.
    pub async fn open(path: &str) -> Result<Self, HearthError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| HearthError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            crate::migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so all committed data reaches the main file.
    pub async fn close(&self) -> Result<(), HearthError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> HearthError {
    HearthError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_and_runs_migrations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open_test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        // The migrated schema should be queryable.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/hearth.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        {
            let db = Database::open(path.to_str().unwrap()).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open re-runs the migration runner, which must be a no-op.
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
