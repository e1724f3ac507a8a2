// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed knowledge snippet store with FTS5 for BM25 ranking.
//!
//! Snippets are indexed documents about a home (inspection notes, product
//! manuals, room measurements) tagged with an optional home/room scope.
//! Sync triggers keep the FTS5 table up to date.

use hearth_core::types::HomeScope;
use hearth_core::HearthError;
use tokio_rusqlite::Connection;

/// Helper to convert tokio_rusqlite errors into HearthError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> HearthError {
    HearthError::Storage {
        source: Box::new(e),
    }
}

/// One stored knowledge snippet row.
#[derive(Debug, Clone)]
pub struct SnippetRecord {
    pub id: String,
    pub home_id: Option<String>,
    pub room_id: Option<String>,
    pub title: Option<String>,
    pub content: String,
}

/// Persistent store for knowledge snippets in SQLite.
pub struct KnowledgeStore {
    conn: Connection,
}

impl KnowledgeStore {
    /// Opens (or creates) the index at `path` and ensures the schema exists.
    pub async fn open(path: &str) -> Result<Self, HearthError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| HearthError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path).await.map_err(|e| storage_err(e.into()))?;
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 CREATE TABLE IF NOT EXISTS snippets (
                     id TEXT PRIMARY KEY,
                     home_id TEXT,
                     room_id TEXT,
                     title TEXT,
                     content TEXT NOT NULL
                 );
                 CREATE VIRTUAL TABLE IF NOT EXISTS snippets_fts USING fts5(
                     content,
                     content='snippets',
                     content_rowid='rowid'
                 );
                 CREATE TRIGGER IF NOT EXISTS snippets_ai AFTER INSERT ON snippets BEGIN
                     INSERT INTO snippets_fts(rowid, content) VALUES (new.rowid, new.content);
                 END;
                 CREATE TRIGGER IF NOT EXISTS snippets_ad AFTER DELETE ON snippets BEGIN
                     INSERT INTO snippets_fts(snippets_fts, rowid, content)
                     VALUES ('delete', old.rowid, old.content);
                 END;
                 CREATE TRIGGER IF NOT EXISTS snippets_au AFTER UPDATE ON snippets BEGIN
                     INSERT INTO snippets_fts(snippets_fts, rowid, content)
                     VALUES ('delete', old.rowid, old.content);
                     INSERT INTO snippets_fts(rowid, content) VALUES (new.rowid, new.content);
                 END;",
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;

        Ok(Self { conn })
    }

    /// Save a snippet to the index.
    pub async fn save(&self, snippet: &SnippetRecord) -> Result<(), HearthError> {
        let s = snippet.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO snippets (id, home_id, room_id, title, content)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![s.id, s.home_id, s.room_id, s.title, s.content],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Search snippets using BM25 via FTS5, filtered to the given scope.
    ///
    /// Unscoped snippets match any scope; scoped snippets match only when the
    /// scope agrees. Returns (record, score) pairs, most relevant first.
    /// `bm25()` scores are negated so higher is better.
    pub async fn search_bm25(
        &self,
        scope: &HomeScope,
        match_query: &str,
        limit: usize,
    ) -> Result<Vec<(SnippetRecord, f64)>, HearthError> {
        let match_query = match_query.to_string();
        let home_id = scope.home_id.clone();
        let room_id = scope.room_id.clone();
        let limit = limit as i64;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT s.id, s.home_id, s.room_id, s.title, s.content,
                            -bm25(snippets_fts) AS score
                     FROM snippets_fts
                     JOIN snippets s ON s.rowid = snippets_fts.rowid
                     WHERE snippets_fts MATCH ?1
                       AND (s.home_id IS NULL OR s.home_id = ?2)
                       AND (s.room_id IS NULL OR s.room_id = ?3)
                     ORDER BY bm25(snippets_fts)
                     LIMIT ?4",
                )?;
                let rows = stmt.query_map(
                    rusqlite::params![match_query, home_id, room_id, limit],
                    |row| {
                        Ok((
                            SnippetRecord {
                                id: row.get(0)?,
                                home_id: row.get(1)?,
                                room_id: row.get(2)?,
                                title: row.get(3)?,
                                content: row.get(4)?,
                            },
                            row.get::<_, f64>(5)?,
                        ))
                    },
                )?;
                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }
}
