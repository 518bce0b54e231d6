use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::Path;

use crate::models::{ChunkResult, ImportChunkRow, ImportRun};

pub struct Database {
    conn: Connection,
}

const RUN_COLUMNS: &str = "id, source, file_hash, status, record_count, issue_count,
    success_count, error_count, skipped_count, message, created_at, updated_at";

fn run_from_row(row: &Row<'_>) -> SqlResult<ImportRun> {
    Ok(ImportRun {
        id: row.get(0)?,
        source: row.get(1)?,
        file_hash: row.get(2)?,
        status: row.get(3)?,
        record_count: row.get(4)?,
        issue_count: row.get(5)?,
        success_count: row.get(6)?,
        error_count: row.get(7)?,
        skipped_count: row.get(8)?,
        message: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl Database {
    pub fn new(db_path: &Path) -> SqlResult<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![
            (
                "001_create_settings.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/001_create_settings.sql"
                )),
            ),
            (
                "002_create_import_runs.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/002_create_import_runs.sql"
                )),
            ),
            (
                "003_create_import_chunks.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/003_create_import_chunks.sql"
                )),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> SqlResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        stmt.query_row(params![key], |row| row.get(0)).optional()
    }

    pub fn insert_run(&self, run: &ImportRun) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO import_runs (
                id, source, file_hash, status, record_count, issue_count,
                success_count, error_count, skipped_count, message, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                run.id,
                run.source,
                run.file_hash,
                run.status,
                run.record_count,
                run.issue_count,
                run.success_count,
                run.error_count,
                run.skipped_count,
                run.message,
                run.created_at,
                run.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn insert_chunks(&mut self, run_id: &str, chunks: &[ChunkResult]) -> SqlResult<()> {
        let tx = self.conn.transaction()?;
        for chunk in chunks {
            tx.execute(
                "INSERT OR REPLACE INTO import_chunks (
                    run_id, ordinal, size, success_count, error_count, failed, message
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    run_id,
                    chunk.ordinal as i64,
                    chunk.size as i64,
                    chunk.success_count as i64,
                    chunk.error_count as i64,
                    chunk.failed,
                    chunk.message
                ],
            )?;
        }
        tx.commit()
    }

    pub fn get_run(&self, id: &str) -> SqlResult<Option<ImportRun>> {
        let sql = format!("SELECT {} FROM import_runs WHERE id = ?1", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_row(params![id], run_from_row).optional()
    }

    pub fn get_chunks(&self, run_id: &str) -> SqlResult<Vec<ImportChunkRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, ordinal, size, success_count, error_count, failed, message
             FROM import_chunks WHERE run_id = ?1 ORDER BY ordinal",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok(ImportChunkRow {
                run_id: row.get(0)?,
                ordinal: row.get(1)?,
                size: row.get(2)?,
                success_count: row.get(3)?,
                error_count: row.get(4)?,
                failed: row.get(5)?,
                message: row.get(6)?,
            })
        })?;

        rows.collect()
    }

    pub fn list_runs(&self, limit: usize) -> SqlResult<Vec<ImportRun>> {
        let sql = format!(
            "SELECT {} FROM import_runs ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            RUN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], run_from_row)?;
        rows.collect()
    }

    /// Whether a file with this hash was already imported completely.
    pub fn was_imported(&self, file_hash: &str) -> SqlResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM import_runs WHERE file_hash = ?1 AND status = 'imported' LIMIT 1",
                params![file_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Whether any run, whatever its outcome, was recorded for this hash.
    pub fn has_run_for_hash(&self, file_hash: &str) -> SqlResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM import_runs WHERE file_hash = ?1 LIMIT 1",
                params![file_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
