//! SQLite run history

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Settings;
use crate::generation::ModelVariant;
use crate::metrics::{Metric, ScoreSet};
use crate::storage::models::EvaluationRun;

/// Database wrapper for summeval
pub struct Database {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn
            .execute(&format!("PRAGMA user_version = {}", version), [])?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                example_count INTEGER NOT NULL,
                use_stemmer INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_created_at
                ON runs(created_at DESC);

            CREATE TABLE IF NOT EXISTS run_scores (
                run_id TEXT NOT NULL,
                variant TEXT NOT NULL,
                metric TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (run_id, variant, metric),
                FOREIGN KEY (run_id) REFERENCES runs(id) ON DELETE CASCADE
            );
            "#,
        )?;

        Ok(())
    }

    /// Insert a run and its scores in one transaction
    pub fn insert_run(&self, run: &EvaluationRun) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO runs (id, source, example_count, use_stemmer, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                run.id,
                run.source,
                run.example_count as i64,
                run.use_stemmer,
                run.created_at.timestamp(),
            ],
        )?;

        for (variant, scores) in &run.scores {
            for (metric, value) in scores.iter() {
                tx.execute(
                    "INSERT INTO run_scores (run_id, variant, metric, value) VALUES (?1, ?2, ?3, ?4)",
                    params![run.id, variant.as_str(), metric.as_str(), value],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a run by ID
    pub fn get_run(&self, id: &str) -> Result<Option<EvaluationRun>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, source, example_count, use_stemmer, created_at FROM runs WHERE id = ?1",
                params![id],
                Self::row_to_run,
            )
            .optional()?;

        self.with_scores(run)
    }

    /// Find a run by ID prefix
    pub fn find_run_by_prefix(&self, prefix: &str) -> Result<Option<EvaluationRun>> {
        let pattern = format!("{}%", prefix);

        let run = self
            .conn
            .query_row(
                "SELECT id, source, example_count, use_stemmer, created_at FROM runs WHERE id LIKE ?1 LIMIT 1",
                params![pattern],
                Self::row_to_run,
            )
            .optional()?;

        self.with_scores(run)
    }

    /// List runs, newest first
    pub fn list_runs(&self, limit: usize) -> Result<Vec<EvaluationRun>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source, example_count, use_stemmer, created_at
             FROM runs
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], Self::row_to_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        runs.into_iter()
            .map(|run| -> Result<EvaluationRun> {
                let scores = self.get_scores(&run.id)?;
                Ok(run.with_scores(scores))
            })
            .collect()
    }

    /// Delete a run and its scores
    pub fn delete_run(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM runs WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of stored runs
    pub fn count_runs(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn with_scores(&self, run: Option<EvaluationRun>) -> Result<Option<EvaluationRun>> {
        match run {
            Some(run) => {
                let scores = self.get_scores(&run.id)?;
                Ok(Some(run.with_scores(scores)))
            }
            None => Ok(None),
        }
    }

    fn get_scores(&self, run_id: &str) -> Result<BTreeMap<ModelVariant, ScoreSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT variant, metric, value FROM run_scores WHERE run_id = ?1",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut scores: BTreeMap<ModelVariant, ScoreSet> = BTreeMap::new();
        for (variant, metric, value) in rows {
            let (Ok(variant), Ok(metric)) =
                (variant.parse::<ModelVariant>(), metric.parse::<Metric>())
            else {
                tracing::warn!("Skipping unrecognized score row {}/{}", variant, metric);
                continue;
            };
            scores.entry(variant).or_default().insert(metric, value);
        }

        Ok(scores)
    }

    // Helper to convert a row to a run without scores
    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<EvaluationRun> {
        let example_count: i64 = row.get(2)?;
        let created_timestamp: i64 = row.get(4)?;

        Ok(EvaluationRun {
            id: row.get(0)?,
            source: row.get(1)?,
            example_count: example_count.max(0) as usize,
            use_stemmer: row.get(3)?,
            created_at: Utc
                .timestamp_opt(created_timestamp, 0)
                .single()
                .unwrap_or_default(),
            scores: BTreeMap::new(),
        })
    }
}
