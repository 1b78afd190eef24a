//! SQLite-backed difficulty history.
//!
//! The connection sits behind a mutex and every call runs on tokio's blocking
//! pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use ledger_kernel_core::{Difficulty, Height, Timestamp};

use super::migration;
use super::{DifficultyFeed, DifficultyHistoryStorage};
use crate::error::{CacheError, Result};
use crate::state::DifficultyInfo;

/// Difficulty history stored in a `difficulties` table.
pub struct SqliteDifficultyStorage {
    conn: Arc<Mutex<Connection>>,
    history_size: u64,
}

impl SqliteDifficultyStorage {
    /// Open (or create) a database at `path` and run migrations.
    pub fn open(path: impl AsRef<Path>, history_size: u64) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self::with_connection(conn, history_size))
    }

    /// Open an in-memory database.
    pub fn open_memory(history_size: u64) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self::with_connection(conn, history_size))
    }

    fn with_connection(conn: Connection, history_size: u64) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            history_size,
        }
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&mut conn.lock()))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))?
    }
}

fn row_to_info(row: &rusqlite::Row<'_>) -> rusqlite::Result<DifficultyInfo> {
    Ok(DifficultyInfo {
        height: Height(row.get::<_, i64>("height")? as u64),
        timestamp: Timestamp(row.get::<_, i64>("timestamp")? as u64),
        difficulty: Difficulty(row.get::<_, i64>("difficulty")? as u64),
    })
}

#[async_trait]
impl DifficultyHistoryStorage for SqliteDifficultyStorage {
    fn history_size(&self) -> u64 {
        self.history_size
    }

    async fn apply(&self, feed: &DifficultyFeed) -> Result<()> {
        let feed = feed.clone();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            for info in &feed.appended {
                tx.execute(
                    "INSERT OR REPLACE INTO difficulties (height, timestamp, difficulty)
                     VALUES (?1, ?2, ?3)",
                    params![
                        info.height.0 as i64,
                        info.timestamp.0 as i64,
                        info.difficulty.0 as i64
                    ],
                )?;
            }
            let pruned = tx.execute(
                "DELETE FROM difficulties WHERE height < ?1",
                params![feed.prune_before.0 as i64],
            )?;
            tx.commit()?;

            tracing::debug!(
                height = %feed.height,
                appended = feed.appended.len(),
                pruned,
                "applied difficulty feed"
            );
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<Vec<DifficultyInfo>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT height, timestamp, difficulty FROM difficulties ORDER BY height ASC",
            )?;
            let rows = stmt.query_map([], row_to_info)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn latest_height(&self) -> Result<Option<Height>> {
        self.blocking(|conn| {
            let height: Option<i64> = conn
                .query_row("SELECT MAX(height) FROM difficulties", [], |row| row.get(0))
                .optional()?
                .flatten();
            Ok(height.map(|h| Height(h as u64)))
        })
        .await
    }
}
