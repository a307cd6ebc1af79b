//! Append-only history of classified sentences.
//!
//! Backed by a single SQLite file with one table:
//!
//! ```sql
//! sentiments(id INTEGER PRIMARY KEY, text TEXT NOT NULL, sentiment TEXT NOT NULL, timestamp TEXT NOT NULL)
//! ```
//!
//! Every operation opens its own connection and closes it before returning, so no
//! handle outlives a call. Concurrent writers rely on SQLite's locking with a bounded
//! busy timeout.
//!
//! ```rust,no_run
//! use vi_sentiment::history::HistoryStore;
//! use vi_sentiment::sentiment::Sentiment;
//!
//! # fn main() -> vi_sentiment::error::Result<()> {
//! let store = HistoryStore::new("data/sentiments.db");
//! store.append("Hôm nay tôi rất vui", &Sentiment::Positive)?;
//!
//! for record in store.recent(50)? {
//!     println!("{} | {} | {}", record.timestamp, record.text, record.sentiment);
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SentimentError};
use crate::sentiment::Sentiment;

/// File name of the default database.
pub const DEFAULT_DB_FILE: &str = "sentiments.db";

/// Format of [`SentimentRecord::timestamp`]; sorts chronologically as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// One stored classification. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    /// Surrogate key assigned by the store.
    pub id: i64,
    /// Original input, before normalization.
    pub text: String,
    /// Label the sentence was classified with.
    pub sentiment: Sentiment,
    /// Local insert time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Handle to the history database file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Use the database at `path`. Nothing is created until the first [`append`](Self::append).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a classified sentence and return its id.
    ///
    /// Creates the parent directory, the file and the table when missing.
    ///
    /// # Errors
    ///
    /// [`SentimentError::Storage`] if the database cannot be created, opened or written.
    pub fn append(&self, text: &str, sentiment: &Sentiment) -> Result<i64> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SentimentError::Storage(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

        let conn = self.connect(OpenFlags::default())?;
        ensure_schema(&conn)?;
        conn.execute(
            "INSERT INTO sentiments (text, sentiment, timestamp) VALUES (?1, ?2, ?3)",
            params![text, sentiment.as_str(), timestamp],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!(
            id,
            sentiment = %sentiment,
            path = %self.path.display(),
            "history record saved"
        );
        Ok(id)
    }

    /// Up to `limit` records, newest first.
    ///
    /// A database that does not exist yet reads as empty.
    ///
    /// # Errors
    ///
    /// [`SentimentError::Storage`] if an existing database cannot be opened or read.
    pub fn recent(&self, limit: usize) -> Result<Vec<SentimentRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let conn = self.connect(OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        if !has_table(&conn)? {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT id, text, sentiment, timestamp FROM sentiments
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![limit], |row| {
                Ok(SentimentRecord {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    sentiment: Sentiment::from(row.get::<_, String>(2)?),
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(count = records.len(), path = %self.path.display(), "history loaded");
        Ok(records)
    }

    fn connect(&self, flags: OpenFlags) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            SentimentError::Storage(format!(
                "Failed to open '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

impl Default for HistoryStore {
    /// `sentiments.db` next to the running executable, or in the working directory
    /// when the executable path is unknown.
    fn default() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self::new(dir.join(DEFAULT_DB_FILE))
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sentiments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            sentiment TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )",
    )?;
    Ok(())
}

fn has_table(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sentiments'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("nested").join(DEFAULT_DB_FILE))
    }

    #[test]
    fn recent_on_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.recent(50).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn append_creates_directories_and_schema() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let id = store.append("Hôm nay tôi rất vui", &Sentiment::Positive).unwrap();
        assert!(store.path().exists());

        let records = store.recent(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].text, "Hôm nay tôi rất vui");
        assert_eq!(records[0].sentiment, Sentiment::Positive);
    }

    #[test]
    fn timestamp_has_second_resolution_format() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append("abcde", &Sentiment::Neutral).unwrap();

        let ts = &store.recent(1).unwrap()[0].timestamp;
        assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(ts.len(), 19);
    }

    #[test]
    fn ids_are_monotonic() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let a = store.append("một", &Sentiment::Negative).unwrap();
        let b = store.append("hai", &Sentiment::Negative).unwrap();
        assert!(b > a);
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let label = Sentiment::Other("WEIRD_TAG".into());
        store.append("lạ thật", &label).unwrap();
        assert_eq!(store.recent(1).unwrap()[0].sentiment, label);
    }

    #[test]
    fn user_text_is_bound_not_interpolated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let hostile = "x'); DROP TABLE sentiments; --";
        store.append(hostile, &Sentiment::Neutral).unwrap();
        store.append("vẫn còn", &Sentiment::Neutral).unwrap();

        let records = store.recent(10).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.text == hostile));
    }

    #[test]
    fn existing_file_without_table_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DB_FILE);
        Connection::open(&path).unwrap();
        assert!(HistoryStore::new(&path).recent(5).unwrap().is_empty());
    }

    #[test]
    fn unwritable_location_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = HistoryStore::new(blocker.join(DEFAULT_DB_FILE));
        let err = store.append("abcde", &Sentiment::Positive).unwrap_err();
        assert!(matches!(err, SentimentError::Storage(_)));
    }
}
