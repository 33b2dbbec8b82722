use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default number of sessions kept.
pub const DEFAULT_RETENTION: usize = 20;

/// Summary of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub wpm: u32,
    pub accuracy: u32,
    #[serde(alias = "word_count")]
    pub word_count: usize,
    #[serde(rename = "elapsedSeconds", alias = "elapsedSecs", alias = "elapsed_secs")]
    pub elapsed_secs: u64,
    #[serde(default)]
    pub characters: usize,
}

impl HistoryEntry {
    fn sort_key(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Append-only session log listed newest first and capped to a retention count.
pub trait HistoryStore {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()>;

    /// Up to `limit` entries, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;

    fn clear(&mut self) -> Result<()>;

    /// Inserts every entry or none of them.
    fn import(&mut self, entries: &[HistoryEntry]) -> Result<usize>;

    fn retention(&self) -> usize;

    fn all(&self) -> Result<Vec<HistoryEntry>> {
        self.recent(self.retention())
    }
}

/// Volatile store used by tests and `--no-history`.
#[derive(Debug)]
pub struct MemoryHistory {
    // newest at the front
    entries: VecDeque<HistoryEntry>,
    retention: usize,
}

impl MemoryHistory {
    pub fn new(retention: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            retention,
        }
    }

    fn insert_sorted(&mut self, entry: &HistoryEntry) {
        let key = entry.sort_key();
        let pos = self
            .entries
            .iter()
            .position(|e| e.sort_key() <= key)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry.clone());
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        self.insert_sorted(entry);
        self.entries.truncate(self.retention);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn import(&mut self, entries: &[HistoryEntry]) -> Result<usize> {
        for entry in entries {
            self.insert_sorted(entry);
        }
        self.entries.truncate(self.retention);
        Ok(entries.len())
    }

    fn retention(&self) -> usize {
        self.retention
    }
}

/// SQLite-backed store under the state directory.
#[derive(Debug)]
pub struct SqliteHistory {
    conn: Connection,
    retention: usize,
}

const INSERT_SQL: &str = r#"
    INSERT INTO history (ts_millis, timestamp, wpm, accuracy, word_count, elapsed_secs, characters)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

const PRUNE_SQL: &str = r#"
    DELETE FROM history WHERE id NOT IN (
        SELECT id FROM history ORDER BY ts_millis DESC, id DESC LIMIT ?1
    )
"#;

impl SqliteHistory {
    pub fn open<P: AsRef<Path>>(path: P, retention: usize) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening history database");
        Self::init(Connection::open(path)?, retention)
    }

    pub fn open_in_memory(retention: usize) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, retention)
    }

    fn init(conn: Connection, retention: usize) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts_millis INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                word_count INTEGER NOT NULL,
                elapsed_secs INTEGER NOT NULL,
                characters INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_ts ON history(ts_millis)",
            [],
        )?;

        let mut store = Self { conn, retention };
        store.prune()?;
        Ok(store)
    }

    fn prune(&mut self) -> Result<()> {
        let removed = self.conn.execute(PRUNE_SQL, [self.retention as i64])?;
        if removed > 0 {
            debug!(removed, retention = self.retention, "pruned history");
        }
        Ok(())
    }
}

fn insert_params(entry: &HistoryEntry) -> (i64, String, i64, i64, i64, i64, i64) {
    (
        entry.sort_key(),
        entry.timestamp.to_rfc3339(),
        entry.wpm as i64,
        entry.accuracy as i64,
        entry.word_count as i64,
        entry.elapsed_secs as i64,
        entry.characters as i64,
    )
}

impl HistoryStore for SqliteHistory {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        let p = insert_params(entry);
        self.conn
            .execute(INSERT_SQL, params![p.0, p.1, p.2, p.3, p.4, p.5, p.6])?;
        self.prune()
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, wpm, accuracy, word_count, elapsed_secs, characters
            FROM history
            ORDER BY ts_millis DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let timestamp_str: String = row.get(0)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        0,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryEntry {
                timestamp,
                wpm: row.get::<_, i64>(1)? as u32,
                accuracy: row.get::<_, i64>(2)? as u32,
                word_count: row.get::<_, i64>(3)? as usize,
                elapsed_secs: row.get::<_, i64>(4)? as u64,
                characters: row.get::<_, i64>(5)? as usize,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM history", [])?;
        info!("history cleared");
        Ok(())
    }

    fn import(&mut self, entries: &[HistoryEntry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for entry in entries {
            let p = insert_params(entry);
            tx.execute(INSERT_SQL, params![p.0, p.1, p.2, p.3, p.4, p.5, p.6])?;
        }
        tx.commit()?;
        self.prune()?;
        Ok(entries.len())
    }

    fn retention(&self) -> usize {
        self.retention
    }
}

/// Parses and validates an exported JSON array without touching any store.
pub fn parse_import(json: &str) -> Result<Vec<HistoryEntry>> {
    let mut entries: Vec<HistoryEntry> =
        serde_json::from_str(json).map_err(|e| Error::InvalidHistory {
            message: e.to_string(),
        })?;

    if let Some((idx, bad)) = entries.iter().enumerate().find(|(_, e)| e.accuracy > 100) {
        return Err(Error::InvalidHistory {
            message: format!("record {idx}: accuracy {} is above 100", bad.accuracy),
        });
    }

    entries.sort_by_key(HistoryEntry::sort_key);
    Ok(entries)
}

/// Imports a JSON array, leaving the store untouched when the payload is malformed.
pub fn import_json<S: HistoryStore + ?Sized>(store: &mut S, json: &str) -> Result<usize> {
    let entries = match parse_import(json) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "rejected history import");
            return Err(e);
        }
    };
    let count = store.import(&entries)?;
    info!(count, "imported history");
    Ok(count)
}

pub fn export_json<S: HistoryStore + ?Sized>(store: &S) -> Result<String> {
    Ok(serde_json::to_string_pretty(&store.all()?)?)
}

pub fn export_csv<S: HistoryStore + ?Sized, W: Write>(store: &S, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in store.all()? {
        wtr.serialize(&entry)?;
    }
    wtr.flush()?;
    Ok(())
}
