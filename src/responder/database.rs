//! Persistent SQLite store for settings, auto-replies and the message log.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::responder::settings::{DEFAULTS, Settings};

pub type Result<T> = std::result::Result<T, StoreError>;

/// A keyword and the text sent when it appears in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoReply {
    pub keyword: String,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// Aggregate counts over the message log and auto-reply table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_messages: u64,
    pub unique_senders: u64,
    pub auto_replies: u64,
}

/// The single owned store. Each method holds the connection for one
/// logical operation.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new in-memory database.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Self::init(Connection::open(path)?)?;
        let stats = db.stats()?;
        info!(
            "Loaded database from {:?} ({} messages, {} auto-replies)",
            path, stats.total_messages, stats.auto_replies
        );
        Ok(db)
    }

    fn init(conn: Connection) -> Result<Self> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_schema()?;
        Ok(db)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT
            );

            CREATE TABLE IF NOT EXISTS auto_replies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT UNIQUE,
                response TEXT
            );

            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone TEXT,
                message TEXT,
                timestamp TEXT
            );
        "#,
        )?;

        // Seed defaults without touching values the operator already set.
        for (key, value) in DEFAULTS {
            tx.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // ==================== SETTINGS ====================

    /// Stored value for `key`. No default is applied.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.set_settings(&[(key, value)])
    }

    /// Upsert several keys in one transaction.
    pub fn set_settings(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        debug!("Updated settings: {:?}", pairs.iter().map(|(k, _)| k).collect::<Vec<_>>());
        Ok(())
    }

    /// Read every setting into a typed snapshot.
    pub fn settings(&self) -> Result<Settings> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT key, value FROM settings WHERE value IS NOT NULL")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(Settings::from_rows(rows))
    }

    // ==================== AUTO-REPLIES ====================

    /// Add a keyword. The keyword is stored lowercased; an existing keyword
    /// is left untouched.
    pub fn add_auto_reply(&self, keyword: &str, response: &str) -> Result<AddOutcome> {
        let conn = self.lock();
        let result = conn.execute(
            "INSERT INTO auto_replies (keyword, response) VALUES (?1, ?2)",
            params![keyword.to_lowercase(), response],
        );

        match result {
            Ok(_) => Ok(AddOutcome::Added),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Ok(AddOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_auto_reply(&self, keyword: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "DELETE FROM auto_replies WHERE keyword = ?1",
            params![keyword.to_lowercase()],
        )?;
        Ok(())
    }

    /// All auto-replies, oldest first.
    pub fn list_auto_replies(&self) -> Result<Vec<AutoReply>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT keyword, response FROM auto_replies ORDER BY id ASC")?;
        let replies = stmt
            .query_map([], |row| {
                Ok(AutoReply {
                    keyword: row.get(0)?,
                    response: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(replies)
    }

    /// Response for the first-added keyword found anywhere in `message`,
    /// compared case-insensitively.
    pub fn find_auto_reply(&self, message: &str) -> Result<Option<String>> {
        let message = message.to_lowercase();
        let found = self
            .list_auto_replies()?
            .into_iter()
            .find(|reply| message.contains(&reply.keyword))
            .map(|reply| reply.response);
        Ok(found)
    }

    // ==================== MESSAGE LOG ====================

    pub fn save_message(&self, phone: &str, text: &str, timestamp: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO messages (phone, message, timestamp) VALUES (?1, ?2, ?3)",
            params![phone, text, timestamp],
        )?;
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats> {
        let conn = self.lock();
        let (total, unique): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT phone) FROM messages",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let auto_replies: i64 =
            conn.query_row("SELECT COUNT(*) FROM auto_replies", [], |row| row.get(0))?;

        Ok(Stats {
            total_messages: total as u64,
            unique_senders: unique as u64,
            auto_replies: auto_replies as u64,
        })
    }
}
