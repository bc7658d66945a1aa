use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::StorageOptions;
use crate::error::{NoteError, NoteResult, StorageContext};

mod schema;

/// A persisted note row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub created_at: String,
}

impl Note {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

/// Owns the single SQLite connection for the process.
///
/// The store is the only writer of durable state. Every write is a single
/// statement with bound parameters, so it is durable as soon as it returns.
pub struct NoteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl NoteStore {
    /// Opens (and on first use creates) the database file at `path`.
    pub fn open(path: &Path, options: &StorageOptions) -> NoteResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let existed = path.exists();
        let conn = Connection::open(path).storage("opening database")?;
        prepare_connection(&conn, options)?;
        schema::apply(&conn)?;
        if !existed {
            tracing::info!(path = %path.display(), "created note database");
        }
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> NoteResult<Self> {
        let conn = Connection::open_in_memory().storage("opening in-memory database")?;
        schema::apply(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn list_all(&self) -> NoteResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, text, ts FROM notes ORDER BY id ASC")
            .storage("preparing note listing")?;
        let notes = stmt
            .query_map([], Note::from_row)
            .storage("listing notes")?
            .collect::<Result<Vec<_>, _>>()
            .storage("reading note rows")?;
        Ok(notes)
    }

    pub fn get(&self, id: i64) -> NoteResult<Note> {
        self.conn
            .query_row(
                "SELECT id, title, text, ts FROM notes WHERE id = ?1",
                params![id],
                Note::from_row,
            )
            .optional()
            .storage("fetching note")?
            .ok_or(NoteError::NotFound(id))
    }

    pub fn count(&self) -> NoteResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .storage("counting notes")?;
        Ok(count as usize)
    }

    pub fn insert(&self, title: &str, text: &str, created_at: &str) -> NoteResult<i64> {
        if title.trim().is_empty() {
            return Err(NoteError::validation("note title cannot be empty"));
        }
        self.conn
            .execute(
                "INSERT INTO notes (title, text, ts) VALUES (?1, ?2, ?3)",
                params![title, text, created_at],
            )
            .storage("inserting note")?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "inserted note");
        Ok(id)
    }

    pub fn update_text(&self, id: i64, text: &str) -> NoteResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE notes SET text = ?1 WHERE id = ?2",
                params![text, id],
            )
            .storage("updating note text")?;
        if updated == 0 {
            return Err(NoteError::NotFound(id));
        }
        Ok(())
    }

    pub fn update_title(&self, id: i64, title: &str) -> NoteResult<()> {
        if title.trim().is_empty() {
            return Err(NoteError::validation("note title cannot be empty"));
        }
        let updated = self
            .conn
            .execute(
                "UPDATE notes SET title = ?1 WHERE id = ?2",
                params![title, id],
            )
            .storage("updating note title")?;
        if updated == 0 {
            return Err(NoteError::NotFound(id));
        }
        Ok(())
    }

    /// Removes the row if present. Returns whether anything was deleted.
    pub fn delete(&self, id: i64) -> NoteResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .storage("deleting note")?;
        Ok(removed > 0)
    }

    pub fn close(self) -> NoteResult<()> {
        self.conn
            .close()
            .map_err(|(_, source)| NoteError::Storage {
                context: "closing database",
                source,
            })?;
        tracing::debug!("note database closed");
        Ok(())
    }
}

fn prepare_connection(conn: &Connection, options: &StorageOptions) -> NoteResult<()> {
    conn.busy_timeout(Duration::from_millis(options.busy_timeout_ms))
        .storage("setting busy timeout")?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .storage("setting journal_mode=WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .storage("setting synchronous=NORMAL")?;
    Ok(())
}

/// Creation timestamp in the human-readable form stored in the `ts` column.
pub fn timestamp_now() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

pub fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.format(&format_description!(
        "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
    ))
    .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}
