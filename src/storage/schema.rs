use rusqlite::Connection;

use crate::error::{NoteResult, StorageContext};

pub fn apply(conn: &Connection) -> NoteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            text TEXT NOT NULL,
            ts TEXT NOT NULL
        );
        "#,
    )
    .storage("applying schema")?;
    Ok(())
}
