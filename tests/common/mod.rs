//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use rusqlite::Connection;
use sheetload::connection::SqliteSession;
use tempfile::TempDir;

/// Open a fresh in-memory SQLite session.
pub fn memory_session() -> SqliteSession {
    SqliteSession::open_in_memory().expect("in-memory SQLite should open")
}

/// Borrow the raw connection of a session for assertions.
pub fn raw(session: &SqliteSession) -> &Connection {
    session.connection().expect("session should be open")
}

/// Number of rows in `table`.
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
        row.get(0)
    })
    .expect("COUNT(*) should succeed")
}

/// `(name, declared type)` of every column of `table`, in order.
pub fn table_columns(conn: &Connection, table: &str) -> Vec<(String, String)> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{table}\")"))
        .expect("PRAGMA should prepare");
    stmt.query_map([], |row| Ok((row.get(1)?, row.get(2)?)))
        .expect("PRAGMA should run")
        .collect::<Result<Vec<_>, _>>()
        .expect("PRAGMA rows should decode")
}

/// Whether `table` exists.
pub fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .expect("sqlite_master query should succeed")
        == 1
}

/// Write `content` to `name` inside `dir`.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("file should be created");
    file.write_all(content.as_bytes())
        .expect("file should be written");
    path
}
