//! Database module
//!
//! Handles SQLite connection and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

/// Open an in-memory connection with the full schema applied
#[cfg(test)]
pub(crate) fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("PRAGMA foreign_keys = ON;").expect("enable foreign keys");
    migrations::run_migrations(&conn).expect("run migrations");
    conn
}

/// In-memory pooled database with the full schema applied
#[cfg(test)]
pub(crate) fn test_db() -> Database {
    let db = Database::in_memory().expect("in-memory pool");
    db.with_conn(migrations::run_migrations).expect("run migrations");
    db
}
