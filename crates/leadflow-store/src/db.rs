use crate::error::{Result, StoreError};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Busy wait for writers queued behind another connection's immediate
/// transaction.
pub const BUSY_TIMEOUT_MS: i64 = 5_000;

pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    restrict_db_permissions(path)?;
    configure(&conn, true)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn, false)?;
    Ok(conn)
}

fn configure(conn: &Connection, on_disk: bool) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)?;
    if on_disk {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }

    // Interaction cleanup and owner checks rely on enforced foreign keys.
    let enforced: i64 = conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
    if enforced != 1 {
        return Err(StoreError::Migration(
            "sqlite build does not enforce foreign keys".to_string(),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_db_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_db_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
