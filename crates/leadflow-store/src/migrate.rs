use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension, Transaction};

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_init.sql",
    sql: include_str!("../migrations/001_init.sql"),
}];

/// Applies pending migrations in one transaction. Versions count applied
/// entries of `MIGRATIONS`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS leadflow_schema (version INTEGER NOT NULL);")?;
    let current = read_version(&tx)?.unwrap_or(0);
    let latest = MIGRATIONS.len() as i64;
    if current > latest {
        return Err(StoreError::Migration(format!(
            "database schema version {current} is newer than this build ({latest})"
        )));
    }

    for (version, migration) in (1..).zip(MIGRATIONS) {
        if version <= current {
            continue;
        }
        tx.execute_batch(migration.sql)
            .map_err(|err| StoreError::Migration(format!("{}: {err}", migration.name)))?;
    }
    if current < latest {
        write_version(&tx, latest)?;
    }

    tx.commit()?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'leadflow_schema';",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Ok(0);
    }
    Ok(read_version(conn)?.unwrap_or(0))
}

fn read_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT version FROM leadflow_schema;")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    match versions.as_slice() {
        [] => Ok(None),
        [version] => Ok(Some(*version)),
        rows => Err(StoreError::Migration(format!(
            "expected one schema version row, found {}",
            rows.len()
        ))),
    }
}

fn write_version(tx: &Transaction<'_>, version: i64) -> Result<()> {
    tx.execute("DELETE FROM leadflow_schema;", [])?;
    tx.execute(
        "INSERT INTO leadflow_schema (version) VALUES (?1);",
        [version],
    )?;
    Ok(())
}
