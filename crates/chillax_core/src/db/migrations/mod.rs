//! Catalog schema migrations.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Article ids and usernames are never rewritten by a migration.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_catalog.sql"),
}];

/// Tables created by the catalog schema, in name order.
pub const CATALOG_TABLES: [&str; 5] = ["article_tags", "articles", "comments", "tags", "users"];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` to the latest catalog schema in one transaction, then
/// checks that every catalog table is present.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = schema_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS
            .iter()
            .filter(|migration| migration.version > current_version)
        {
            tx.execute_batch(migration.sql)?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        }
        tx.commit()?;
        info!("event=db_migrate module=db status=ok from_version={current_version} to_version={latest}");
    }

    ensure_catalog_tables(conn)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Returns the first catalog table absent from `conn`, in name order.
pub fn missing_catalog_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
    )?;
    for table in CATALOG_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

/// Fails with `MissingCatalogTable` unless every catalog table exists.
pub fn ensure_catalog_tables(conn: &Connection) -> DbResult<()> {
    match missing_catalog_table(conn)? {
        Some(table) => Err(DbError::MissingCatalogTable(table)),
        None => Ok(()),
    }
}
