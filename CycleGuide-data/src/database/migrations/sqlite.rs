use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_period_records_table(conn)?;
    create_period_owner_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the period records table
///
/// Listing relies on `seq` to return records in insertion order.
fn create_period_records_table(conn: &Connection) -> Result<(), String> {
    info!("Creating period_records table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS period_records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            owner_id TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            flow TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on owner for per-user listing
fn create_period_owner_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on owner_id");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_period_records_owner
        ON period_records (owner_id, seq)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'period_records'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
