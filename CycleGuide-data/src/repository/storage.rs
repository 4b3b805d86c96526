use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::models::period::PeriodRecord;
use crate::database::DatabasePool;
use super::errors::RepositoryError;

/// Database storage operations for period records
pub struct DatabaseStorage;

const SELECT_COLUMNS: &str =
    "SELECT id, owner_id, start_date, end_date, flow, notes, created_at FROM period_records";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PeriodRecord> {
    Ok(PeriodRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        flow: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl DatabaseStorage {
    /// Store a record in the database
    pub async fn store_record(pool: &DatabasePool, record: &PeriodRecord) -> Result<(), RepositoryError> {
        debug!("Storing period record in database: id={}", record.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO period_records
                     (id, owner_id, start_date, end_date, flow, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.id,
                        record.owner_id,
                        record.start_date,
                        record.end_date,
                        record.flow,
                        record.notes,
                        record.created_at,
                    ],
                )?;

                Ok(())
            }
        }
    }

    /// Get a record by ID from the database
    pub async fn get_by_id(pool: &DatabasePool, id: &str) -> Result<Option<PeriodRecord>, RepositoryError> {
        debug!("Getting period record by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
                let record = stmt.query_row(params![id], record_from_row).optional()?;
                Ok(record)
            }
        }
    }

    /// List an owner's records in insertion order
    pub async fn list_by_owner(pool: &DatabasePool, owner_id: &str) -> Result<Vec<PeriodRecord>, RepositoryError> {
        debug!("Listing period records from database: owner={}", owner_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE owner_id = ?1 ORDER BY seq ASC",
                    SELECT_COLUMNS
                ))?;

                let rows = stmt.query_map(params![owner_id], record_from_row)?;

                let mut result = Vec::new();
                for record in rows {
                    result.push(record?);
                }

                Ok(result)
            }
        }
    }

    /// Delete a record, returning whether a row was removed
    pub async fn delete(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting period record from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let affected = conn.execute("DELETE FROM period_records WHERE id = ?1", params![id])?;
                Ok(affected > 0)
            }
        }
    }
}
