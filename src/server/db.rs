//! `SQLite` report table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{Error, Result};

/// Storage format of `reportdate`.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Helper to acquire mutex lock with poison recovery.
///
/// A panic while holding the lock leaves the connection usable, so the
/// poisoned guard is recovered with a warning instead of failing every
/// later request.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}

/// A stored report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Row id.
    pub reportid: i64,
    /// Item name.
    pub itemname: String,
    /// Description.
    pub description: String,
    /// Where the item was lost or found.
    pub location: String,
    /// Found (true) or lost (false).
    pub is_found: bool,
    /// Reporter contact.
    pub contact: String,
    /// Photo data URI.
    pub imgurl: Option<String>,
    /// Creation time, second precision.
    pub reportdate: DateTime<Utc>,
}

/// Values for a new report row.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    /// Item name.
    pub itemname: String,
    /// Description.
    pub description: String,
    /// Where the item was lost or found.
    pub location: String,
    /// Found (true) or lost (false).
    pub is_found: bool,
    /// Reporter contact.
    pub contact: String,
    /// Photo data URI.
    pub imgurl: Option<String>,
}

/// Report table behind a single connection.
pub struct ReportDb {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl ReportDb {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_db_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_sqlite".to_string(),
            cause: e.to_string(),
        })?;
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "busy_timeout", "5000");

        let db = Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Creates an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_sqlite_memory".to_string(),
            cause: e.to_string(),
        })?;

        let db = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Returns the database path, `None` when in memory.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS report (
                reportid INTEGER PRIMARY KEY AUTOINCREMENT,
                itemname TEXT NOT NULL,
                description TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                isFound INTEGER NOT NULL DEFAULT 0,
                contact TEXT NOT NULL DEFAULT '',
                imgurl TEXT,
                reportdate TEXT NOT NULL
            );",
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_report_table".to_string(),
            cause: e.to_string(),
        })
    }

    /// Returns every report, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<ReportRow>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT reportid, itemname, description, location, isFound, contact, imgurl, reportdate
                 FROM report ORDER BY reportid ASC",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "prepare_list_reports".to_string(),
                cause: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], row_to_report)
            .map_err(|e| Error::OperationFailed {
                operation: "list_reports".to_string(),
                cause: e.to_string(),
            })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::OperationFailed {
                operation: "read_report_row".to_string(),
                cause: e.to_string(),
            })
    }

    /// Inserts a report stamped with the current time and returns the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert(&self, report: &NewReport) -> Result<ReportRow> {
        let now = Utc::now();
        let reportdate = now.format(REPORT_DATE_FORMAT).to_string();

        let conn = acquire_lock(&self.conn);
        conn.execute(
            "INSERT INTO report (itemname, description, location, isFound, contact, imgurl, reportdate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.itemname,
                report.description,
                report.location,
                i64::from(report.is_found),
                report.contact,
                report.imgurl,
                reportdate,
            ],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "insert_report".to_string(),
            cause: e.to_string(),
        })?;
        let reportid = conn.last_insert_rowid();

        conn.query_row(
            "SELECT reportid, itemname, description, location, isFound, contact, imgurl, reportdate
             FROM report WHERE reportid = ?1",
            params![reportid],
            row_to_report,
        )
        .map_err(|e| Error::OperationFailed {
            operation: "read_inserted_report".to_string(),
            cause: e.to_string(),
        })
    }

    /// Deletes a report. Returns false if no row had that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, reportid: i64) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        let exists: Option<i64> = conn
            .query_row(
                "SELECT reportid FROM report WHERE reportid = ?1",
                params![reportid],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::OperationFailed {
                operation: "find_report".to_string(),
                cause: e.to_string(),
            })?;
        if exists.is_none() {
            return Ok(false);
        }

        conn.execute("DELETE FROM report WHERE reportid = ?1", params![reportid])
            .map_err(|e| Error::OperationFailed {
                operation: "delete_report".to_string(),
                cause: e.to_string(),
            })?;
        Ok(true)
    }
}

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    let reportdate: String = row.get(7)?;
    let reportdate = NaiveDateTime::parse_from_str(&reportdate, REPORT_DATE_FORMAT)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?
        .and_utc();

    Ok(ReportRow {
        reportid: row.get(0)?,
        itemname: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        is_found: row.get::<_, i64>(4)? != 0,
        contact: row.get(5)?,
        imgurl: row.get(6)?,
        reportdate,
    })
}
