//! Database connection and operations

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::record::DdlRecord;
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        tracing::debug!(path = %path.display(), "Opened record store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Insert a new record or replace the link of an existing one
    pub fn save_ddl_record(&self, record: &DdlRecord) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO ddl_info (id, link, status, jd2_job_id, updated_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    record.id,
                    record.link,
                    record.status,
                    record.jd2_job_id,
                    record.updated_date,
                ],
            )?;
            Ok(())
        })
    }

    /// Set the JD2 job id, status and update time of a record, creating it if missing.
    ///
    /// Columns not named here are left untouched on an existing row.
    pub fn upsert_ddl_job(
        &self,
        id: &str,
        jd2_job_id: &str,
        status: &str,
        updated_date: &str,
    ) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO ddl_info (id, status, jd2_job_id, updated_date)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    status = excluded.status,
                    jd2_job_id = excluded.jd2_job_id,
                    updated_date = excluded.updated_date",
                rusqlite::params![id, status, jd2_job_id, updated_date],
            )?;
            Ok(())
        })?;

        tracing::debug!(record_id = %id, job_id = %jd2_job_id, status = %status, "Upserted ddl_info job");

        Ok(())
    }

    pub fn get_ddl_record(&self, id: &str) -> Result<Option<DdlRecord>> {
        self.with_connection(|conn| {
            let record = conn
                .query_row(
                    "SELECT id, link, status, jd2_job_id, updated_date FROM ddl_info WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(DdlRecord {
                            id: row.get(0)?,
                            link: row.get(1)?,
                            status: row.get(2)?,
                            jd2_job_id: row.get(3)?,
                            updated_date: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(record)
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
